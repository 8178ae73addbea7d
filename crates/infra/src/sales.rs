use chrono::Utc;

use pharmastock_auth::Principal;
use pharmastock_core::{DomainError, SaleId};
use pharmastock_inventory::NewMovement;
use pharmastock_products::Product;
use pharmastock_sales::{Cart, Receipt};

use crate::db::{like_pattern, Store};
use crate::error::StoreResult;
use crate::movements::append_movement;
use crate::products::{product_from_row, PRODUCT_COLUMNS};

impl Store {
    /// Sell every line of `cart` atomically.
    ///
    /// Each line decrements stock only if enough is left. The first line that
    /// cannot be served aborts the sale: nothing is decremented and no movement
    /// is written.
    #[tracing::instrument(
        skip(self, cart, seller),
        fields(seller = %seller.name, lines = cart.lines().len(), sale_id = tracing::field::Empty)
    )]
    pub async fn checkout(&self, cart: &Cart, seller: &Principal) -> StoreResult<Receipt> {
        if cart.is_empty() {
            return Err(DomainError::validation("cart is empty").into());
        }
        let total = cart.total()?;
        let sale_id = SaleId::new();
        let now = Utc::now();
        tracing::Span::current().record("sale_id", tracing::field::display(sale_id));

        let mut tx = self.begin_write().await?;

        for line in cart.lines() {
            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(line.quantity)
            .bind(line.product_id.get())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(line.product_id.get())
                    .fetch_optional(&mut *tx)
                    .await?;

                let err = match available {
                    None => DomainError::not_found(format!("product {} ({})", line.code, line.product_id)),
                    Some(available) => DomainError::insufficient_stock(&line.code, line.quantity, available),
                };
                tracing::warn!(code = %line.code, requested = line.quantity, "sale rejected: {err}");
                return Err(err.into());
            }

            let movement = NewMovement::sale(&line.code, line.quantity, line.unit_price, sale_id, &seller.name);
            append_movement(&mut tx, &movement, now).await?;
        }

        tx.commit().await?;
        tracing::info!(total = %total, units = cart.total_units(), "sale completed");

        Ok(Receipt {
            sale_id,
            seller: seller.name.clone(),
            lines: cart.lines().to_vec(),
            total,
            sold_at: now,
        })
    }

    /// Products with stock left, sorted by name, optionally filtered by name or code.
    pub async fn sellable_products(&self, search: Option<&str>) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE stock > 0
              AND (?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR code LIKE ?1 ESCAPE '\')
            ORDER BY name COLLATE NOCASE, code
            "#
        ))
        .bind(like_pattern(search))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(product_from_row).collect()
    }
}

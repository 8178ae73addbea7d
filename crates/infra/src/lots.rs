use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use pharmastock_auth::Principal;
use pharmastock_core::time::{
    expiry_date, expiry_timestamp, format_timestamp, local_today, parse_timestamp,
};
use pharmastock_core::{LotId, Money, ProductId, SupplierId};
use pharmastock_inventory::{ExpiryWindow, Lot, LotDetails, NewLot, NewMovement, StockLevel};

use crate::db::Store;
use crate::error::{unique_as, StoreResult};
use crate::movements::append_movement;
use crate::products::fetch_product;
use crate::suppliers::fetch_supplier;

const LOT_DETAIL_QUERY: &str = r#"
    SELECT l.id, l.product_id, l.code, l.quantity, l.entered_at, l.expires_at, l.cost_cents,
           l.supplier_id, p.code AS product_code, p.name AS product_name,
           s.name AS supplier_name
    FROM lots l
    JOIN products p ON p.id = l.product_id
    LEFT JOIN suppliers s ON s.id = l.supplier_id
"#;

fn lot_from_row(row: &SqliteRow) -> StoreResult<Lot> {
    let entered_at: String = row.try_get("entered_at")?;
    let supplier_id: Option<i64> = row.try_get("supplier_id")?;
    Ok(Lot {
        id: LotId::new(row.try_get("id")?),
        product_id: ProductId::new(row.try_get("product_id")?),
        code: row.try_get("code")?,
        quantity: row.try_get("quantity")?,
        entered_at: parse_timestamp(&entered_at)?,
        expires_on: expiry_date(row.try_get("expires_at")?)?,
        cost: Money::from_cents(row.try_get("cost_cents")?)?,
        supplier_id: supplier_id.map(SupplierId::new),
    })
}

fn lot_details_from_row(row: &SqliteRow) -> StoreResult<LotDetails> {
    Ok(LotDetails {
        lot: lot_from_row(row)?,
        product_code: row.try_get("product_code")?,
        product_name: row.try_get("product_name")?,
        supplier_name: row.try_get("supplier_name")?,
    })
}

impl Store {
    /// Receive a lot: insert it, add its quantity to stock and record a
    /// purchase movement, all in one transaction.
    #[tracing::instrument(skip(self, input, actor), fields(lot = %input.code, quantity = input.quantity))]
    pub async fn receive_lot(&self, input: NewLot, actor: &Principal) -> StoreResult<Lot> {
        let now = Utc::now();
        let input = input.validate(local_today())?;

        let mut tx = self.begin_write().await?;

        let product = fetch_product(&mut tx, input.product_id).await?;
        if let Some(supplier_id) = input.supplier_id {
            fetch_supplier(&mut tx, supplier_id).await?.ensure_can_supply()?;
        }
        let after = StockLevel::new(&product.code, product.stock)?.receive(input.quantity)?;

        let row = sqlx::query(
            r#"
            INSERT INTO lots (product_id, code, quantity, entered_at, expires_at, cost_cents, supplier_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id, product_id, code, quantity, entered_at, expires_at, cost_cents, supplier_id
            "#,
        )
        .bind(product.id.get())
        .bind(&input.code)
        .bind(input.quantity)
        .bind(format_timestamp(now))
        .bind(expiry_timestamp(input.expires_on))
        .bind(input.cost.cents())
        .bind(input.supplier_id.map(|id| id.get()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_as(e, || format!("lot code {} already exists", input.code)))?;
        let lot = lot_from_row(&row)?;

        sqlx::query("UPDATE products SET stock = stock + ?1, modified_by = ?2 WHERE id = ?3")
            .bind(input.quantity)
            .bind(actor.employee_id.get())
            .bind(product.id.get())
            .execute(&mut *tx)
            .await?;

        let movement = NewMovement::purchase(&product.code, input.quantity, &lot.code, &actor.name);
        append_movement(&mut tx, &movement, now).await?;

        tx.commit().await?;
        tracing::info!(
            lot_id = %lot.id,
            product_id = %product.id,
            code = %product.code,
            quantity = input.quantity,
            stock = after.units(),
            "lot received"
        );
        Ok(lot)
    }

    /// Lots sorted by expiration (soonest first), optionally for one product.
    pub async fn list_lots(&self, product: Option<ProductId>) -> StoreResult<Vec<LotDetails>> {
        let rows = sqlx::query(&format!(
            "{LOT_DETAIL_QUERY} WHERE ?1 IS NULL OR l.product_id = ?1 ORDER BY l.expires_at, l.code"
        ))
        .bind(product.map(|id| id.get()))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(lot_details_from_row).collect()
    }

    /// Lots expiring within `window` of `today`, including expired ones.
    pub async fn list_expiring_lots(&self, today: NaiveDate, window: ExpiryWindow) -> StoreResult<Vec<LotDetails>> {
        let rows = sqlx::query(&format!(
            "{LOT_DETAIL_QUERY} WHERE l.expires_at <= ?1 ORDER BY l.expires_at, l.code"
        ))
        .bind(expiry_timestamp(window.cutoff(today)))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(lot_details_from_row).collect()
    }
}

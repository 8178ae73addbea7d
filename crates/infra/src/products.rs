//! Product catalog, manual stock adjustment and product soft-delete.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use pharmastock_auth::Principal;
use pharmastock_core::time::{
    expiry_date, expiry_timestamp, format_timestamp, local_today, parse_timestamp,
};
use pharmastock_core::{DomainError, EmployeeId, Money, ProductId};
use pharmastock_inventory::{NewMovement, StockLevel};
use pharmastock_products::{DeletedProduct, NewProduct, Product, ProductUpdate, RestoreCode};

use crate::db::{like_pattern, Store};
use crate::error::{unique_as, StoreResult};
use crate::movements::append_movement;

/// Journal `units` leaving `from` and, when given, arriving under `to`.
///
/// Movements are keyed by product code, so every change of a live product's
/// code (rename, delete, restore) moves its stock between codes in the journal
/// and each live code keeps a movement net equal to its stock.
async fn move_journaled_stock(
    conn: &mut SqliteConnection,
    units: i64,
    from: Option<&str>,
    to: Option<&str>,
    reason: &str,
    actor: &Principal,
    at: DateTime<Utc>,
) -> StoreResult<()> {
    if units == 0 {
        return Ok(());
    }
    if let Some(code) = from {
        let (_, out) = StockLevel::new(code, units)?.adjust(-units)?;
        append_movement(conn, &NewMovement::adjustment(code, out, reason, &actor.name), at).await?;
    }
    if let Some(code) = to {
        let (_, back) = StockLevel::new(code, 0)?.adjust(units)?;
        append_movement(conn, &NewMovement::adjustment(code, back, reason, &actor.name), at).await?;
    }
    Ok(())
}

pub(crate) const PRODUCT_COLUMNS: &str =
    "id, code, image_path, name, price_cents, stock, expires_at, modified_by";

pub(crate) fn product_from_row(row: &SqliteRow) -> StoreResult<Product> {
    let modified_by: Option<i64> = row.try_get("modified_by")?;
    Ok(Product {
        id: ProductId::new(row.try_get("id")?),
        code: row.try_get("code")?,
        image_path: row.try_get("image_path")?,
        name: row.try_get("name")?,
        price: Money::from_cents(row.try_get("price_cents")?)?,
        stock: row.try_get("stock")?,
        expires_on: expiry_date(row.try_get("expires_at")?)?,
        modified_by: modified_by.map(EmployeeId::new),
    })
}

fn deleted_product_from_row(row: &SqliteRow) -> StoreResult<DeletedProduct> {
    let deleted_at: String = row.try_get("deleted_at")?;
    Ok(DeletedProduct {
        product: product_from_row(row)?,
        deleted_at: parse_timestamp(&deleted_at)?,
    })
}

/// Load one product inside an open transaction.
pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: ProductId) -> StoreResult<Product> {
    let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
    product_from_row(&row)
}

impl Store {
    /// Create a product. Initial stock is recorded as an adjustment movement.
    pub async fn create_product(&self, input: NewProduct, actor: &Principal) -> StoreResult<Product> {
        let now = Utc::now();
        let input = input.validate(local_today())?;

        let mut tx = self.begin_write().await?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (code, image_path, name, price_cents, stock, expires_at, modified_by)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.code)
        .bind(&input.image_path)
        .bind(&input.name)
        .bind(input.price.cents())
        .bind(input.stock)
        .bind(expiry_timestamp(input.expires_on))
        .bind(actor.employee_id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_as(e, || format!("product code {} already exists", input.code)))?;
        let product = product_from_row(&row)?;

        if product.stock > 0 {
            let (_, adjustment) = StockLevel::new(&product.code, 0)?.adjust(product.stock)?;
            let movement = NewMovement::adjustment(&product.code, adjustment, "initial stock", &actor.name);
            append_movement(&mut tx, &movement, now).await?;
        }

        tx.commit().await?;
        tracing::info!(product_id = %product.id, code = %product.code, quantity = product.stock, "product created");
        Ok(product)
    }

    pub async fn get_product(&self, id: ProductId) -> StoreResult<Product> {
        let mut conn = self.pool().acquire().await?;
        fetch_product(&mut conn, id).await
    }

    pub async fn find_product_by_code(&self, code: &str) -> StoreResult<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1"))
            .bind(code.trim())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    /// Live products sorted by name, optionally filtered by name or code.
    pub async fn list_products(&self, search: Option<&str>) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR code LIKE ?1 ESCAPE '\'
            ORDER BY name COLLATE NOCASE, code
            "#
        ))
        .bind(like_pattern(search))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Overwrite a product. A stock change is recorded as an adjustment.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
        actor: &Principal,
    ) -> StoreResult<Product> {
        let update = update.validate()?;
        let now = Utc::now();
        let mut tx = self.begin_write().await?;

        let before = fetch_product(&mut tx, id).await?;
        let image_path = if update.image_path.is_empty() {
            before.image_path.clone()
        } else {
            update.image_path.clone()
        };

        let row = sqlx::query(&format!(
            r#"
            UPDATE products
            SET code = ?1, image_path = ?2, name = ?3, price_cents = ?4, stock = ?5,
                expires_at = ?6, modified_by = ?7
            WHERE id = ?8
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&update.code)
        .bind(&image_path)
        .bind(&update.name)
        .bind(update.price.cents())
        .bind(update.stock)
        .bind(expiry_timestamp(update.expires_on))
        .bind(actor.employee_id.get())
        .bind(id.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unique_as(e, || format!("product code {} already exists", update.code)))?;
        let product = product_from_row(&row)?;

        if product.code != before.code {
            let reason = format!("code changed from {} to {}", before.code, product.code);
            move_journaled_stock(
                &mut tx,
                before.stock,
                Some(before.code.as_str()),
                Some(product.code.as_str()),
                &reason,
                actor,
                now,
            )
            .await?;
        }

        let delta = product.stock - before.stock;
        if delta != 0 {
            let (_, adjustment) = StockLevel::new(&product.code, before.stock)?.adjust(delta)?;
            let movement = NewMovement::adjustment(&product.code, adjustment, "product edited", &actor.name);
            append_movement(&mut tx, &movement, now).await?;
        }

        tx.commit().await?;
        tracing::info!(product_id = %id, code = %product.code, delta, "product updated");
        Ok(product)
    }

    /// Change stock by a signed, non-zero `delta` and record why.
    pub async fn adjust_stock(
        &self,
        id: ProductId,
        delta: i64,
        reason: &str,
        actor: &Principal,
    ) -> StoreResult<Product> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;

        let before = fetch_product(&mut tx, id).await?;
        let (_, adjustment) = StockLevel::new(&before.code, before.stock)?.adjust(delta)?;

        let result = sqlx::query(
            r#"
            UPDATE products SET stock = stock + ?1, modified_by = ?2
            WHERE id = ?3 AND stock + ?1 >= 0
            "#,
        )
        .bind(delta)
        .bind(actor.employee_id.get())
        .bind(id.get())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::invariant(format!("stock of {} cannot go negative", before.code)).into());
        }

        let movement = NewMovement::adjustment(&before.code, adjustment, reason, &actor.name);
        append_movement(&mut tx, &movement, now).await?;

        let product = fetch_product(&mut tx, id).await?;
        tx.commit().await?;
        tracing::info!(product_id = %id, code = %product.code, delta, "stock adjusted");
        Ok(product)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Soft-delete
    // ─────────────────────────────────────────────────────────────────────────

    /// Move a product to `deleted_products`. Refused while it still has lots.
    pub async fn soft_delete_product(&self, id: ProductId, actor: &Principal) -> StoreResult<()> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;
        let product = fetch_product(&mut tx, id).await?;

        let lots: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lots WHERE product_id = ?1")
            .bind(id.get())
            .fetch_one(&mut *tx)
            .await?;
        if lots > 0 {
            return Err(DomainError::conflict(format!(
                "product {} still has {lots} lot(s)",
                product.code
            ))
            .into());
        }

        sqlx::query(&format!(
            r#"
            INSERT INTO deleted_products ({PRODUCT_COLUMNS}, deleted_at)
            SELECT {PRODUCT_COLUMNS}, ?2 FROM products WHERE id = ?1
            "#
        ))
        .bind(id.get())
        .bind(format_timestamp(now))
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        let code = Some(product.code.as_str());
        move_journaled_stock(&mut tx, product.stock, code, None, "product deleted", actor, now).await?;

        tx.commit().await?;
        tracing::info!(product_id = %id, code = %product.code, "product soft-deleted");
        Ok(())
    }

    /// Deleted products sorted by name, optionally filtered by name or code.
    pub async fn list_deleted_products(&self, search: Option<&str>) -> StoreResult<Vec<DeletedProduct>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, deleted_at FROM deleted_products
            WHERE ?1 IS NULL OR name LIKE ?1 ESCAPE '\' OR code LIKE ?1 ESCAPE '\'
            ORDER BY name COLLATE NOCASE, code
            "#
        ))
        .bind(like_pattern(search))
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(deleted_product_from_row).collect()
    }

    /// Bring a deleted product back under its original id.
    ///
    /// A code already used by a live product is a conflict; retry with a
    /// replacement code.
    pub async fn restore_product(
        &self,
        id: ProductId,
        code: &RestoreCode,
        actor: &Principal,
    ) -> StoreResult<Product> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;

        let stored: String = sqlx::query_scalar("SELECT code FROM deleted_products WHERE id = ?1")
            .bind(id.get())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("deleted product {id}")))?;
        let restored_code = code.resolve(&stored).to_string();

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE code = ?1")
            .bind(&restored_code)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(DomainError::conflict(format!(
                "product code {restored_code} is already in use"
            ))
            .into());
        }

        // The last modifier may have been deleted since.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products (id, code, image_path, name, price_cents, stock, expires_at, modified_by)
            SELECT id, ?2, image_path, name, price_cents, stock, expires_at,
                   (SELECT e.id FROM employees e WHERE e.id = d.modified_by)
            FROM deleted_products d WHERE d.id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(&restored_code)
        .fetch_one(&mut *tx)
        .await?;
        let product = product_from_row(&row)?;

        sqlx::query("DELETE FROM deleted_products WHERE id = ?1")
            .bind(id.get())
            .execute(&mut *tx)
            .await?;

        let code = Some(product.code.as_str());
        move_journaled_stock(&mut tx, product.stock, None, code, "product restored", actor, now).await?;

        tx.commit().await?;
        tracing::info!(product_id = %id, code = %product.code, "product restored");
        Ok(product)
    }

    /// Permanently remove a deleted product. Its movements are kept.
    pub async fn purge_product(&self, id: ProductId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM deleted_products WHERE id = ?1")
            .bind(id.get())
            .execute(self.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!("deleted product {id}")).into());
        }
        tracing::info!(product_id = %id, "deleted product purged");
        Ok(())
    }
}

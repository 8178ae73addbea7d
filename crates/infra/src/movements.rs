//! Movement journal: append, history and search.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use pharmastock_core::time::{format_timestamp, parse_timestamp};
use pharmastock_core::{Money, MovementId, SaleId};
use pharmastock_inventory::{
    JournalEntry, Movement, MovementFilter, MovementKind, NewMovement, UNKNOWN_PRODUCT,
};

use crate::db::{like_pattern, Store};
use crate::error::{StoreError, StoreResult};

const MOVEMENT_COLUMNS: &str =
    "m.id, m.product_code, m.kind, m.quantity, m.occurred_at, m.notes, m.username, m.sale_id, m.unit_price_cents";

fn movement_from_row(row: &SqliteRow) -> StoreResult<Movement> {
    let kind: String = row.try_get("kind")?;
    let occurred_at: String = row.try_get("occurred_at")?;
    let sale_id: Option<String> = row.try_get("sale_id")?;
    let unit_price: Option<i64> = row.try_get("unit_price_cents")?;

    Ok(Movement {
        id: MovementId::new(row.try_get("id")?),
        product_code: row.try_get("product_code")?,
        kind: kind.parse::<MovementKind>()?,
        quantity: row.try_get("quantity")?,
        occurred_at: parse_timestamp(&occurred_at)?,
        notes: row.try_get("notes")?,
        username: row.try_get("username")?,
        sale_id: sale_id.map(|s| s.parse::<SaleId>()).transpose()?,
        unit_price: unit_price.map(Money::from_cents).transpose()?,
    })
}

/// Append one movement on an open connection (normally a transaction).
pub(crate) async fn append_movement(
    conn: &mut SqliteConnection,
    movement: &NewMovement,
    at: DateTime<Utc>,
) -> StoreResult<MovementId> {
    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO inventory_movements
            (product_code, kind, quantity, occurred_at, notes, username, sale_id, unit_price_cents)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING id
        "#,
    )
    .bind(&movement.product_code)
    .bind(movement.kind.as_str())
    .bind(movement.quantity)
    .bind(format_timestamp(at))
    .bind(movement.notes.as_deref())
    .bind(movement.username.as_deref())
    .bind(movement.sale_id.map(|id| id.to_string()))
    .bind(movement.unit_price.map(|p| p.cents()))
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(
        movement_id = id,
        code = %movement.product_code,
        kind = %movement.kind,
        quantity = movement.quantity,
        "movement appended"
    );
    Ok(MovementId::new(id))
}

impl Store {
    /// Movements of one product code, newest first.
    pub async fn product_history(&self, code: &str) -> StoreResult<Vec<Movement>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM inventory_movements m
            WHERE m.product_code = ?1
            ORDER BY m.occurred_at DESC, m.id DESC
            "#
        ))
        .bind(code.trim())
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(movement_from_row).collect()
    }

    /// Movements with product names, newest first.
    ///
    /// Names come from the live product, then the most recently deleted one
    /// with the same code, then a placeholder.
    pub async fn journal(&self, filter: &MovementFilter) -> StoreResult<Vec<JournalEntry>> {
        let (from, until) = match filter.range {
            Some(range) => {
                let (from, until) = range.bounds();
                (Some(from), Some(until))
            }
            None => (None, None),
        };

        let rows = sqlx::query(&format!(
            r#"
            WITH journal AS (
                SELECT {MOVEMENT_COLUMNS},
                       COALESCE(
                           p.name,
                           (SELECT d.name FROM deleted_products d
                            WHERE d.code = m.product_code
                            ORDER BY d.deleted_at DESC LIMIT 1),
                           ?4
                       ) AS product_name
                FROM inventory_movements m
                LEFT JOIN products p ON p.code = m.product_code
            )
            SELECT * FROM journal
            WHERE (?1 IS NULL OR occurred_at >= ?1)
              AND (?2 IS NULL OR occurred_at < ?2)
              AND (?3 IS NULL
                   OR product_code LIKE ?3 ESCAPE '\'
                   OR product_name LIKE ?3 ESCAPE '\'
                   OR kind LIKE ?3 ESCAPE '\'
                   OR username LIKE ?3 ESCAPE '\'
                   OR notes LIKE ?3 ESCAPE '\')
            ORDER BY occurred_at DESC, id DESC
            "#
        ))
        .bind(from)
        .bind(until)
        .bind(like_pattern(filter.needle().as_deref()))
        .bind(UNKNOWN_PRODUCT)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, StoreError>(JournalEntry {
                    movement: movement_from_row(row)?,
                    product_name: row.try_get("product_name")?,
                })
            })
            .collect()
    }
}

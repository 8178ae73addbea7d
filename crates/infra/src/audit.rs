use std::collections::HashMap;

use sqlx::Row;

use pharmastock_inventory::{find_discrepancies, signed_quantity, MovementKind, StockDiscrepancy, StockFigures};

use crate::db::Store;
use crate::error::StoreResult;

impl Store {
    /// Compare every live product's stock with its lots and its movements.
    pub async fn audit(&self) -> StoreResult<Vec<StockDiscrepancy>> {
        let mut net: HashMap<String, i64> = HashMap::new();
        let movements = sqlx::query("SELECT product_code, kind, quantity, notes FROM inventory_movements")
            .fetch_all(self.pool())
            .await?;
        for row in &movements {
            let kind: String = row.try_get("kind")?;
            let notes: Option<String> = row.try_get("notes")?;
            let delta = signed_quantity(
                kind.parse::<MovementKind>()?,
                row.try_get("quantity")?,
                notes.as_deref(),
            );
            *net.entry(row.try_get("product_code")?).or_default() += delta;
        }

        let rows = sqlx::query(
            r#"
            SELECT p.code, p.stock,
                   (SELECT SUM(l.quantity) FROM lots l WHERE l.product_id = p.id) AS lot_total
            FROM products p
            ORDER BY p.code
            "#,
        )
        .fetch_all(self.pool())
        .await?;

        let mut figures = Vec::with_capacity(rows.len());
        for row in &rows {
            let code: String = row.try_get("code")?;
            figures.push(StockFigures {
                stock: row.try_get("stock")?,
                lot_total: row.try_get("lot_total")?,
                movement_net: net.get(&code).copied(),
                code,
            });
        }

        let found = find_discrepancies(&figures);
        tracing::info!(products = figures.len(), discrepancies = found.len(), "stock audit finished");
        Ok(found)
    }
}

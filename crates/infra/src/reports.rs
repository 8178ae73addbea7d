//! Product and employee reports.

use serde::Serialize;
use sqlx::Row;

use pharmastock_auth::{DeletedEmployee, Employee};
use pharmastock_core::Money;
use pharmastock_products::{DeletedProduct, ProductWithModifier, StockStatus, UNASSIGNED};

use crate::db::{like_pattern, Store};
use crate::error::{StoreError, StoreResult};
use crate::products::{product_from_row, PRODUCT_COLUMNS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReportRow {
    pub code: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReport {
    pub live: Vec<ProductReportRow>,
    pub deleted: Vec<DeletedProduct>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeReport {
    /// Newest first.
    pub active: Vec<Employee>,
    /// Most recently deleted first.
    pub deleted: Vec<DeletedEmployee>,
}

impl Store {
    pub async fn product_report(&self, search: Option<&str>) -> StoreResult<ProductReport> {
        let live = self
            .list_products(search)
            .await?
            .into_iter()
            .map(|p| ProductReportRow {
                status: p.status(),
                code: p.code,
                name: p.name,
                price: p.price,
                stock: p.stock,
            })
            .collect();

        Ok(ProductReport {
            live,
            deleted: self.list_deleted_products(search).await?,
        })
    }

    pub async fn employee_report(&self, search: Option<&str>) -> StoreResult<EmployeeReport> {
        Ok(EmployeeReport {
            active: self.list_employees(search).await?,
            deleted: self.list_deleted_employees(search).await?,
        })
    }

    /// Live products with the name of whoever last modified them.
    pub async fn list_products_with_modifier(
        &self,
        search: Option<&str>,
    ) -> StoreResult<Vec<ProductWithModifier>> {
        let columns = PRODUCT_COLUMNS
            .split(", ")
            .map(|c| format!("p.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let rows = sqlx::query(&format!(
            r#"
            SELECT {columns},
                   COALESCE(e.name || ' ' || e.surname, ?2) AS modified_by_name
            FROM products p
            LEFT JOIN employees e ON e.id = p.modified_by
            WHERE ?1 IS NULL OR p.name LIKE ?1 ESCAPE '\' OR p.code LIKE ?1 ESCAPE '\'
            ORDER BY p.name COLLATE NOCASE, p.code
            "#
        ))
        .bind(like_pattern(search))
        .bind(UNASSIGNED)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok::<_, StoreError>(ProductWithModifier {
                    product: product_from_row(row)?,
                    modified_by_name: row.try_get("modified_by_name")?,
                })
            })
            .collect()
    }
}

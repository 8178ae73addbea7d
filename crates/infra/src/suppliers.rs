use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use pharmastock_core::time::{format_timestamp, parse_timestamp};
use pharmastock_core::{DomainError, SupplierId};
use pharmastock_parties::{ContactInfo, NewSupplier, Supplier, SupplierStatus};

use crate::db::Store;
use crate::error::{unique_as, StoreResult};

const SUPPLIER_COLUMNS: &str =
    "id, name, tax_id, contact_name, phone, email, address, status, registered_at";

fn supplier_from_row(row: &SqliteRow) -> StoreResult<Supplier> {
    let status: String = row.try_get("status")?;
    let registered_at: String = row.try_get("registered_at")?;
    Ok(Supplier {
        id: SupplierId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        tax_id: row.try_get("tax_id")?,
        contact: ContactInfo {
            contact_name: row.try_get("contact_name")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
            address: row.try_get("address")?,
        },
        status: status.parse::<SupplierStatus>()?,
        registered_at: parse_timestamp(&registered_at)?,
    })
}

pub(crate) async fn fetch_supplier(conn: &mut SqliteConnection, id: SupplierId) -> StoreResult<Supplier> {
    let row = sqlx::query(&format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;
    supplier_from_row(&row)
}

impl Store {
    pub async fn create_supplier(&self, input: NewSupplier) -> StoreResult<Supplier> {
        let input = input.validate()?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO suppliers (name, tax_id, contact_name, phone, email, address, status, registered_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'active', ?7)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(input.tax_id.as_deref())
        .bind(input.contact_name.as_deref())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.address.as_deref())
        .bind(format_timestamp(Utc::now()))
        .fetch_one(self.pool())
        .await
        .map_err(|e| unique_as(e, || format!("supplier '{}' already exists", input.name)))?;

        let supplier = supplier_from_row(&row)?;
        tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "supplier registered");
        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: SupplierId) -> StoreResult<Supplier> {
        let mut conn = self.pool().acquire().await?;
        fetch_supplier(&mut conn, id).await
    }

    /// Suppliers sorted by name; inactive ones only when asked for.
    pub async fn list_suppliers(&self, include_inactive: bool) -> StoreResult<Vec<Supplier>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS} FROM suppliers
            WHERE ?1 OR status = 'active'
            ORDER BY name COLLATE NOCASE
            "#
        ))
        .bind(include_inactive)
        .fetch_all(self.pool())
        .await?;
        rows.iter().map(supplier_from_row).collect()
    }

    pub async fn set_supplier_status(&self, id: SupplierId, status: SupplierStatus) -> StoreResult<Supplier> {
        let row = sqlx::query(&format!(
            "UPDATE suppliers SET status = ?1 WHERE id = ?2 RETURNING {SUPPLIER_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id.get())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DomainError::not_found(format!("supplier {id}")))?;

        tracing::info!(supplier_id = %id, status = %status, "supplier status changed");
        supplier_from_row(&row)
    }
}

//! Database schema. Every statement is idempotent.
//!
//! `employees` and `products` use AUTOINCREMENT so a soft-deleted row can be
//! restored under its original id without colliding with newer rows.

use sqlx::SqlitePool;

use crate::error::{StoreError, StoreResult};

const STATEMENTS: &[(&str, &str)] = &[
    (
        "employees",
        r#"
        CREATE TABLE IF NOT EXISTS employees (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            ci            TEXT NOT NULL UNIQUE,
            name          TEXT NOT NULL,
            surname       TEXT NOT NULL,
            phone         TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL CHECK (role IN ('admin', 'employee')),
            created_at    TEXT NOT NULL
        )
        "#,
    ),
    (
        "deleted_employees",
        r#"
        CREATE TABLE IF NOT EXISTS deleted_employees (
            id            INTEGER PRIMARY KEY,
            ci            TEXT NOT NULL,
            name          TEXT NOT NULL,
            surname       TEXT NOT NULL,
            phone         TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            deleted_at    TEXT NOT NULL
        )
        "#,
    ),
    (
        "products",
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            code        TEXT NOT NULL UNIQUE,
            image_path  TEXT NOT NULL,
            name        TEXT NOT NULL,
            price_cents INTEGER NOT NULL CHECK (price_cents >= 0),
            stock       INTEGER NOT NULL CHECK (stock >= 0),
            expires_at  INTEGER NOT NULL,
            modified_by INTEGER NULL REFERENCES employees(id) ON DELETE SET NULL
        )
        "#,
    ),
    (
        "deleted_products",
        r#"
        CREATE TABLE IF NOT EXISTS deleted_products (
            id          INTEGER PRIMARY KEY,
            code        TEXT NOT NULL,
            image_path  TEXT NOT NULL,
            name        TEXT NOT NULL,
            price_cents INTEGER NOT NULL,
            stock       INTEGER NOT NULL,
            expires_at  INTEGER NOT NULL,
            modified_by INTEGER NULL,
            deleted_at  TEXT NOT NULL
        )
        "#,
    ),
    (
        "suppliers",
        r#"
        CREATE TABLE IF NOT EXISTS suppliers (
            id            INTEGER PRIMARY KEY,
            name          TEXT NOT NULL UNIQUE,
            tax_id        TEXT NULL,
            contact_name  TEXT NULL,
            phone         TEXT NOT NULL,
            email         TEXT NOT NULL,
            address       TEXT NULL,
            status        TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'inactive')),
            registered_at TEXT NOT NULL
        )
        "#,
    ),
    (
        "lots",
        r#"
        CREATE TABLE IF NOT EXISTS lots (
            id          INTEGER PRIMARY KEY,
            product_id  INTEGER NOT NULL REFERENCES products(id),
            code        TEXT NOT NULL UNIQUE,
            quantity    INTEGER NOT NULL CHECK (quantity > 0),
            entered_at  TEXT NOT NULL,
            expires_at  INTEGER NOT NULL,
            cost_cents  INTEGER NOT NULL CHECK (cost_cents >= 0),
            supplier_id INTEGER NULL REFERENCES suppliers(id)
        )
        "#,
    ),
    (
        "inventory_movements",
        r#"
        CREATE TABLE IF NOT EXISTS inventory_movements (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            product_code     TEXT NOT NULL,
            kind             TEXT NOT NULL CHECK (kind IN ('sale', 'purchase', 'adjustment')),
            quantity         INTEGER NOT NULL CHECK (quantity > 0),
            occurred_at      TEXT NOT NULL,
            notes            TEXT NULL,
            username         TEXT NULL,
            sale_id          TEXT NULL,
            unit_price_cents INTEGER NULL
        )
        "#,
    ),
    (
        "idx_lots_product",
        "CREATE INDEX IF NOT EXISTS idx_lots_product ON lots (product_id)",
    ),
    (
        "idx_movements_code",
        "CREATE INDEX IF NOT EXISTS idx_movements_code ON inventory_movements (product_code)",
    ),
    (
        "idx_movements_occurred_at",
        "CREATE INDEX IF NOT EXISTS idx_movements_occurred_at ON inventory_movements (occurred_at)",
    ),
];

/// Create every table and index that does not exist yet.
pub async fn create_schema(pool: &SqlitePool) -> StoreResult<()> {
    for (name, sql) in STATEMENTS {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| StoreError::Migrate(format!("failed to create {name}: {e}")))?;
    }
    tracing::debug!(statements = STATEMENTS.len(), "schema ready");
    Ok(())
}

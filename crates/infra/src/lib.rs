//! Infrastructure layer: SQLite store, schema and configuration.
//!
//! [`Store`] owns the database pool and runs every pharmacy operation. Each
//! operation that touches more than one row runs in a single transaction.

pub mod config;
pub mod db;
pub mod error;
pub mod schema;

mod audit;
mod employees;
mod lots;
mod movements;
mod products;
mod reports;
mod sales;
mod suppliers;

#[cfg(test)]
mod integration_tests;

pub use config::Config;
pub use db::{Store, StoreOptions};
pub use error::{StoreError, StoreResult};
pub use reports::{EmployeeReport, ProductReport, ProductReportRow};

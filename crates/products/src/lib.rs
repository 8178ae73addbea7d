//! Products domain module.
//!
//! Catalog rules for pharmacy products, implemented as pure validation logic
//! (no IO, no storage).

pub mod product;

pub use product::{
    DeletedProduct, NewProduct, Product, ProductUpdate, ProductWithModifier, RestoreCode,
    StockStatus, UNASSIGNED, validate_code,
};

//! `pharmastock-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no IO).

pub mod entity;
pub mod error;
pub mod id;
pub mod time;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{EmployeeId, LotId, MovementId, ProductId, SaleId, SupplierId};
pub use value_object::{Money, ValueObject};

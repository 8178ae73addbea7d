//! Parties domain module (suppliers).
//!
//! Business rules for the suppliers lots are bought from, implemented purely
//! as deterministic domain logic (no IO, no storage).

pub mod supplier;

pub use supplier::{ContactInfo, NewSupplier, Supplier, SupplierStatus};

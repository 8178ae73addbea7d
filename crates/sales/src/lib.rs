//! Sales domain module.
//!
//! The point-of-sale cart and sales statistics, implemented purely as
//! deterministic domain logic (no IO, no storage). Checkout itself runs in the
//! store, inside one transaction.

pub mod cart;
pub mod stats;

pub use cart::{Cart, CartLine, Receipt};
pub use stats::{summarize, KindFilter, ProductUnits, SalesSummary, Trend};

//! Inventory domain module.
//!
//! Lots, stock levels, the movement journal and the stock consistency audit,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod audit;
pub mod lot;
pub mod movement;
pub mod stock;

pub use audit::{find_discrepancies, StockDiscrepancy, StockFigures};
pub use lot::{ExpiryWindow, Lot, LotDetails, NewLot, DEFAULT_EXPIRY_WARNING_DAYS};
pub use movement::{
    signed_quantity, DateRange, JournalEntry, Movement, MovementFilter, MovementKind, NewMovement,
    Period, UNKNOWN_PRODUCT,
};
pub use stock::{StockAdjustment, StockLevel};

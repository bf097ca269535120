//! Shared types for Stock Shelf
//!
//! Inventory items as the application sees them, records as the record store
//! holds them, the sort keys of the displayed list and the signed-in session.

mod item;
mod record;
mod session;
mod sort;

pub use item::InventoryItem;
pub use record::{Record, RecordFields, WriteMode};
pub use session::Session;
pub use sort::{ParseSortKeyError, SortKey};

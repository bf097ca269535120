//! Stock Shelf - Inventory Tracker
//!
//! Keeps a local list of inventory items in sync with a keyed-record store
//! (SQLite on disk or Cloud Firestore), stores item photos in an object store,
//! and projects the list for display with a search filter and sort order.

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod objects;
pub mod store;
pub mod sync;
pub mod view;
pub mod web;

pub use auth::IdentityClient;
pub use config::FirebaseConfig;
pub use error::{Result, ShelfError, StoreError};
pub use objects::{FirebaseStorage, ImagePayload, LocalObjectStore, ObjectStore};
pub use store::{FirestoreStore, MemoryStore, RecordStore, SqliteStore};
pub use sync::InventorySync;
pub use view::{project, ViewState};

pub use shelf_common::{InventoryItem, Session, SortKey};

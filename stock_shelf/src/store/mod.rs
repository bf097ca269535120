//! Keyed-record stores backing the inventory
//!
//! Each inventory item is one record keyed by its name inside a collection.
//! The synchronizer only talks to the [`RecordStore`] trait; the backends are
//! an in-process map, a local SQLite file and Cloud Firestore.

mod firestore;
mod memory;
mod sqlite;

use async_trait::async_trait;
use shelf_common::{Record, RecordFields, WriteMode};

use crate::error::StoreResult;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Default collection holding inventory records
pub const INVENTORY_COLLECTION: &str = "inventory";

/// Remote keyed-record service.
///
/// Reads and writes of a single key are assumed linearizable. There is no
/// conditional write, so a read followed by a write can lose a concurrent
/// update to the same key.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record, `None` if the key does not exist
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>>;

    /// Fetch every record of a collection, in no particular order
    async fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Record)>>;

    /// Create or update a record
    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: RecordFields,
        mode: WriteMode,
    ) -> StoreResult<()>;

    /// Delete a record; deleting a missing key succeeds
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;
}

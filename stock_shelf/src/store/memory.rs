use async_trait::async_trait;
use shelf_common::{Record, RecordFields, WriteMode};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::RecordStore;
use crate::error::{StoreError, StoreResult};

/// In-process record store
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with records in one collection
    pub fn with_records<I, K>(collection: &str, records: I) -> Self
    where
        I: IntoIterator<Item = (K, Record)>,
        K: Into<String>,
    {
        let records = records.into_iter().map(|(k, r)| (k.into(), r)).collect();
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), records);
        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Number of records in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: &str) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(key)).cloned())
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Record)>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.iter().map(|(k, r)| (k.clone(), r.clone())).collect())
            .unwrap_or_default())
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: RecordFields,
        mode: WriteMode,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();

        match (records.get_mut(key), mode) {
            (Some(existing), WriteMode::Merge) => existing.apply(&fields, mode),
            _ => {
                let record = fields
                    .into_record()
                    .ok_or_else(|| StoreError::IncompleteWrite(key.to_string()))?;
                records.insert(key.to_string(), record);
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(records) = collections.get_mut(collection) {
            records.remove(key);
        }
        Ok(())
    }
}

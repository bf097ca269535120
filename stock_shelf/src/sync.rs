//! Inventory synchronizer
//!
//! Owns the authoritative item list. Every write goes to the record store
//! first and finishes with a full re-fetch; the local list is never patched
//! in place.
//!
//! `add_item` and `decrement_item` read a record and then write it back
//! without any conditional-write guard. Two concurrent calls for the same
//! name can therefore lose an update. Concurrent refreshes race as well: the
//! last listing to arrive replaces the list.

use shelf_common::{InventoryItem, RecordFields, Session, WriteMode};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Result, ShelfError, StoreError};
use crate::objects::{ImagePayload, ObjectStore};
use crate::store::{RecordStore, INVENTORY_COLLECTION};
use crate::view::ViewState;

/// Folder prefix for uploaded item photos
const IMAGE_PREFIX: &str = "inventory";

pub struct InventorySync {
    store: Arc<dyn RecordStore>,
    objects: Arc<dyn ObjectStore>,
    session: Session,
    collection: String,
    items: RwLock<Vec<InventoryItem>>,
}

impl InventorySync {
    pub fn new(store: Arc<dyn RecordStore>, objects: Arc<dyn ObjectStore>, session: Session) -> Self {
        log::info!("Inventory synchronizer ready for user {}", session.user_id);
        Self {
            store,
            objects,
            session,
            collection: INVENTORY_COLLECTION.to_string(),
            items: RwLock::new(Vec::new()),
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Snapshot of the authoritative list as of the last successful refresh
    pub async fn items(&self) -> Vec<InventoryItem> {
        self.items.read().await.clone()
    }

    /// The authoritative list filtered and sorted for display
    pub async fn display(&self, view: &ViewState) -> Vec<InventoryItem> {
        view.project(&self.items.read().await)
    }

    /// Re-fetch every record and replace the authoritative list.
    ///
    /// On failure the previous list stays in place.
    pub async fn refresh(&self) -> Result<Vec<InventoryItem>> {
        let records = self
            .store
            .list_all(&self.collection)
            .await
            .map_err(|e| unavailable("refresh inventory", e))?;

        let fresh: Vec<InventoryItem> = records
            .into_iter()
            .map(|(key, record)| InventoryItem::from_record(key, record))
            .collect();
        log::debug!("Refreshed inventory: {} items", fresh.len());

        *self.items.write().await = fresh.clone();
        Ok(fresh)
    }

    /// Add `quantity` units of `name`, creating the item if needed.
    ///
    /// A photo, if given, is uploaded first. A failed upload is logged and the
    /// item is added without a new photo.
    pub async fn add_item(
        &self,
        name: &str,
        quantity: i64,
        image: Option<&ImagePayload>,
    ) -> Result<Vec<InventoryItem>> {
        if name.is_empty() {
            return Err(ShelfError::InvalidItem("item name is empty".to_string()));
        }
        if quantity <= 0 {
            return Err(ShelfError::InvalidItem(format!(
                "quantity must be positive, got {}",
                quantity
            )));
        }

        let image_url = match image {
            Some(payload) => match self.upload_image(name, payload).await {
                Ok(url) => Some(url),
                Err(e) => {
                    log::error!("Error uploading image for '{}': {}", name, e);
                    None
                }
            },
            None => None,
        };

        let existing = self
            .store
            .get(&self.collection, name)
            .await
            .map_err(|e| unavailable("read item", e))?;

        let (fields, mode) = match existing {
            Some(record) => {
                let total = record.quantity.checked_add(quantity).ok_or_else(|| {
                    ShelfError::InvalidItem(format!("quantity of '{}' would overflow", name))
                })?;
                (RecordFields::quantity(total), WriteMode::Merge)
            }
            None => (RecordFields::quantity(quantity), WriteMode::Replace),
        };
        let fields = fields.with_image_url(image_url);

        log::info!(
            "Adding {} x '{}' (now {})",
            quantity,
            name,
            fields.quantity.unwrap_or(quantity)
        );
        self.store
            .put(&self.collection, name, fields, mode)
            .await
            .map_err(|e| unavailable("write item", e))?;

        self.refresh().await
    }

    /// Take one unit of `name` away, deleting the item at zero.
    ///
    /// A missing item is left alone; the list is still refreshed.
    pub async fn decrement_item(&self, name: &str) -> Result<Vec<InventoryItem>> {
        let existing = self
            .store
            .get(&self.collection, name)
            .await
            .map_err(|e| unavailable("read item", e))?;

        match existing {
            Some(record) if record.quantity <= 1 => {
                log::info!("Removing last unit of '{}'", name);
                self.store
                    .delete(&self.collection, name)
                    .await
                    .map_err(|e| unavailable("delete item", e))?;
            }
            Some(record) => {
                log::info!("Decrementing '{}' to {}", name, record.quantity - 1);
                self.store
                    .put(
                        &self.collection,
                        name,
                        RecordFields::quantity(record.quantity - 1),
                        WriteMode::Merge,
                    )
                    .await
                    .map_err(|e| unavailable("write item", e))?;
            }
            None => log::debug!("Decrement of unknown item '{}' ignored", name),
        }

        self.refresh().await
    }

    /// Delete `name` whatever its quantity
    pub async fn remove_all(&self, name: &str) -> Result<Vec<InventoryItem>> {
        let existing = self
            .store
            .get(&self.collection, name)
            .await
            .map_err(|e| unavailable("read item", e))?;

        if existing.is_some() {
            log::info!("Removing all of '{}'", name);
            self.store
                .delete(&self.collection, name)
                .await
                .map_err(|e| unavailable("delete item", e))?;
        } else {
            log::debug!("Remove of unknown item '{}' ignored", name);
        }

        self.refresh().await
    }

    /// Photo URL of `name`, if the item exists and has one
    pub async fn lookup_image(&self, name: &str) -> Result<Option<String>> {
        let record = self
            .store
            .get(&self.collection, name)
            .await
            .map_err(|e| unavailable("read item", e))?;
        Ok(record.and_then(|r| r.image_url))
    }

    async fn upload_image(&self, name: &str, payload: &ImagePayload) -> Result<String> {
        let path_hint = format!(
            "{}/{}-{}",
            IMAGE_PREFIX,
            name,
            chrono::Utc::now().timestamp_millis()
        );
        let handle = self
            .objects
            .upload(&path_hint, payload)
            .await
            .map_err(ShelfError::UploadFailed)?;
        self.objects
            .public_url(&handle)
            .await
            .map_err(ShelfError::UploadFailed)
    }
}

fn unavailable(action: &str, err: StoreError) -> ShelfError {
    log::error!("Failed to {}: {}", action, err);
    ShelfError::StoreUnavailable(err)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;

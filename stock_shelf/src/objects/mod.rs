//! Object stores holding uploaded item photos

mod firebase_storage;
mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

pub use firebase_storage::FirebaseStorage;
pub use local::LocalObjectStore;

/// Binary image data handed to `add_item`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    /// Payload with a content type guessed from a file name
    pub fn from_file_name(bytes: Vec<u8>, file_name: &str) -> Self {
        Self::new(bytes, content_type_for(file_name))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guess an image content type from a file extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Stored object as returned by an upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHandle {
    /// Object path inside the store
    pub path: String,
    /// Access token required to build a public URL, if the store uses one
    pub token: Option<String>,
}

/// Binary object storage
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store a payload under (a sanitized form of) `path_hint`
    async fn upload(&self, path_hint: &str, payload: &ImagePayload) -> StoreResult<ObjectHandle>;

    /// Publicly resolvable URL of a stored object
    async fn public_url(&self, handle: &ObjectHandle) -> StoreResult<String>;
}

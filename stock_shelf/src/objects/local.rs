//! Object store on the local filesystem
//!
//! Objects are plain files below a root directory. Their public URL is a
//! `file://` URL, so the local backend needs no server for photos.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::{ImagePayload, ObjectHandle, ObjectStore};
use crate::error::{StoreError, StoreResult};

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create the store, creating the root directory if needed
    pub fn new(root: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(root)?;
        let root = root.canonicalize()?;
        log::info!("Image directory: {}", root.display());
        Ok(Self { root })
    }

    fn object_path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

/// Map a path hint onto a relative path made of safe segments only
pub(crate) fn sanitize_path(hint: &str) -> String {
    hint.split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .map(|segment| {
            segment
                .chars()
                .map(|c| {
                    if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// `file://` URL with every path segment percent-encoded
pub(crate) fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy();
    let encoded = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("file://{}", encoded)
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, path_hint: &str, payload: &ImagePayload) -> StoreResult<ObjectHandle> {
        let relative = sanitize_path(path_hint);
        if relative.is_empty() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("unusable object path: '{}'", path_hint),
            )));
        }

        let path = self.object_path(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &payload.bytes).await?;
        log::debug!("Stored {} bytes at {}", payload.len(), path.display());

        Ok(ObjectHandle {
            path: relative,
            token: None,
        })
    }

    async fn public_url(&self, handle: &ObjectHandle) -> StoreResult<String> {
        let path = self.object_path(&handle.path);
        if !path.exists() {
            return Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("object not found: {}", handle.path),
            )));
        }
        Ok(file_url(&path))
    }
}

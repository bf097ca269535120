//! Error types for stock_shelf

use std::fmt;
use thiserror::Error;

/// Failure of a single call into a backend adapter (record store, object
/// store or identity provider)
#[derive(Debug)]
pub enum StoreError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Backend answered with an error status
    HttpStatus {
        status: reqwest::StatusCode,
        message: String,
    },
    /// Local database operation failed
    Database(rusqlite::Error),
    /// Failed to parse a response body
    Parse(serde_json::Error),
    /// File I/O failed
    Io(std::io::Error),
    /// A stored document could not be read as an inventory record
    MalformedRecord { key: String, reason: String },
    /// A write did not carry the fields needed to create the record
    IncompleteWrite(String),
    /// A shared lock was poisoned by a panicking writer
    LockPoisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Network(e) => write!(f, "Network error: {}", e),
            StoreError::HttpStatus { status, message } if message.is_empty() => {
                write!(f, "HTTP error: {}", status)
            }
            StoreError::HttpStatus { status, message } => {
                write!(f, "HTTP error: {} ({})", status, message)
            }
            StoreError::Database(e) => write!(f, "Database error: {}", e),
            StoreError::Parse(e) => write!(f, "Parse error: {}", e),
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::MalformedRecord { key, reason } => {
                write!(f, "Malformed record '{}': {}", key, reason)
            }
            StoreError::IncompleteWrite(key) => {
                write!(f, "Cannot create record '{}' without a quantity", key)
            }
            StoreError::LockPoisoned => write!(f, "Store lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Network(e) => Some(e),
            StoreError::Database(e) => Some(e),
            StoreError::Parse(e) => Some(e),
            StoreError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Parse(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned
    }
}

/// Result alias for adapter calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error returned by inventory operations
#[derive(Debug, Error)]
pub enum ShelfError {
    /// The record store could not be reached or rejected a call
    #[error("Record store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),

    /// An image could not be uploaded or resolved to a URL
    #[error("Image upload failed: {0}")]
    UploadFailed(#[source] StoreError),

    /// Rejected input; nothing was written
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// The identity provider refused or failed a sign-in
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl ShelfError {
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, ShelfError::StoreUnavailable(_))
    }
}

/// Result alias for stock_shelf operations
pub type Result<T> = std::result::Result<T, ShelfError>;

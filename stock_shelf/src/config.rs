//! Backend configuration and default locations

use std::path::PathBuf;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Firebase project settings plus the REST endpoints used to reach it.
///
/// The endpoint URLs only change in tests or when pointing at the emulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirebaseConfig {
    pub project_id: String,
    pub api_key: String,
    pub storage_bucket: String,
    pub firestore_url: String,
    pub storage_url: String,
    pub identity_url: String,
}

impl FirebaseConfig {
    /// Settings for a project; the bucket defaults to `{project}.appspot.com`
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        let project_id = project_id.into();
        Self {
            storage_bucket: format!("{}.appspot.com", project_id),
            project_id,
            api_key: api_key.into(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.storage_bucket = bucket.into();
        self
    }

    /// Point every endpoint at one base URL (emulator or mock server)
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.firestore_url = format!("{}/v1", base_url);
        self.storage_url = format!("{}/v0", base_url);
        self.identity_url = format!("{}/v1", base_url);
        self
    }
}

/// Returns the default data directory: ~/.local/share/stock_shelf
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stock_shelf")
}

/// Returns the default database path: ~/.local/share/stock_shelf/inventory.db
pub fn default_db_path() -> String {
    default_data_dir()
        .join("inventory.db")
        .to_string_lossy()
        .to_string()
}

/// Returns the default image directory: ~/.local/share/stock_shelf/images
pub fn default_image_dir() -> String {
    default_data_dir()
        .join("images")
        .to_string_lossy()
        .to_string()
}

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// A named stock item with its current quantity.
///
/// `name` is also the key of the backing record. It keeps the case it was
/// entered with; searching compares it case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl InventoryItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            quantity,
            image_url: None,
        }
    }

    /// Build an item from a stored record and its key
    pub fn from_record(key: impl Into<String>, record: Record) -> Self {
        Self {
            name: key.into(),
            quantity: record.quantity,
            image_url: record.image_url,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_url.is_some()
    }

    /// Name with its first character upper-cased, for list display
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

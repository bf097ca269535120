use serde::{Deserialize, Serialize};

/// One stored document of the inventory collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Record {
    pub fn new(quantity: i64) -> Self {
        Self {
            quantity,
            image_url: None,
        }
    }

    /// Apply a write to this record.
    ///
    /// `Merge` keeps fields the write leaves unset, `Replace` clears them.
    /// An unset quantity is kept in both modes.
    pub fn apply(&mut self, fields: &RecordFields, mode: WriteMode) {
        if let Some(quantity) = fields.quantity {
            self.quantity = quantity;
        }
        match mode {
            WriteMode::Merge => {
                if fields.image_url.is_some() {
                    self.image_url = fields.image_url.clone();
                }
            }
            WriteMode::Replace => self.image_url = fields.image_url.clone(),
        }
    }
}

/// Field set carried by a single write. `None` means "not written".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub quantity: Option<i64>,
    pub image_url: Option<String>,
}

impl RecordFields {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: Option<String>) -> Self {
        self.image_url = url;
        self
    }

    /// Turn the field set into a full record, if it names a quantity
    pub fn into_record(self) -> Option<Record> {
        Some(Record {
            quantity: self.quantity?,
            image_url: self.image_url,
        })
    }
}

/// How a write treats fields it does not carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// The written fields become the whole record
    Replace,
    /// Only the written fields change; the record is created if missing
    Merge,
}

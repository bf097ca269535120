//! Cloud Firestore record store over the REST documents API
//!
//! Records map to documents with an integer `quantity` field and an optional
//! string `imageUrl` field. Merge writes send an update mask so untouched
//! fields survive.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use shelf_common::{Record, RecordFields, Session, WriteMode};
use std::collections::HashMap;

use super::RecordStore;
use crate::config::FirebaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::http::status_error;

const QUANTITY_FIELD: &str = "quantity";
const IMAGE_FIELD: &str = "imageUrl";
const DEFAULT_PAGE_SIZE: u32 = 300;

/// Firestore document as returned by the REST API
#[derive(Debug, Deserialize)]
pub(crate) struct Document {
    pub name: String,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Record store backed by a Firestore database
pub struct FirestoreStore {
    client: Client,
    documents_url: String,
    id_token: Option<String>,
    page_size: u32,
}

impl FirestoreStore {
    pub fn new(client: Client, config: &FirebaseConfig, session: &Session) -> Self {
        log::info!(
            "Creating Firestore store for project {} (user {})",
            config.project_id,
            session.user_id
        );
        Self {
            client,
            documents_url: format!(
                "{}/projects/{}/databases/(default)/documents",
                config.firestore_url.trim_end_matches('/'),
                config.project_id
            ),
            id_token: session.has_token().then(|| session.id_token.clone()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, urlencoding::encode(collection))
    }

    fn document_url(&self, collection: &str, key: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(key)
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl RecordStore for FirestoreStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>> {
        let url = self.document_url(collection, key);
        log::debug!("Fetching document: {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let document: Document = response.json().await?;
        decode_record(key, &document.fields).map(Some)
    }

    async fn list_all(&self, collection: &str) -> StoreResult<Vec<(String, Record)>> {
        let url = self.collection_url(collection);
        let page_size = self.page_size.to_string();
        let mut records = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let response = self
                .authorized(self.client.get(&url).query(&query))
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(status_error(response).await);
            }

            let page: ListDocumentsResponse = response.json().await?;
            for document in page.documents {
                let key = document_key(&document.name);
                match decode_record(&key, &document.fields) {
                    Ok(record) => records.push((key, record)),
                    Err(e) => log::warn!("Skipping document {}: {}", document.name, e),
                }
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        log::debug!("Listed {} records from {}", records.len(), collection);
        Ok(records)
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        fields: RecordFields,
        mode: WriteMode,
    ) -> StoreResult<()> {
        if mode == WriteMode::Replace && fields.quantity.is_none() {
            return Err(StoreError::IncompleteWrite(key.to_string()));
        }

        let encoded = encode_fields(&fields);
        let mut request = self.client.patch(self.document_url(collection, key));
        if mode == WriteMode::Merge {
            if encoded.is_empty() {
                return Ok(());
            }
            let mask: Vec<(&str, &str)> = encoded
                .keys()
                .map(|field| ("updateMask.fieldPaths", field.as_str()))
                .collect();
            request = request.query(&mask);
        }

        let response = self
            .authorized(request)
            .json(&json!({ "fields": Value::Object(encoded) }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let response = self
            .authorized(self.client.delete(self.document_url(collection, key)))
            .send()
            .await?;
        if response.status().is_success() || response.status() == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}

/// Document key: last segment of the resource name, percent-decoded
pub(crate) fn document_key(name: &str) -> String {
    let segment = name.rsplit('/').next().unwrap_or(name);
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

pub(crate) fn decode_record(key: &str, fields: &HashMap<String, Value>) -> StoreResult<Record> {
    let malformed = |reason: &str| StoreError::MalformedRecord {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let quantity = fields
        .get(QUANTITY_FIELD)
        .ok_or_else(|| malformed("missing quantity"))?;
    let quantity = integer_value(quantity).ok_or_else(|| malformed("quantity is not an integer"))?;

    let image_url = fields
        .get(IMAGE_FIELD)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    Ok(Record {
        quantity,
        image_url,
    })
}

/// Firestore sends int64 as a JSON string; whole doubles are accepted too
fn integer_value(value: &Value) -> Option<i64> {
    if let Some(v) = value.get("integerValue") {
        return match v {
            Value::String(s) => s.parse().ok(),
            other => other.as_i64(),
        };
    }
    value
        .get("doubleValue")
        .and_then(Value::as_f64)
        .filter(|d| d.fract() == 0.0 && d.abs() < i64::MAX as f64)
        .map(|d| d as i64)
}

pub(crate) fn encode_fields(fields: &RecordFields) -> Map<String, Value> {
    let mut encoded = Map::new();
    if let Some(quantity) = fields.quantity {
        encoded.insert(
            QUANTITY_FIELD.to_string(),
            json!({ "integerValue": quantity.to_string() }),
        );
    }
    if let Some(url) = &fields.image_url {
        encoded.insert(IMAGE_FIELD.to_string(), json!({ "stringValue": url }));
    }
    encoded
}

#[cfg(test)]
#[path = "firestore_tests.rs"]
mod tests;

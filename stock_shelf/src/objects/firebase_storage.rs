//! Firebase Storage uploads over the REST API

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use shelf_common::Session;

use super::{ImagePayload, ObjectHandle, ObjectStore};
use crate::config::FirebaseConfig;
use crate::error::{StoreError, StoreResult};
use crate::http::status_error;

/// Upload response metadata (only the fields we use)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

pub struct FirebaseStorage {
    client: Client,
    bucket_url: String,
    id_token: Option<String>,
}

impl FirebaseStorage {
    pub fn new(client: Client, config: &FirebaseConfig, session: &Session) -> Self {
        Self {
            client,
            bucket_url: format!(
                "{}/b/{}/o",
                config.storage_url.trim_end_matches('/'),
                config.storage_bucket
            ),
            id_token: session.has_token().then(|| session.id_token.clone()),
        }
    }
}

#[async_trait]
impl ObjectStore for FirebaseStorage {
    async fn upload(&self, path_hint: &str, payload: &ImagePayload) -> StoreResult<ObjectHandle> {
        log::debug!(
            "Uploading {} bytes ({}) to {}",
            payload.len(),
            payload.content_type,
            path_hint
        );

        let mut request = self
            .client
            .post(&self.bucket_url)
            .query(&[("name", path_hint)])
            .header(header::CONTENT_TYPE, &payload.content_type)
            .body(payload.bytes.clone());
        if let Some(token) = &self.id_token {
            request = request.header(header::AUTHORIZATION, format!("Firebase {}", token));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let metadata: ObjectMetadata = response.json().await?;
        log::info!("Uploaded image: {}", metadata.name);
        Ok(ObjectHandle {
            path: metadata.name,
            token: metadata
                .download_tokens
                .and_then(|tokens| tokens.split(',').next().map(str::to_string)),
        })
    }

    async fn public_url(&self, handle: &ObjectHandle) -> StoreResult<String> {
        let token = handle
            .token
            .as_deref()
            .ok_or_else(|| StoreError::MalformedRecord {
                key: handle.path.clone(),
                reason: "object has no download token".to_string(),
            })?;
        Ok(format!(
            "{}/{}?alt=media&token={}",
            self.bucket_url,
            urlencoding::encode(&handle.path),
            urlencoding::encode(token)
        ))
    }
}

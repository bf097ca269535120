//! Email/password accounts through the Identity Toolkit REST API
//!
//! Signing in yields a [`Session`] that is passed explicitly to the record
//! store, the object store and the synchronizer.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shelf_common::Session;

use crate::config::FirebaseConfig;
use crate::error::{Result, ShelfError, StoreError};
use crate::http::status_error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

pub struct IdentityClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(client: Client, config: &FirebaseConfig) -> Self {
        Self {
            client,
            base_url: config.identity_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Sign in an existing account
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        log::info!("Signing in as {}", email);
        self.password_call("accounts:signInWithPassword", email, password)
            .await
    }

    /// Create an account and sign it in
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Session> {
        log::info!("Creating account for {}", email);
        self.password_call("accounts:signUp", email, password).await
    }

    async fn password_call(&self, endpoint: &str, email: &str, password: &str) -> Result<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ShelfError::Auth("email and password are required".to_string()));
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| auth_error(StoreError::from(e)))?;

        if !response.status().is_success() {
            return Err(auth_error(status_error(response).await));
        }

        let body: PasswordResponse = response
            .json()
            .await
            .map_err(|e| auth_error(StoreError::from(e)))?;
        log::info!("Signed in as user {}", body.local_id);

        let session = Session::new(body.local_id, body.id_token);
        Ok(session.with_email(body.email.unwrap_or_else(|| email.to_string())))
    }
}

/// Provider messages such as `EMAIL_NOT_FOUND` are shown as-is
fn auth_error(err: StoreError) -> ShelfError {
    match err {
        StoreError::HttpStatus { message, .. } if !message.is_empty() => ShelfError::Auth(message),
        other => ShelfError::Auth(other.to_string()),
    }
}

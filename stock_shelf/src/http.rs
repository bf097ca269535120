//! Helpers shared by the HTTP backend adapters

use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::StoreError;

pub const USER_AGENT: &str = "StockShelf/1.0";

/// Build the HTTP client used by every backend adapter
pub fn client() -> reqwest::Result<Client> {
    Client::builder().user_agent(USER_AGENT).build()
}

/// Google APIs wrap failures as `{"error": {"code", "message", "status"}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Turn a non-success response into a [`StoreError::HttpStatus`], keeping the
/// provider's error message when the body carries one
pub async fn status_error(response: Response) -> StoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);
    log::debug!("HTTP {} response body: {}", status, body);
    StoreError::HttpStatus { status, message }
}

pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().chars().take(200).collect(),
    }
}

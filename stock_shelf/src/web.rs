//! JSON API over the inventory synchronizer
//!
//! Every mutating endpoint answers with the refreshed inventory, so a client
//! never sees a write without the list that follows it.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use shelf_common::{InventoryItem, SortKey};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ShelfError;
use crate::objects::ImagePayload;
use crate::sync::InventorySync;
use crate::view::ViewState;

#[derive(Clone)]
struct AppState {
    sync: Arc<InventorySync>,
}

/// List query parameters
#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    sort: SortKey,
}

/// Body of `POST /api/items`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    name: String,
    #[serde(default = "default_quantity")]
    quantity: i64,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    name: String,
    image_url: String,
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Error side of every handler
struct ApiError(StatusCode, String);

impl From<ShelfError> for ApiError {
    fn from(err: ShelfError) -> Self {
        let status = match &err {
            ShelfError::InvalidItem(_) => StatusCode::BAD_REQUEST,
            ShelfError::StoreUnavailable(_) | ShelfError::UploadFailed(_) | ShelfError::Auth(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        ApiError(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.1),
        };
        (self.0, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// GET /api/items?q={query}&sort={sort}
async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<InventoryItem>> {
    let view = ViewState::new(params.q, params.sort);
    Ok(ApiResponse::ok(state.sync.display(&view).await))
}

/// POST /api/items
async fn add_handler(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> ApiResult<Vec<InventoryItem>> {
    let image = match request.image_base64.as_deref() {
        Some(encoded) if !encoded.is_empty() => {
            let bytes = STANDARD.decode(encoded).map_err(|e| {
                ApiError(StatusCode::BAD_REQUEST, format!("Invalid image data: {}", e))
            })?;
            let content_type = request
                .content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            Some(ImagePayload::new(bytes, content_type))
        }
        _ => None,
    };

    let items = state
        .sync
        .add_item(&request.name, request.quantity, image.as_ref())
        .await?;
    Ok(ApiResponse::ok(items))
}

/// POST /api/items/{name}/increment
async fn increment_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(state.sync.add_item(&name, 1, None).await?))
}

/// POST /api/items/{name}/decrement
async fn decrement_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(state.sync.decrement_item(&name).await?))
}

/// DELETE /api/items/{name}
async fn remove_all_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(state.sync.remove_all(&name).await?))
}

/// GET /api/items/{name}/image
async fn image_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<ImageResponse> {
    match state.sync.lookup_image(&name).await? {
        Some(image_url) => Ok(ApiResponse::ok(ImageResponse { name, image_url })),
        None => Err(ApiError(
            StatusCode::NOT_FOUND,
            format!("No image available for '{}'", name),
        )),
    }
}

/// POST /api/refresh
async fn refresh_handler(State(state): State<AppState>) -> ApiResult<Vec<InventoryItem>> {
    Ok(ApiResponse::ok(state.sync.refresh().await?))
}

/// Build the web server router
pub fn create_router(sync: Arc<InventorySync>) -> Router {
    let state = AppState { sync };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/api/items", get(list_handler).post(add_handler))
        .route("/api/items/{name}", delete(remove_all_handler))
        .route("/api/items/{name}/increment", post(increment_handler))
        .route("/api/items/{name}/decrement", post(decrement_handler))
        .route("/api/items/{name}/image", get(image_handler))
        .route("/api/refresh", post(refresh_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the web server
///
/// Binds to 0.0.0.0 (all interfaces); restrict exposure with firewall rules
/// or container port mapping.
pub async fn serve(sync: Arc<InventorySync>, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(sync);
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Web API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Web API shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Received Ctrl+C, shutting down");
}

#[cfg(test)]
#[path = "web_tests.rs"]
mod tests;

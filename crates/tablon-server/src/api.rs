//! HTTP API: thin glue mapping requests onto the store and the attachment
//! store. No business rules live here; handlers extract request fields,
//! call one typed operation, and shape the response.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use tablon_store::{Message, Store, StoreError};

use crate::attachments::{AttachmentStore, ExtensionPolicy};
use crate::config::ServerConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    /// Writers hold the lock across "mutate + persist"; readers share it.
    pub store: Arc<RwLock<Store>>,
    pub attachments: Arc<AttachmentStore>,
    pub policy: ExtensionPolicy,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/channels", get(list_channels))
        .route("/api/messages/{channel}", get(list_messages))
        .route("/api/send/{channel}", post(send_message))
        .route("/api/add_channel", post(add_channel))
        .route("/api/rename_channel", post(rename_channel))
        .route("/uploads/{filename}", get(download_attachment))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
struct AddChannelResponse {
    name: String,
}

#[derive(Deserialize)]
struct RenameRequest {
    old: String,
    new: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_channels(State(state): State<AppState>) -> Json<Vec<String>> {
    let store = state.store.read().await;
    Json(store.list_channels())
}

/// Unknown channels yield an empty list with 200, per the store's
/// lenient-read contract.
async fn list_messages(
    State(state): State<AppState>,
    Path(channel): Path<String>,
) -> Json<Vec<Message>> {
    let store = state.store.read().await;
    Json(store.messages_in(&channel).to_vec())
}

async fn send_message(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    mut multipart: Multipart,
) -> Result<StatusCode, ServerError> {
    if !state.store.read().await.contains_channel(&channel) {
        return Err(StoreError::ChannelNotFound(channel).into());
    }

    let mut sender = String::new();
    let mut body = String::new();
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => {
                sender = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))?;
            }
            "message" => {
                body = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))?;
            }
            "file" => {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))?;
                // A form submitted without a file still carries the field,
                // with an empty filename. Only a named file counts.
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    upload = Some((filename, data.to_vec()));
                }
            }
            _ => {}
        }
    }

    let attachment = match upload {
        Some((filename, data)) => Some(
            state
                .attachments
                .store(&filename, &data, |n| state.policy.allows(n))
                .await?,
        ),
        None => None,
    };

    state
        .store
        .write()
        .await
        .post_message(&channel, &sender, &body, attachment)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_channel(
    State(state): State<AppState>,
) -> Result<Json<AddChannelResponse>, ServerError> {
    let name = state.store.write().await.create_channel()?;
    info!(channel = %name, "Channel created via API");
    Ok(Json(AddChannelResponse { name }))
}

async fn rename_channel(
    State(state): State<AppState>,
    Json(req): Json<RenameRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .store
        .write()
        .await
        .rename_channel(&req.old, &req.new)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn download_attachment(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Vec<u8>, ServerError> {
    let data = state.attachments.resolve(&filename).await?;
    Ok(data)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! # tablon-server
//!
//! Single-process message-board server.
//!
//! This binary provides:
//! - The durable channel/message store (one authoritative in-memory copy,
//!   flushed to a JSON data file on every mutation)
//! - **Attachment storage** (uploaded files kept in a flat content
//!   directory under collision-resistant names)
//! - **REST API** (axum) for reading channel history, posting messages,
//!   and creating/renaming channels

mod api;
mod attachments;
mod config;
mod error;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tablon_store::{Store, DEFAULT_DATA_FILE};

use crate::api::AppState;
use crate::attachments::{AttachmentStore, ExtensionPolicy};
use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tablon_server=debug")),
        )
        .init();

    info!("Starting tablon server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // The message store. A corrupt data file aborts startup here; resetting
    // it silently would lose the whole board.
    let data_file = match config.data_file.clone() {
        Some(path) => path,
        None => tablon_store::default_data_dir()?.join(DEFAULT_DATA_FILE),
    };
    let store = Store::open_at(&data_file)?;

    // Attachment store (creates the content directory if missing)
    let upload_dir = match config.upload_dir.clone() {
        Some(path) => path,
        None => tablon_store::default_data_dir()?.join("uploads"),
    };
    let attachments = Arc::new(AttachmentStore::new(upload_dir, config.max_upload_size).await?);

    // Upload filter: allow-all unless an extension list is configured
    let policy = match &config.allowed_extensions {
        Some(extensions) => ExtensionPolicy::restrict_to(extensions.clone()),
        None => ExtensionPolicy::allow_all(),
    };

    let http_addr = config.http_addr;
    let app_state = AppState {
        store: Arc::new(RwLock::new(store)),
        attachments,
        policy,
        config: Arc::new(config),
    };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    // tokio::select! ensures that if either the HTTP server or a shutdown
    // signal arrives, we exit cleanly. Every mutation is already flushed,
    // so there is nothing left to write on the way out.
    tokio::select! {
        result = api::serve(app_state, http_addr) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

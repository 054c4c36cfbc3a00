use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use tablon_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Attachment not found: {0}")]
    AttachmentNotFound(String),

    #[error("Attachment too large: {size} bytes (max {max})")]
    AttachmentTooLarge { size: usize, max: usize },

    #[error("File type not allowed: {0}")]
    AttachmentRejected(String),

    #[error("Attachment storage error: {0}")]
    AttachmentStorage(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::AttachmentNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::AttachmentTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ServerError::AttachmentRejected(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::AttachmentStorage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Attachment storage error".to_string(),
            ),
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Store(e) => match e {
                StoreError::ChannelNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
                StoreError::NameTaken(_) => (StatusCode::CONFLICT, self.to_string()),
                StoreError::EmptyChannelName => (StatusCode::BAD_REQUEST, self.to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                ),
            },
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

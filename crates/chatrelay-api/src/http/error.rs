//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Failure kinds carried on the wire are the same stable strings the stream
//! relay uses in its terminal `error` event, so a client sees one taxonomy
//! whether a turn fails synchronously (HTTP status) or mid-stream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use chatrelay_types::error::{ChatError, RepositoryError, UpstreamError};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Turn-level chat errors (validation, unknown conversation, upstream).
    Chat(ChatError),
    /// Storage errors outside a chat turn.
    Repository(RepositoryError),
    /// Upstream errors outside a chat turn (models listing, health).
    Upstream(UpstreamError),
    /// Authentication failure.
    Unauthorized(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        AppError::Upstream(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Chat(e @ ChatError::InvalidRequest(_)) => {
                (StatusCode::BAD_REQUEST, e.kind(), e.to_string())
            }
            AppError::Chat(e @ ChatError::NotFound) => {
                (StatusCode::NOT_FOUND, e.kind(), e.to_string())
            }
            AppError::Chat(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.kind(), e.to_string()),
            AppError::Repository(RepositoryError::NotFound) => (
                StatusCode::NOT_FOUND,
                "not_found",
                "conversation not found".to_string(),
            ),
            AppError::Repository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
            }
            AppError::Upstream(e) => (StatusCode::BAD_GATEWAY, e.kind(), e.to_string()),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = json!({
            "data": null,
            "meta": {
                "request_id": uuid::Uuid::now_v7().to_string(),
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
            "errors": [{
                "code": code,
                "message": message,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}

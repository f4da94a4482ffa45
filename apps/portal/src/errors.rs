use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Coarse classification used to decide how a failure reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Timeout, connection refused, non-2xx. Surfaced as a transient alert.
    Network,
    /// Corrupt cached or fetched JSON. Recovered locally, only logged.
    Deserialization,
    /// Missing or invalid input before a write. Surfaced as a transient alert.
    Validation,
    /// Missing token or a closed session.
    Access,
    Internal,
}

/// Application-level error type.
/// Implements `IntoResponse` so dashboard handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session closed")]
    SessionClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Network(_) | AppError::Api { .. } => ErrorKind::Network,
            AppError::Deserialization(_) => ErrorKind::Deserialization,
            AppError::Validation(_) | AppError::NotFound(_) => ErrorKind::Validation,
            AppError::Unauthorized | AppError::SessionClosed => ErrorKind::Access,
            AppError::Io(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Network(e) => {
                tracing::warn!("Backend unreachable: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "NETWORK_ERROR",
                    "The job portal backend could not be reached".to_string(),
                )
            }
            AppError::Api { status, message } => {
                tracing::warn!("Backend returned {status}: {message}");
                (StatusCode::BAD_GATEWAY, "API_ERROR", message.clone())
            }
            AppError::Deserialization(e) => {
                tracing::warn!("Deserialization error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "DESERIALIZATION_ERROR",
                    "The backend returned malformed data".to_string(),
                )
            }
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::SessionClosed => (
                StatusCode::UNAUTHORIZED,
                "SESSION_CLOSED",
                "The session has been logged out".to_string(),
            ),
            AppError::Io(e) => {
                tracing::error!("IO error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IO_ERROR",
                    "A local file could not be read".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

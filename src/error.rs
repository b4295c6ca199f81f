use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application error taxonomy. Every request path resolves to one of these,
/// which in turn maps to an HTTP status and a JSON `error` body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing, malformed, or expired bearer token.
    #[error("{0}")]
    Unauthenticated(String),
    /// Valid token, but the caller does not own the record.
    #[error("{0}")]
    Forbidden(String),
    /// Bad input: missing fields, unsupported file type.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// A conditional write lost its precondition on a direct mutation path.
    #[error("{0}")]
    Conflict(String),
    /// A blob or metadata store call failed. Not retried here; details are
    /// logged and hidden from clients.
    #[error("{0}")]
    Dependency(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Dependency(msg) => {
                tracing::error!("dependency error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!("database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-level failures. Every variant is terminal for its request and
/// none is fatal to the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("username already taken")]
    AlreadyExists,
    /// Login mismatch. Deliberately the same message for an unknown
    /// username and a wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
    /// Missing, malformed, or expired token, or a subject that no longer
    /// resolves to a user.
    #[error("invalid or expired token")]
    Unauthorized,
    #[error("you can only modify your own messages")]
    Forbidden,
    #[error("message not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) | ApiError::AlreadyExists => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                // Details stay in the log, never in the response.
                let body = Json(json!({ "error": "internal server error" }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

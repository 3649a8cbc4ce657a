//! Registry error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Registry server error types mapped to HTTP status codes.
#[derive(Debug)]
pub enum RegistryError {
    Database(String),
    Auth(String),
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Database(e) => write!(f, "Database error: {}", e),
            Self::Auth(e) => write!(f, "Auth error: {}", e),
            Self::NotFound(e) => write!(f, "Not found: {}", e),
            Self::BadRequest(e) => write!(f, "Bad request: {}", e),
            Self::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Database(_) | Self::Internal(_) => {
                tracing::error!("{}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            Self::Auth(e) => (StatusCode::UNAUTHORIZED, e.clone()),
            Self::NotFound(e) => (StatusCode::NOT_FOUND, e.clone()),
            Self::BadRequest(e) => (StatusCode::BAD_REQUEST, e.clone()),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Database(e.to_string())
    }
}

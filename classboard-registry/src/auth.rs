//! Bearer token middleware for the admin endpoints.

use crate::error::RegistryError;
use crate::server::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

/// Admin middleware: when an admin token is configured, every request must
/// carry `Authorization: Bearer <token>`.
pub async fn admin_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, RegistryError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let presented = request
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| RegistryError::Auth("Missing Authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| RegistryError::Auth("Invalid auth scheme".to_string()))?;

    if !tokens_match(presented, expected) {
        tracing::warn!("Rejected admin request to {}", request.uri().path());
        return Err(RegistryError::Auth("Invalid admin token".to_string()));
    }

    Ok(next.run(request).await)
}

fn tokens_match(presented: &str, expected: &str) -> bool {
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

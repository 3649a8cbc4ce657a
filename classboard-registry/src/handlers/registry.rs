//! Tablet-facing handshake and status handlers.

use crate::error::RegistryError;
use crate::server::AppState;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::Utc;
use classboard_core::registry::{HandshakeRequest, StatusResponse};

pub async fn handshake(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<HandshakeRequest>,
) -> Result<Json<StatusResponse>, RegistryError> {
    let device_id = validate_device_id(&req.device_id, state.max_device_id_len)?;
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let device = state
        .storage
        .announce(device_id, user_agent, Utc::now().timestamp())?;

    tracing::info!(
        "Handshake from device {} ({})",
        device.device_id,
        device.status.as_str()
    );
    Ok(Json(device.status_response()))
}

pub async fn status(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> Result<Json<StatusResponse>, RegistryError> {
    let device_id = validate_device_id(&device_id, state.max_device_id_len)?;

    let device = state
        .storage
        .touch(device_id, Utc::now().timestamp())?
        .ok_or_else(|| RegistryError::NotFound(format!("Unknown device {}", device_id)))?;

    Ok(Json(device.status_response()))
}

fn validate_device_id(raw: &str, max_len: usize) -> Result<&str, RegistryError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(RegistryError::BadRequest("deviceId is required".to_string()));
    }
    if id.len() > max_len {
        return Err(RegistryError::BadRequest(format!(
            "deviceId exceeds {} characters",
            max_len
        )));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_id_validation() {
        assert_eq!(validate_device_id(" 482193 ", 64).unwrap(), "482193");
        assert!(matches!(
            validate_device_id("   ", 64),
            Err(RegistryError::BadRequest(_))
        ));
        assert!(matches!(
            validate_device_id(&"9".repeat(65), 64),
            Err(RegistryError::BadRequest(_))
        ));
    }
}

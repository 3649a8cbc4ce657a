//! Admin handlers for listing, activating and removing devices.

use crate::error::RegistryError;
use crate::server::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use classboard_core::registry::{ActivateDeviceRequest, RegisteredDevice, RegistryStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct ListDevicesQuery {
    pub status: Option<RegistryStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRouteQuery {
    pub room: String,
    pub secret_url: String,
}

#[derive(Serialize)]
pub struct ValidateRouteResponse {
    pub valid: bool,
}

pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<ListDevicesQuery>,
) -> Result<Json<Vec<RegisteredDevice>>, RegistryError> {
    let devices = state
        .storage
        .list(query.status)?
        .into_iter()
        .map(|d| d.into_registered())
        .collect();
    Ok(Json(devices))
}

/// Assign a device to a classroom and mint a fresh display secret.
/// Activating an already active device rotates its secret.
pub async fn activate_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ActivateDeviceRequest>,
) -> Result<Json<RegisteredDevice>, RegistryError> {
    let classroom = req.device_classroom.trim();
    if classroom.is_empty() {
        return Err(RegistryError::BadRequest(
            "deviceClassroom is required".to_string(),
        ));
    }
    let device_name = req
        .device_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let secret_url = Uuid::new_v4().simple().to_string();
    let device = state
        .storage
        .activate(id, classroom, device_name, &secret_url, Utc::now().timestamp())?
        .ok_or_else(|| RegistryError::NotFound(format!("Device {} not found", id)))?;

    tracing::info!(
        "Activated device {} in classroom {}",
        device.device_id,
        classroom
    );
    Ok(Json(device.into_registered()))
}

pub async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, RegistryError> {
    if !state.storage.delete(id)? {
        return Err(RegistryError::NotFound(format!("Device {} not found", id)));
    }

    tracing::info!("Deleted device record {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Lets a display page confirm that its route still belongs to an active
/// device. Unknown and stale routes are reported as invalid, not as errors.
pub async fn validate_route(
    State(state): State<AppState>,
    Query(query): Query<ValidateRouteQuery>,
) -> Result<Json<ValidateRouteResponse>, RegistryError> {
    let valid = state
        .storage
        .is_active_route(&query.room, &query.secret_url)?;
    if !valid {
        tracing::debug!("Rejected display route for room {}", query.room);
    }
    Ok(Json(ValidateRouteResponse { valid }))
}

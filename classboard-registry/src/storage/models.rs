//! Registry storage model types.

use classboard_core::registry::{DeviceConfig, RegisteredDevice, RegistryStatus, StatusResponse};

#[derive(Debug, Clone)]
pub struct StoredDevice {
    pub id: i64,
    pub device_id: String,
    pub device_name: Option<String>,
    pub device_classroom: Option<String>,
    pub secret_url: Option<String>,
    pub status: RegistryStatus,
    pub user_agent: Option<String>,
    pub registered_at: i64,
    pub last_seen_at: i64,
    pub activated_at: Option<i64>,
}

impl StoredDevice {
    pub(crate) const COLUMNS: &'static str = "id, device_id, device_name, device_classroom, \
         secret_url, status, user_agent, registered_at, last_seen_at, activated_at";

    pub(crate) fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let status: String = row.get(5)?;
        let status = RegistryStatus::parse(&status).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                5,
                rusqlite::types::Type::Text,
                format!("unknown device status {:?}", status).into(),
            )
        })?;

        Ok(Self {
            id: row.get(0)?,
            device_id: row.get(1)?,
            device_name: row.get(2)?,
            device_classroom: row.get(3)?,
            secret_url: row.get(4)?,
            status,
            user_agent: row.get(6)?,
            registered_at: row.get(7)?,
            last_seen_at: row.get(8)?,
            activated_at: row.get(9)?,
        })
    }

    /// What the tablet sees. The schema guarantees an ACTIVE row carries
    /// both classroom and secret.
    pub fn status_response(&self) -> StatusResponse {
        match (self.status, &self.device_classroom, &self.secret_url) {
            (RegistryStatus::Active, Some(room), Some(secret_url)) => {
                StatusResponse::active(DeviceConfig {
                    room: room.clone(),
                    secret_url: secret_url.clone(),
                })
            }
            _ => StatusResponse::pending(),
        }
    }

    pub fn into_registered(self) -> RegisteredDevice {
        RegisteredDevice {
            id: self.id,
            device_id: self.device_id,
            device_name: self.device_name,
            device_classroom: self.device_classroom,
            device_url: self.secret_url,
            status: self.status,
            user_agent: self.user_agent,
            registered_at: self.registered_at,
            last_seen_at: self.last_seen_at,
            activated_at: self.activated_at,
        }
    }
}

//! Registry wire models shared by the tablet and the registry service.

use serde::{Deserialize, Serialize};

/// Pairing status of a device as recorded by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistryStatus {
    Pending,
    Active,
}

impl RegistryStatus {
    /// Convert the status to its wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
        }
    }

    /// Parse a status from its wire/storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "ACTIVE" => Some(Self::Active),
            _ => None,
        }
    }
}

/// Display configuration delivered once an administrator approves a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConfig {
    pub room: String,
    pub secret_url: String,
}

impl DeviceConfig {
    /// Both fields must be non-empty for the config to address a display.
    pub fn is_complete(&self) -> bool {
        !self.room.trim().is_empty() && !self.secret_url.trim().is_empty()
    }
}

/// Body of `POST /api/registry/handshake`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandshakeRequest {
    pub device_id: String,
}

/// Response of both the handshake and the status endpoint.
///
/// `config` is present if and only if `status` is `ACTIVE`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: RegistryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<DeviceConfig>,
}

impl StatusResponse {
    pub fn pending() -> Self {
        Self {
            status: RegistryStatus::Pending,
            config: None,
        }
    }

    pub fn active(config: DeviceConfig) -> Self {
        Self {
            status: RegistryStatus::Active,
            config: Some(config),
        }
    }
}

/// A status response after shape validation on the tablet side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    Pending,
    Active(DeviceConfig),
    /// The registry answered, but the payload breaks the status/config invariant.
    Malformed(String),
}

impl StatusReport {
    /// Decode and validate a raw response body.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<StatusResponse>(body) {
            Ok(response) => response.into(),
            Err(e) => Self::Malformed(format!("undecodable status payload: {}", e)),
        }
    }
}

impl From<StatusResponse> for StatusReport {
    fn from(response: StatusResponse) -> Self {
        match (response.status, response.config) {
            (RegistryStatus::Pending, None) => Self::Pending,
            (RegistryStatus::Pending, Some(_)) => {
                Self::Malformed("PENDING status carries a config".to_string())
            }
            (RegistryStatus::Active, Some(config)) if config.is_complete() => Self::Active(config),
            (RegistryStatus::Active, Some(_)) => {
                Self::Malformed("ACTIVE status with incomplete config".to_string())
            }
            (RegistryStatus::Active, None) => {
                Self::Malformed("ACTIVE status without config".to_string())
            }
        }
    }
}

/// A device record as listed on the admin console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDevice {
    pub id: i64,
    pub device_id: String,
    pub device_name: Option<String>,
    pub device_classroom: Option<String>,
    #[serde(rename = "deviceURL")]
    pub device_url: Option<String>,
    pub status: RegistryStatus,
    pub user_agent: Option<String>,
    pub registered_at: i64,
    pub last_seen_at: i64,
    pub activated_at: Option<i64>,
}

/// Body of `PUT /api/devices/{id}`: assigns the device to a classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateDeviceRequest {
    pub device_classroom: String,
    #[serde(default)]
    pub device_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_format() {
        let json = serde_json::to_string(&StatusResponse::pending()).unwrap();
        assert_eq!(json, r#"{"status":"PENDING"}"#);

        let active = StatusResponse::active(DeviceConfig {
            room: "WI1-100".to_string(),
            secret_url: "abc123".to_string(),
        });
        let json = serde_json::to_string(&active).unwrap();
        assert_eq!(
            json,
            r#"{"status":"ACTIVE","config":{"room":"WI1-100","secretUrl":"abc123"}}"#
        );
    }

    #[test]
    fn handshake_request_uses_camel_case() {
        let req = HandshakeRequest {
            device_id: "482193".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"deviceId":"482193"}"#
        );
    }

    #[test]
    fn report_active_with_config() {
        let report = StatusReport::from_body(
            br#"{"status":"ACTIVE","config":{"room":"WI1-100","secretUrl":"abc123"}}"#,
        );
        assert_eq!(
            report,
            StatusReport::Active(DeviceConfig {
                room: "WI1-100".to_string(),
                secret_url: "abc123".to_string(),
            })
        );
    }

    #[test]
    fn report_pending_with_null_config() {
        let report = StatusReport::from_body(br#"{"status":"PENDING","config":null}"#);
        assert_eq!(report, StatusReport::Pending);
    }

    #[test]
    fn active_without_config_is_malformed() {
        let report = StatusReport::from_body(br#"{"status":"ACTIVE"}"#);
        assert!(matches!(report, StatusReport::Malformed(_)));
    }

    #[test]
    fn active_with_empty_room_is_malformed() {
        let report = StatusReport::from_body(
            br#"{"status":"ACTIVE","config":{"room":"","secretUrl":"abc123"}}"#,
        );
        assert!(matches!(report, StatusReport::Malformed(_)));
    }

    #[test]
    fn missing_or_unknown_status_is_malformed() {
        assert!(matches!(
            StatusReport::from_body(br#"{}"#),
            StatusReport::Malformed(_)
        ));
        assert!(matches!(
            StatusReport::from_body(br#"{"status":"REVOKED"}"#),
            StatusReport::Malformed(_)
        ));
        assert!(matches!(
            StatusReport::from_body(b"<html>"),
            StatusReport::Malformed(_)
        ));
    }

    #[test]
    fn status_parse_roundtrip() {
        for status in [RegistryStatus::Pending, RegistryStatus::Active] {
            assert_eq!(RegistryStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RegistryStatus::parse("pending"), None);
    }

    #[test]
    fn registered_device_keeps_legacy_url_field_name() {
        let device = RegisteredDevice {
            id: 1,
            device_id: "482193".to_string(),
            device_name: None,
            device_classroom: None,
            device_url: None,
            status: RegistryStatus::Pending,
            user_agent: None,
            registered_at: 0,
            last_seen_at: 0,
            activated_at: None,
        };
        let value = serde_json::to_value(&device).unwrap();
        assert!(value.get("deviceURL").is_some());
        assert_eq!(value["status"], "PENDING");
    }
}

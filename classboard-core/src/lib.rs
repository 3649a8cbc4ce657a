//! Classboard Core Library
//!
//! This library provides the tablet side of the Classboard pairing protocol:
//! the persisted device identity, the registry wire models and HTTP client,
//! the pairing state machine with its polling driver, and the display
//! watchdog that runs once a tablet has been assigned to a room.

pub mod config;
pub mod display;
pub mod pairing;
pub mod platform;
pub mod registry;

pub use config::TabletConfig;
pub use display::{watch_decision, DisplayWatchdog, Reroute, DEFAULT_WATCH_INTERVAL};
pub use pairing::{
    DisplayRoute, Navigator, PairingHandle, PairingMachine, PairingOutcome, PairingSession,
    PairingView, PollState, DEFAULT_POLL_INTERVAL,
};
pub use platform::{
    get_config_dir, get_data_dir, get_default_config_path, get_default_identity_path,
};
pub use registry::{
    ensure_identity, DeviceConfig, DeviceIdentity, FileIdentityStore, IdentityStore,
    MemoryIdentityStore, RegistryApi, RegistryClient, RegistryStatus, StatusReport,
    StatusResponse,
};

use thiserror::Error;

/// Result type for Classboard operations
pub type Result<T> = std::result::Result<T, ClassboardError>;

/// General error type for Classboard operations
#[derive(Error, Debug)]
pub enum ClassboardError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Registry returned status {0}")]
    Status(u16),

    #[error("Device not found: {0}")]
    NotFound(String),

    #[error("Identity storage error: {0}")]
    Identity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for ClassboardError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Http(e.to_string()),
        }
    }
}

//! Device registry integration
//!
//! - Wire models shared with the registry service
//! - Persisted 6-digit device identity
//! - HTTP client for the handshake and status endpoints

pub mod client;
pub mod identity;
pub mod models;

pub use client::{RegistryApi, RegistryClient};
pub use identity::{
    ensure_identity, generate_device_code, DeviceIdentity, FileIdentityStore, IdentityStore,
    MemoryIdentityStore, IDENTITY_KEY,
};
pub use models::{
    ActivateDeviceRequest, DeviceConfig, HandshakeRequest, RegisteredDevice, RegistryStatus,
    StatusReport, StatusResponse,
};

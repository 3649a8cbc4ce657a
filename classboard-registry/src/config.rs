//! Registry server configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub listen_addr: String,
    pub storage_path: PathBuf,
    pub max_payload_size: usize,
    pub max_device_id_len: usize,
    /// Bearer token required on the admin endpoints. Unset leaves them open.
    pub admin_token: Option<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            storage_path: PathBuf::from("registry.db"),
            max_payload_size: 16_384,
            max_device_id_len: 64,
            admin_token: None,
        }
    }
}

impl RegistryConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml_dep::from_str(&content)?;
        Ok(config)
    }
}

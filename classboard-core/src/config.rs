//! Tablet agent configuration.

use crate::platform::get_default_identity_path;
use crate::{ClassboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabletConfig {
    /// Base URL of the registry service.
    pub registry_url: String,
    /// Base URL the display route is resolved against.
    pub display_base_url: String,
    /// Where the device code is persisted. Defaults to the platform data dir.
    pub identity_path: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub watch_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Program and leading arguments used to open the display URL,
    /// e.g. `["chromium", "--kiosk"]`. The URL is appended.
    pub browser_command: Vec<String>,
}

impl Default for TabletConfig {
    fn default() -> Self {
        Self {
            registry_url: "http://localhost:5000".to_string(),
            display_base_url: "http://localhost:5173/".to_string(),
            identity_path: None,
            poll_interval_secs: 5,
            watch_interval_secs: 10,
            request_timeout_secs: 10,
            browser_command: Vec::new(),
        }
    }
}

impl TabletConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml_dep::from_str(&content)
            .map_err(|e| ClassboardError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("poll_interval_secs", self.poll_interval_secs),
            ("watch_interval_secs", self.watch_interval_secs),
            ("request_timeout_secs", self.request_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ClassboardError::Config(format!("{} must be positive", name)));
            }
        }
        Url::parse(&self.registry_url)
            .map_err(|e| ClassboardError::Config(format!("registry_url: {}", e)))?;
        self.display_base()?;
        Ok(())
    }

    pub fn display_base(&self) -> Result<Url> {
        Url::parse(&self.display_base_url)
            .map_err(|e| ClassboardError::Config(format!("display_base_url: {}", e)))
    }

    pub fn identity_path(&self) -> PathBuf {
        self.identity_path
            .clone()
            .unwrap_or_else(get_default_identity_path)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = TabletConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.watch_interval(), Duration::from_secs(10));
        assert!(config.browser_command.is_empty());
        assert!(config.validate().is_ok());
        assert!(config.identity_path().ends_with("tablet.json"));
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablet.toml");
        std::fs::write(
            &path,
            r#"
registry_url = "https://plan.example.edu"
identity_path = "/var/lib/classboard/tablet.json"
browser_command = ["chromium", "--kiosk"]
"#,
        )
        .unwrap();

        let config = TabletConfig::load(&path).unwrap();
        assert_eq!(config.registry_url, "https://plan.example.edu");
        assert_eq!(
            config.identity_path(),
            PathBuf::from("/var/lib/classboard/tablet.json")
        );
        assert_eq!(config.browser_command, vec!["chromium", "--kiosk"]);
        assert_eq!(config.poll_interval_secs, 5);
    }

    #[test]
    fn zero_interval_rejected() {
        let config = TabletConfig {
            poll_interval_secs: 0,
            ..TabletConfig::default()
        };
        assert!(matches!(config.validate(), Err(ClassboardError::Config(_))));
    }

    #[test]
    fn bad_url_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablet.toml");
        std::fs::write(&path, "display_base_url = \"not a url\"\n").unwrap();
        assert!(matches!(
            TabletConfig::load(&path),
            Err(ClassboardError::Config(_))
        ));
    }
}

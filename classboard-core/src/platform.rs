//! Platform-specific paths for tablet state and configuration

use std::path::PathBuf;

const APP_DIR: &str = "Classboard";

/// Get the platform-specific data directory for tablet state
///
/// Returns:
/// - Windows: %LOCALAPPDATA%\Classboard
/// - macOS: ~/Library/Application Support/Classboard
/// - Linux/Other: ~/.local/share/Classboard
pub fn get_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".data")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR)
}

/// Get the platform-specific config directory
pub fn get_config_dir() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(dirs::data_dir)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR)
}

/// Get the default path of the persisted device identity
pub fn get_default_identity_path() -> PathBuf {
    get_data_dir().join("tablet.json")
}

/// Get the default path of the tablet configuration file
pub fn get_default_config_path() -> PathBuf {
    get_config_dir().join("tablet.toml")
}

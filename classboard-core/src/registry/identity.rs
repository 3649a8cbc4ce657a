//! Device identity: 6-digit pairing code generation and local persistence.

use crate::{ClassboardError, Result};
use rand::Rng;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Key under which the device code is persisted.
pub const IDENTITY_KEY: &str = "tablet_uuid";

/// The identifier a tablet announces to the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub id: String,
}

impl DeviceIdentity {
    /// Generate a fresh identity with a random 6-digit code.
    pub fn generate() -> Self {
        Self {
            id: generate_device_code(),
        }
    }

    /// Whether the identifier has the fixed-width 6-digit form.
    pub fn is_device_code(&self) -> bool {
        self.id.len() == 6
            && self.id.chars().all(|c| c.is_ascii_digit())
            && !self.id.starts_with('0')
    }
}

impl std::fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.id)
    }
}

/// Generate a random 6-digit device code in `[100000, 999999]`.
pub fn generate_device_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Persistent key/value storage scoped to one device installation.
pub trait IdentityStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Return the stored identity, generating and persisting one on first run.
///
/// The store is written at most once per installation. A store that cannot
/// be read or written is an error; the identity is never regenerated
/// silently because that would break pairing continuity.
pub fn ensure_identity(store: &dyn IdentityStore) -> Result<DeviceIdentity> {
    if let Some(id) = store.get(IDENTITY_KEY)? {
        let id = id.trim().to_string();
        if !id.is_empty() {
            let identity = DeviceIdentity { id };
            if !identity.is_device_code() {
                tracing::warn!("Stored device identifier {} is not a 6-digit code", identity);
            }
            return Ok(identity);
        }
    }

    let identity = DeviceIdentity::generate();
    store.set(IDENTITY_KEY, &identity.id)?;
    tracing::info!("Generated new device code {}", identity);
    Ok(identity)
}

/// JSON file store, e.g. `~/.local/share/Classboard/tablet.json`.
pub struct FileIdentityStore {
    path: PathBuf,
}

impl FileIdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ClassboardError::Identity(format!("Failed to read {:?}: {}", self.path, e))
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ClassboardError::Identity(format!("Corrupt identity file {:?}: {}", self.path, e))
        })
    }
}

impl IdentityStore for FileIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ClassboardError::Identity(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        // Write-then-rename so a crash never leaves a truncated file behind
        let tmp = self.path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(&values)?;
        std::fs::write(&tmp, json)
            .and_then(|_| std::fs::rename(&tmp, &self.path))
            .map_err(|e| {
                ClassboardError::Identity(format!("Failed to write {:?}: {}", self.path, e))
            })
    }
}

/// In-memory store, counting writes.
#[derive(Default)]
pub struct MemoryIdentityStore {
    values: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

impl MemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| ClassboardError::Identity("identity store poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| ClassboardError::Identity("identity store poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_code_format() {
        for _ in 0..1000 {
            let code = generate_device_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }

    #[test]
    fn generated_identity_is_device_code() {
        assert!(DeviceIdentity::generate().is_device_code());
        assert!(!DeviceIdentity {
            id: "012345".to_string()
        }
        .is_device_code());
    }

    #[test]
    fn ensure_identity_is_stable() {
        let store = MemoryIdentityStore::new();
        let first = ensure_identity(&store).unwrap();
        for _ in 0..10 {
            assert_eq!(ensure_identity(&store).unwrap(), first);
        }
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn ensure_identity_keeps_existing_token() {
        let store = MemoryIdentityStore::new();
        store.set(IDENTITY_KEY, "legacy-token").unwrap();

        let identity = ensure_identity(&store).unwrap();
        assert_eq!(identity.id, "legacy-token");
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn empty_stored_value_is_replaced() {
        let store = MemoryIdentityStore::new();
        store.set(IDENTITY_KEY, "").unwrap();

        let identity = ensure_identity(&store).unwrap();
        assert!(identity.is_device_code());
        assert_eq!(store.get(IDENTITY_KEY).unwrap(), Some(identity.id));
    }

    #[test]
    fn file_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tablet.json");

        let first = ensure_identity(&FileIdentityStore::new(&path)).unwrap();
        let second = ensure_identity(&FileIdentityStore::new(&path)).unwrap();
        assert_eq!(first, second);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(IDENTITY_KEY));
        assert!(content.contains(&first.id));
    }

    #[test]
    fn corrupt_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablet.json");
        std::fs::write(&path, "not json").unwrap();

        let result = ensure_identity(&FileIdentityStore::new(&path));
        assert!(matches!(result, Err(ClassboardError::Identity(_))));
        // The corrupt file is left untouched for inspection
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json");
    }

    #[test]
    fn file_store_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tablet.json");
        std::fs::write(&path, r#"{"kiosk_mode":"on"}"#).unwrap();

        let store = FileIdentityStore::new(&path);
        ensure_identity(&store).unwrap();
        assert_eq!(store.get("kiosk_mode").unwrap(), Some("on".to_string()));
    }
}

//! SQLite storage backend for the registry.

pub mod models;

use crate::error::RegistryError;
use classboard_core::registry::RegistryStatus;
use models::StoredDevice;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Thread-safe registry storage.
#[derive(Clone)]
pub struct RegistryStorage {
    conn: Arc<Mutex<Connection>>,
}

impl RegistryStorage {
    pub fn open(path: &Path) -> Result<Self, anyhow::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;

        let storage = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    pub fn in_memory() -> Result<Self, anyhow::Error> {
        let conn = Connection::open_in_memory()?;

        let storage = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        storage.initialize_schema()?;
        Ok(storage)
    }

    fn initialize_schema(&self) -> Result<(), anyhow::Error> {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("{}", e))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id TEXT NOT NULL UNIQUE,
                device_name TEXT,
                device_classroom TEXT,
                secret_url TEXT,
                status TEXT NOT NULL DEFAULT 'PENDING'
                    CHECK (status IN ('PENDING', 'ACTIVE')),
                user_agent TEXT,
                registered_at INTEGER NOT NULL,
                last_seen_at INTEGER NOT NULL,
                activated_at INTEGER,
                CHECK (status = 'PENDING'
                       OR (device_classroom IS NOT NULL AND secret_url IS NOT NULL))
            );

            CREATE INDEX IF NOT EXISTS idx_devices_status ON devices(status);",
        )?;
        Ok(())
    }

    pub fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RegistryError> {
        self.conn
            .lock()
            .map_err(|e| RegistryError::Internal(format!("Lock error: {}", e)))
    }

    /// Record a handshake. Creates a PENDING record on first contact; a
    /// repeated announce only refreshes `last_seen_at` and the user agent.
    pub fn announce(
        &self,
        device_id: &str,
        user_agent: Option<&str>,
        now: i64,
    ) -> Result<StoredDevice, RegistryError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO devices (device_id, user_agent, registered_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(device_id) DO UPDATE SET
                last_seen_at = excluded.last_seen_at,
                user_agent = COALESCE(excluded.user_agent, devices.user_agent)",
            rusqlite::params![device_id, user_agent, now],
        )?;

        let sql = format!(
            "SELECT {} FROM devices WHERE device_id = ?1",
            StoredDevice::COLUMNS
        );
        Ok(conn.query_row(&sql, [device_id], StoredDevice::from_row)?)
    }

    /// Look up a device by its code, refreshing `last_seen_at`.
    pub fn touch(&self, device_id: &str, now: i64) -> Result<Option<StoredDevice>, RegistryError> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE devices SET last_seen_at = ?1 WHERE device_id = ?2",
            rusqlite::params![now, device_id],
        )?;

        let sql = format!(
            "SELECT {} FROM devices WHERE device_id = ?1",
            StoredDevice::COLUMNS
        );
        Ok(conn
            .query_row(&sql, [device_id], StoredDevice::from_row)
            .optional()?)
    }

    /// All devices, or only those in `status` when given.
    pub fn list(
        &self,
        status: Option<RegistryStatus>,
    ) -> Result<Vec<StoredDevice>, RegistryError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM devices WHERE ?1 IS NULL OR status = ?1 ORDER BY id",
            StoredDevice::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let devices = stmt
            .query_map([status.map(|s| s.as_str())], StoredDevice::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(devices)
    }

    /// Whether `room`/`secret_url` is the display route of an active device.
    pub fn is_active_route(&self, room: &str, secret_url: &str) -> Result<bool, RegistryError> {
        let conn = self.conn()?;
        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM devices
                WHERE status = 'ACTIVE' AND device_classroom = ?1 AND secret_url = ?2)",
            [room, secret_url],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(found)
    }

    /// Assign a device to a classroom. Status, classroom and secret change in
    /// one statement, so a reader never sees ACTIVE without a full config.
    pub fn activate(
        &self,
        id: i64,
        classroom: &str,
        device_name: Option<&str>,
        secret_url: &str,
        now: i64,
    ) -> Result<Option<StoredDevice>, RegistryError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE devices SET
                status = 'ACTIVE',
                device_classroom = ?1,
                device_name = COALESCE(?2, ?1),
                secret_url = ?3,
                activated_at = ?4
             WHERE id = ?5",
            rusqlite::params![classroom, device_name, secret_url, now, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }

        let sql = format!("SELECT {} FROM devices WHERE id = ?1", StoredDevice::COLUMNS);
        Ok(Some(conn.query_row(&sql, [id], StoredDevice::from_row)?))
    }

    pub fn delete(&self, id: i64) -> Result<bool, RegistryError> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM devices WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }
}

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use samplehub_resilience::{KeyValueStore, StoreError};

use crate::db;
use crate::errors::{IntoStore, Result};

/// Durable [`KeyValueStore`] backed by the `kv_store` table.
///
/// A single connection is shared behind a mutex; every operation is one
/// short statement, so contention stays low.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the store at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = db::open(db_path)?;
        debug!("Opened key-value store at {}", db_path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a store that lives only as long as the returned value.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_in_memory()?),
            db_path: None,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("SQLite store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Number of stored keys.
    pub fn count(&self) -> std::result::Result<usize, StoreError> {
        let conn = self.lock_conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .into_store()?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Delete every key starting with `prefix`, returning how many were removed.
    pub fn remove_prefix(&self, prefix: &str) -> std::result::Result<usize, StoreError> {
        let conn = self.lock_conn();
        conn.execute(
            "DELETE FROM kv_store WHERE substr(key, 1, length(?1)) = ?1",
            params![prefix],
        )
        .into_store()
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        let conn = self.lock_conn();
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .into_store()
    }

    fn set(&self, key: &str, value: &str) -> std::result::Result<(), StoreError> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().timestamp_millis()],
        )
        .into_store()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> std::result::Result<(), StoreError> {
        let conn = self.lock_conn();
        conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .into_store()?;
        Ok(())
    }
}

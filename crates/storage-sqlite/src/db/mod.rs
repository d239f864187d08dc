//! Connection setup and schema migrations.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, error, info};
use rusqlite::Connection;

use crate::errors::{Result, StorageError};

/// Database file name inside the application data directory.
pub const DB_FILE_NAME: &str = "samplehub.db";

/// Latest schema version, tracked through `PRAGMA user_version`.
const SCHEMA_VERSION: i64 = 1;

/// Ordered migrations; entry `n` upgrades the schema from version `n`.
const MIGRATIONS: &[&str] = &["CREATE TABLE IF NOT EXISTS kv_store (
        key        TEXT PRIMARY KEY NOT NULL,
        value      TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );"];

pub fn get_db_path(app_data_dir: &Path) -> PathBuf {
    app_data_dir.join(DB_FILE_NAME)
}

/// Open (creating if needed) the database at `db_path` and bring its schema
/// up to date.
pub fn open(db_path: &Path) -> Result<Connection> {
    if let Some(db_dir) = db_path.parent() {
        if !db_dir.as_os_str().is_empty() && !db_dir.exists() {
            fs::create_dir_all(db_dir)?;
        }
    }

    let conn = Connection::open(db_path).map_err(|e| {
        error!("Failed to open database {}: {}", db_path.display(), e);
        StorageError::ConnectionFailed(e.to_string())
    })?;
    configure(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open a private in-memory database with the current schema.
pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()
        .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
    configure(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<()> {
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("SQLite journal mode: {}", mode);
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.busy_timeout(Duration::from_secs(30))?;
    Ok(())
}

pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if current >= SCHEMA_VERSION {
        debug!("No pending migrations (schema version {})", current);
        return Ok(());
    }

    info!(
        "Migrating database schema from version {} to {}",
        current, SCHEMA_VERSION
    );
    for (version, sql) in MIGRATIONS.iter().enumerate().skip(current.max(0) as usize) {
        conn.execute_batch(sql).map_err(|e| {
            error!("Database migration {} failed: {}", version + 1, e);
            StorageError::MigrationFailed(e.to_string())
        })?;
        info!("  - applied migration {}", version + 1);
    }
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = get_db_path(&dir.path().join("nested").join("data"));

        open(&path).unwrap();
        assert!(path.exists());
    }
}

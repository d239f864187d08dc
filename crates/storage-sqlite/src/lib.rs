//! SQLite storage implementation for SampleHub.
//!
//! This crate provides the durable [`KeyValueStore`] used by the resilience
//! layer to persist the diagnostic error log and cached catalog pages.
//! It contains:
//! - Connection setup and schema migrations
//! - The `kv_store` table and its [`SqliteStore`] repository
//!
//! # Architecture
//!
//! This crate is the only place in the application where rusqlite is used.
//! The resilience crate is storage-agnostic and works with the trait.
//!
//! ```text
//!   resilience (ErrorLog, StoreCatalogCache)
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod kv;

pub use db::{get_db_path, open, open_in_memory, run_migrations, DB_FILE_NAME};
pub use errors::{IntoStore, StorageError};
pub use kv::{KeyValueStore, SqliteStore};

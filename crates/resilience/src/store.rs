//! Key-value store abstraction used for best-effort persistence.
//!
//! The error log and the catalog cache persist through [`KeyValueStore`], so
//! tests run against [`MemoryStore`] while production wires in a durable
//! implementation (see the `samplehub-storage-sqlite` crate).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use log::warn;
use thiserror::Error;

/// Errors reported by a key-value store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or opened.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A read or write was rejected by the backend.
    #[error("Store operation failed: {0}")]
    OperationFailed(String),
}

/// Minimal string-to-string store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Memory store mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock_entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock_entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock_entries().remove(key);
        Ok(())
    }
}

//! SQLite storage implementation for the key-value store.

mod repository;

pub use repository::SqliteStore;

// Re-export trait from resilience for convenience
pub use samplehub_resilience::KeyValueStore;

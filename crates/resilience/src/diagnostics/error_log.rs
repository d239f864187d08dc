//! Capacity-limited, persisted error log.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use log::{debug, warn};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{ErrorDetails, ErrorMetadata, ErrorRecord, ErrorReporter, ErrorStats};
use crate::environment::{ClientEnvironment, Connectivity};
use crate::errors::{ResilienceError, UpstreamError};
use crate::store::KeyValueStore;

/// Well-known key the log is persisted under.
pub const ERROR_LOG_STORAGE_KEY: &str = "samplehub.error_logs";

/// Default number of records kept.
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 20;

/// Width of the "recent errors" window.
const RECENT_WINDOW_MS: i64 = 60 * 60 * 1000;

const ID_SUFFIX_LEN: usize = 9;

/// Error log configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorLogConfig {
    /// Maximum number of records held (and persisted).
    pub capacity: usize,
    /// Key the JSON array is stored under.
    pub storage_key: String,
}

impl Default for ErrorLogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_ERROR_LOG_CAPACITY,
            storage_key: ERROR_LOG_STORAGE_KEY.to_string(),
        }
    }
}

impl ErrorLogConfig {
    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.capacity == 0 {
            return Err(ResilienceError::InvalidConfig(
                "error log capacity must be at least 1".to_string(),
            ));
        }
        if self.storage_key.trim().is_empty() {
            return Err(ResilienceError::InvalidConfig(
                "error log storage key must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounded, best-effort diagnostic log.
///
/// Records are kept in insertion order. Appending at capacity drops the
/// single oldest record first. Every write mirrors the full list into the
/// key-value store; store failures only produce a warning.
pub struct ErrorLog {
    records: Mutex<VecDeque<ErrorRecord>>,
    store: Arc<dyn KeyValueStore>,
    connectivity: Arc<dyn Connectivity>,
    environment: ClientEnvironment,
    reporter: Option<Arc<dyn ErrorReporter>>,
    config: ErrorLogConfig,
}

impl ErrorLog {
    /// Create a log with the default capacity, restoring persisted records.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        connectivity: Arc<dyn Connectivity>,
        environment: ClientEnvironment,
    ) -> Self {
        Self::with_config(store, connectivity, environment, ErrorLogConfig::default())
    }

    /// Create a log with custom configuration, restoring persisted records.
    pub fn with_config(
        store: Arc<dyn KeyValueStore>,
        connectivity: Arc<dyn Connectivity>,
        environment: ClientEnvironment,
        config: ErrorLogConfig,
    ) -> Self {
        let restored = restore_records(store.as_ref(), &config);
        Self {
            records: Mutex::new(restored),
            store,
            connectivity,
            environment,
            reporter: None,
            config,
        }
    }

    /// Attach an external reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    fn lock_records(&self) -> MutexGuard<'_, VecDeque<ErrorRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| {
            warn!("Error log mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn capacity(&self) -> usize {
        self.config.capacity.max(1)
    }

    /// Append a record for `error`. Never fails.
    pub fn log_error(
        &self,
        context: &str,
        error: &UpstreamError,
        details: ErrorDetails,
    ) -> ErrorRecord {
        let timestamp = Utc::now().timestamp_millis();
        let record = ErrorRecord {
            id: generate_record_id(timestamp),
            timestamp,
            context: context.to_string(),
            error_kind: details.kind,
            message: error.message.clone(),
            stack_trace: error.stack_trace.clone(),
            metadata: ErrorMetadata {
                is_online: self.connectivity.is_online(),
                url: self.environment.url.clone(),
                user_agent: self.environment.user_agent.clone(),
            },
            retry_attempt: details.retry_attempt,
        };

        {
            let mut records = self.lock_records();
            while records.len() >= self.capacity() {
                if let Some(evicted) = records.pop_front() {
                    debug!("Error log at capacity, evicting '{}'", evicted.id);
                }
            }
            records.push_back(record.clone());
            self.persist(&records);
        }

        debug!(
            "Logged {} for '{}' (attempt {})",
            record.error_kind, record.context, record.retry_attempt
        );

        if let Some(reporter) = &self.reporter {
            if let Err(e) = reporter.report(&record) {
                debug!("Ignoring reporter failure for '{}': {}", record.id, e);
            }
        }

        record
    }

    /// Snapshot of the held records, oldest first.
    pub fn records(&self) -> Vec<ErrorRecord> {
        self.lock_records().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_records().is_empty()
    }

    /// Statistics relative to the current time.
    pub fn get_error_stats(&self) -> ErrorStats {
        self.stats_at(Utc::now().timestamp_millis())
    }

    /// Statistics relative to `now_ms`, recomputed from the held records.
    pub fn stats_at(&self, now_ms: i64) -> ErrorStats {
        let records = self.lock_records();
        let window_start = now_ms - RECENT_WINDOW_MS;

        let mut errors_by_context: HashMap<String, usize> = HashMap::new();
        let mut recent_errors = 0;
        let mut retry_attempts = 0;

        for record in records.iter() {
            *errors_by_context.entry(record.context.clone()).or_insert(0) += 1;
            if record.timestamp > window_start && record.timestamp <= now_ms {
                recent_errors += 1;
            }
            if record.retry_attempt > 0 {
                retry_attempts += 1;
            }
        }

        ErrorStats {
            total_errors: records.len(),
            recent_errors,
            errors_by_context,
            retry_attempts,
        }
    }

    /// Drop every record, in memory and in the store.
    pub fn clear_error_logs(&self) {
        let mut records = self.lock_records();
        records.clear();
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!("Failed to clear persisted error log: {}", e);
        }
    }

    fn persist(&self, records: &VecDeque<ErrorRecord>) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to serialize error log: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.config.storage_key, &payload) {
            warn!("Failed to persist error log: {}", e);
        }
    }
}

fn generate_record_id(timestamp: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("err_{}_{}", timestamp, suffix)
}

fn restore_records(store: &dyn KeyValueStore, config: &ErrorLogConfig) -> VecDeque<ErrorRecord> {
    let payload = match store.get(&config.storage_key) {
        Ok(Some(payload)) => payload,
        Ok(None) => return VecDeque::new(),
        Err(e) => {
            warn!("Failed to load persisted error log: {}", e);
            return VecDeque::new();
        }
    };

    let mut records: VecDeque<ErrorRecord> = match serde_json::from_str(&payload) {
        Ok(records) => records,
        Err(e) => {
            warn!("Discarding unreadable persisted error log: {}", e);
            return VecDeque::new();
        }
    };

    let capacity = config.capacity.max(1);
    while records.len() > capacity {
        records.pop_front();
    }
    debug!("Restored {} persisted error records", records.len());
    records
}

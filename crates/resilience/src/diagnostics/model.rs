//! Error log records and aggregate statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ErrorKind;

/// Host snapshot captured when a record is written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMetadata {
    pub is_online: bool,
    pub url: String,
    pub user_agent: String,
}

/// A single logged failure. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Call site or dependency the failure belongs to.
    pub context: String,
    pub error_kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    pub metadata: ErrorMetadata,
    pub retry_attempt: u32,
}

/// Caller-supplied details for a log entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ErrorDetails {
    pub kind: ErrorKind,
    pub retry_attempt: u32,
}

impl ErrorDetails {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            retry_attempt: 0,
        }
    }

    pub fn with_retry_attempt(mut self, attempt: u32) -> Self {
        self.retry_attempt = attempt;
        self
    }
}

/// Aggregate view over the records currently held by the log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStats {
    pub total_errors: usize,
    /// Records timestamped within the last hour of the query time.
    pub recent_errors: usize,
    pub errors_by_context: HashMap<String, usize>,
    /// Records logged on a retry rather than on a first attempt.
    pub retry_attempts: usize,
}

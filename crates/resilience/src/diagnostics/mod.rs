//! Bounded diagnostic error log.
//!
//! Every failed provider attempt is appended to an [`ErrorLog`]. The log keeps
//! at most `capacity` records (oldest evicted first), mirrors them into a
//! [`KeyValueStore`](crate::store::KeyValueStore) and optionally forwards each
//! record to an [`ErrorReporter`]. Nothing in this module can fail the caller:
//! persistence and reporter errors are downgraded to log warnings.

mod error_log;
mod model;
mod reporter;

pub use error_log::{ErrorLog, ErrorLogConfig, DEFAULT_ERROR_LOG_CAPACITY, ERROR_LOG_STORAGE_KEY};
pub use model::{ErrorDetails, ErrorMetadata, ErrorRecord, ErrorStats};
pub use reporter::{ErrorReporter, LogReporter, ReportError};

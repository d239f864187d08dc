//! External reporting hook for logged errors.

use log::warn;
use thiserror::Error;

use super::ErrorRecord;

/// Failure raised by an [`ErrorReporter`]. Always swallowed by the log.
#[derive(Error, Debug)]
#[error("Error reporter failed: {0}")]
pub struct ReportError(pub String);

/// Receives every record right after it is written to the log.
///
/// Invoked synchronously on the logging path, so implementations should hand
/// work off rather than block.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, record: &ErrorRecord) -> Result<(), ReportError>;
}

/// Reporter that re-emits records through the `log` facade under the
/// `samplehub::errors` target.
#[derive(Debug, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, record: &ErrorRecord) -> Result<(), ReportError> {
        warn!(
            target: "samplehub::errors",
            "[{}] {} in '{}' (attempt {}): {}",
            record.id, record.error_kind, record.context, record.retry_attempt, record.message
        );
        Ok(())
    }
}

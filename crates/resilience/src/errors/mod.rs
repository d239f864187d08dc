//! Error types and failure classification for the resilience crate.
//!
//! This module provides:
//! - [`UpstreamError`]: A raw failure reported by a provider call
//! - [`ClassifiedError`]: An upstream failure paired with its [`ErrorClassification`]
//! - [`ErrorClassifier`]: Maps raw failures onto the [`ErrorKind`] taxonomy
//! - [`ResilienceError`]: Configuration and persistence failures

mod classification;

pub use classification::{
    classify_with_status, ErrorClassification, ErrorClassifier, ErrorKind, Severity,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type alias for Result using [`ResilienceError`].
pub type Result<T> = std::result::Result<T, ResilienceError>;

/// A failure reported by the external catalog provider.
///
/// The retry executor only ever sees this shape. Adapters around concrete
/// transports (HTTP clients, SDKs) convert their own errors into it, keeping
/// the status code when one is available.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct UpstreamError {
    /// Raw provider or transport message. Never shown to end users.
    pub message: String,
    /// HTTP status code, when the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Optional backtrace or provider trace payload, kept for diagnostics.
    pub stack_trace: Option<String>,
}

impl UpstreamError {
    /// Creates an error from a bare message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            stack_trace: None,
        }
    }

    /// Creates an error for a non-success HTTP response.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            stack_trace: None,
        }
    }

    /// Creates a timeout-shaped error.
    ///
    /// Callers that need a hard deadline wrap the primary operation and
    /// return this when the deadline passes; the classifier maps it to
    /// [`ErrorKind::NetworkTimeout`].
    pub fn timeout(operation: &str, after: Duration) -> Self {
        Self::new(format!(
            "Request to {} timed out after {}ms",
            operation,
            after.as_millis()
        ))
    }

    /// Creates an error for a transport-level failure (DNS, refused connection...).
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(format!("Network error: {}", message.into()))
    }

    /// Attaches a stack trace to the error.
    pub fn with_stack_trace(mut self, trace: impl Into<String>) -> Self {
        self.stack_trace = Some(trace.into());
        self
    }
}

/// An upstream failure together with the classification that drove the
/// retry/fallback decision.
///
/// Returned by the retry executor when it gives up without a fallback. The
/// original [`UpstreamError`] is carried unmodified.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}: {}", .classification.kind, .error)]
pub struct ClassifiedError {
    pub error: UpstreamError,
    pub classification: ErrorClassification,
}

impl ClassifiedError {
    pub fn new(error: UpstreamError, classification: ErrorClassification) -> Self {
        Self {
            error,
            classification,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.classification.kind
    }

    /// The message that is safe to show to end users.
    pub fn user_message(&self) -> &str {
        &self.classification.user_message
    }

    /// Consumes the wrapper and returns the original upstream error.
    pub fn into_upstream(self) -> UpstreamError {
        self.error
    }
}

/// Errors raised by the resilience layer itself (never by providers).
#[derive(Error, Debug)]
pub enum ResilienceError {
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The key-value store rejected an operation.
    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),

    /// Persisted data could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_constructors() {
        let err = UpstreamError::http(403, "quota exceeded");
        assert_eq!(err.status, Some(403));
        assert_eq!(err.to_string(), "quota exceeded");

        let err = UpstreamError::timeout("catalog search", Duration::from_millis(2500));
        assert_eq!(err.message, "Request to catalog search timed out after 2500ms");
        assert_eq!(err.status, None);

        let err = UpstreamError::network("connection refused").with_stack_trace("at connect()");
        assert_eq!(err.message, "Network error: connection refused");
        assert_eq!(err.stack_trace.as_deref(), Some("at connect()"));
    }

    #[test]
    fn test_classified_error_display_and_unwrap() {
        let upstream = UpstreamError::http(429, "Too Many Requests");
        let classification = classify_with_status(&upstream, true);
        let err = ClassifiedError::new(upstream.clone(), classification);

        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.to_string(), "RATE_LIMITED: Too Many Requests");
        assert!(!err.user_message().contains("Too Many Requests"));
        assert_eq!(err.into_upstream(), upstream);
    }

    #[test]
    fn test_resilience_error_display() {
        let err = ResilienceError::InvalidConfig("baseDelayMs must be greater than 0".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: baseDelayMs must be greater than 0"
        );
    }
}

//! Classification of raw provider failures.
//!
//! Every failure seen by the retry executor is mapped onto a closed
//! [`ErrorKind`] taxonomy. The resulting [`ErrorClassification`] tells the
//! executor and orchestrator what to do next:
//!
//! | Kind | Severity | Retryable | Fallback eligible | Retry after |
//! |------|----------|-----------|-------------------|-------------|
//! | `NetworkOffline` | warning | No | Yes | - |
//! | `CorsBlocked` | error | No | Yes | - |
//! | `QuotaExceeded` | warning | No | Yes | - |
//! | `ResourceUnavailable` | warning | No | No | - |
//! | `RateLimited` | warning | Yes | Yes | 60s |
//! | `NetworkTimeout` | warning | Yes | Yes | 10s |
//! | `NetworkGeneric` | warning | Yes | Yes | 5s |
//! | `UnknownUpstream` | error | Yes | Yes | - |
//!
//! Classification is a pure function of the error and the online signal.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::UpstreamError;
use crate::environment::Connectivity;

const NETWORK_MARKERS: &[&str] = &[
    "network",
    "fetch",
    "connection",
    "connect",
    "offline",
    "dns",
    "socket",
    "unreachable",
    "timeout",
    "timed out",
];

const CORS_MARKERS: &[&str] = &["cors", "cross-origin", "access-control-allow-origin"];

const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out"];

const UNAVAILABLE_MARKERS: &[&str] = &["not found", "unavailable"];

const RATE_LIMIT_MARKERS: &[&str] = &["too many requests", "rate limit"];

/// Closed taxonomy of upstream failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NetworkOffline,
    NetworkTimeout,
    NetworkGeneric,
    CorsBlocked,
    QuotaExceeded,
    RateLimited,
    ResourceUnavailable,
    UnknownUpstream,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkOffline => "NETWORK_OFFLINE",
            Self::NetworkTimeout => "NETWORK_TIMEOUT",
            Self::NetworkGeneric => "NETWORK_GENERIC",
            Self::CorsBlocked => "CORS_BLOCKED",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::RateLimited => "RATE_LIMITED",
            Self::ResourceUnavailable => "RESOURCE_UNAVAILABLE",
            Self::UnknownUpstream => "UNKNOWN_UPSTREAM",
        }
    }

    /// User-facing message template for this kind.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NetworkOffline => {
                "You appear to be offline. Showing saved samples until your connection returns."
            }
            Self::NetworkTimeout => "The sample library is taking too long to respond. Retrying shortly.",
            Self::NetworkGeneric => "We couldn't reach the sample library. Retrying shortly.",
            Self::CorsBlocked => "The sample library refused the request. Showing saved samples instead.",
            Self::QuotaExceeded => {
                "The sample library's daily limit has been reached. Showing saved samples instead."
            }
            Self::RateLimited => "Too many searches in a short time. Please wait a minute.",
            Self::ResourceUnavailable => "This sample is no longer available.",
            Self::UnknownUpstream => "Something went wrong while loading samples.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity of a classified failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Actionable description of a failure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub severity: Severity,
    /// Whether another attempt against the same provider may succeed.
    pub retryable: bool,
    /// Whether the failure indicates a systemic outage that justifies
    /// serving cached or placeholder data.
    pub fallback_eligible: bool,
    /// Suggested wait before trying the provider again.
    pub retry_after_ms: Option<u64>,
    /// Message safe to display to end users.
    pub user_message: String,
}

impl ErrorClassification {
    /// Builds the fixed classification for a kind.
    pub fn for_kind(kind: ErrorKind) -> Self {
        let (severity, retryable, fallback_eligible, retry_after_ms) = match kind {
            ErrorKind::NetworkOffline => (Severity::Warning, false, true, None),
            ErrorKind::CorsBlocked => (Severity::Error, false, true, None),
            ErrorKind::QuotaExceeded => (Severity::Warning, false, true, None),
            ErrorKind::ResourceUnavailable => (Severity::Warning, false, false, None),
            ErrorKind::RateLimited => (Severity::Warning, true, true, Some(60_000)),
            ErrorKind::NetworkTimeout => (Severity::Warning, true, true, Some(10_000)),
            ErrorKind::NetworkGeneric => (Severity::Warning, true, true, Some(5_000)),
            ErrorKind::UnknownUpstream => (Severity::Error, true, true, None),
        };

        Self {
            kind,
            severity,
            retryable,
            fallback_eligible,
            retry_after_ms,
            user_message: kind.user_message().to_string(),
        }
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Classifies an error against an explicit online signal.
///
/// Rules are evaluated in order and the first match wins, because provider
/// messages routinely satisfy several of them at once.
pub fn classify_with_status(error: &UpstreamError, online: bool) -> ErrorClassification {
    let message = error.message.to_lowercase();
    let status = error.status;

    let kind = if !online && contains_any(&message, NETWORK_MARKERS) {
        ErrorKind::NetworkOffline
    } else if contains_any(&message, CORS_MARKERS) {
        ErrorKind::CorsBlocked
    } else if message.contains("quota") && status.map_or(true, |s| s == 403) {
        ErrorKind::QuotaExceeded
    } else if status == Some(404) || contains_any(&message, UNAVAILABLE_MARKERS) {
        ErrorKind::ResourceUnavailable
    } else if status == Some(429) || contains_any(&message, RATE_LIMIT_MARKERS) {
        ErrorKind::RateLimited
    } else if contains_any(&message, TIMEOUT_MARKERS) {
        ErrorKind::NetworkTimeout
    } else if contains_any(&message, NETWORK_MARKERS) {
        ErrorKind::NetworkGeneric
    } else {
        ErrorKind::UnknownUpstream
    };

    ErrorClassification::for_kind(kind)
}

/// Classifier bound to the host's connectivity signal.
pub struct ErrorClassifier {
    connectivity: Arc<dyn Connectivity>,
}

impl ErrorClassifier {
    pub fn new(connectivity: Arc<dyn Connectivity>) -> Self {
        Self { connectivity }
    }

    /// Current online status as reported by the host.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Classifies an error using the current online status.
    pub fn classify(&self, error: &UpstreamError) -> ErrorClassification {
        classify_with_status(error, self.is_online())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::ConnectivityFlag;

    #[test]
    fn test_quota_exceeded_is_not_retryable() {
        let err = UpstreamError::http(403, "YouTube API quota exceeded");
        let c = classify_with_status(&err, true);

        assert_eq!(c.kind, ErrorKind::QuotaExceeded);
        assert_eq!(c.severity, Severity::Warning);
        assert!(!c.retryable);
        assert!(c.fallback_eligible);
        assert_eq!(c.retry_after_ms, None);
    }

    #[test]
    fn test_quota_on_other_status_is_not_quota() {
        let err = UpstreamError::http(500, "quota service crashed");
        assert_eq!(classify_with_status(&err, true).kind, ErrorKind::UnknownUpstream);
    }

    #[test]
    fn test_fetch_failed_while_offline() {
        let err = UpstreamError::new("fetch failed");
        let c = classify_with_status(&err, false);

        assert_eq!(c.kind, ErrorKind::NetworkOffline);
        assert!(!c.retryable);
        assert!(c.fallback_eligible);
    }

    #[test]
    fn test_fetch_failed_while_online_is_generic_network() {
        let err = UpstreamError::new("fetch failed");
        let c = classify_with_status(&err, true);

        assert_eq!(c.kind, ErrorKind::NetworkGeneric);
        assert!(c.retryable);
        assert_eq!(c.retry_after_ms, Some(5_000));
    }

    #[test]
    fn test_offline_non_network_error_falls_through() {
        let err = UpstreamError::http(429, "Too Many Requests");
        assert_eq!(classify_with_status(&err, false).kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_cors_wins_over_network() {
        let err = UpstreamError::new("Network request blocked by CORS policy");
        let c = classify_with_status(&err, true);

        assert_eq!(c.kind, ErrorKind::CorsBlocked);
        assert_eq!(c.severity, Severity::Error);
        assert!(!c.retryable);
    }

    #[test]
    fn test_offline_wins_over_cors() {
        let err = UpstreamError::new("fetch blocked: cross-origin request");
        assert_eq!(classify_with_status(&err, false).kind, ErrorKind::NetworkOffline);
    }

    #[test]
    fn test_not_found_is_not_fallback_eligible() {
        let err = UpstreamError::http(404, "Video not found");
        let c = classify_with_status(&err, true);

        assert_eq!(c.kind, ErrorKind::ResourceUnavailable);
        assert!(!c.retryable);
        assert!(!c.fallback_eligible);

        let err = UpstreamError::new("Sample unavailable in your region");
        assert_eq!(
            classify_with_status(&err, true).kind,
            ErrorKind::ResourceUnavailable
        );
    }

    #[test]
    fn test_rate_limited() {
        let c = classify_with_status(&UpstreamError::http(429, "slow down"), true);
        assert_eq!(c.kind, ErrorKind::RateLimited);
        assert!(c.retryable);
        assert_eq!(c.retry_after_ms, Some(60_000));

        let c = classify_with_status(&UpstreamError::new("Too Many Requests"), true);
        assert_eq!(c.kind, ErrorKind::RateLimited);
    }

    #[test]
    fn test_timeout() {
        let c = classify_with_status(&UpstreamError::new("Request timed out"), true);
        assert_eq!(c.kind, ErrorKind::NetworkTimeout);
        assert!(c.retryable);
        assert_eq!(c.retry_after_ms, Some(10_000));
    }

    #[test]
    fn test_unknown_upstream() {
        let c = classify_with_status(&UpstreamError::http(500, "Internal Server Error"), true);
        assert_eq!(c.kind, ErrorKind::UnknownUpstream);
        assert_eq!(c.severity, Severity::Error);
        assert!(c.retryable);
        assert!(c.fallback_eligible);
        assert_eq!(c.retry_after_ms, None);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let c = classify_with_status(&UpstreamError::new("QUOTA EXCEEDED"), true);
        assert_eq!(c.kind, ErrorKind::QuotaExceeded);
    }

    #[test]
    fn test_user_message_never_leaks_raw_text() {
        let err = UpstreamError::http(500, "panic at provider/internal.rs:42");
        let c = classify_with_status(&err, true);
        assert!(!c.user_message.contains("provider/internal.rs"));
        assert_eq!(c.user_message, ErrorKind::UnknownUpstream.user_message());
    }

    #[test]
    fn test_classifier_follows_connectivity_flag() {
        let flag = Arc::new(ConnectivityFlag::new(true));
        let classifier = ErrorClassifier::new(flag.clone());
        let err = UpstreamError::new("fetch failed");

        assert_eq!(classifier.classify(&err).kind, ErrorKind::NetworkGeneric);

        flag.set_online(false);
        assert_eq!(classifier.classify(&err).kind, ErrorKind::NetworkOffline);
    }

    #[test]
    fn test_kind_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CorsBlocked).unwrap();
        assert_eq!(json, "\"CORS_BLOCKED\"");
        assert_eq!(ErrorKind::QuotaExceeded.to_string(), "QUOTA_EXCEEDED");
    }
}

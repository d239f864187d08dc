//! Property-based integration tests for the resilience layer.
//!
//! These tests verify that universal properties hold across all valid inputs,
//! using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use std::sync::Arc;
use samplehub_resilience::{
    classify_with_status, ClientEnvironment, ConnectivityFlag, ErrorClassification, ErrorDetails,
    ErrorKind, ErrorLog, ErrorLogConfig, HealthConfig, MemoryStore, RetryPolicy,
    ServiceHealthTracker, UpstreamError,
};

// =============================================================================
// Generators
// =============================================================================

/// Generates a valid retry policy.
fn arb_policy() -> impl Strategy<Value = RetryPolicy> {
    (0u32..6, 1u64..5_000, 0u64..60_000, 0.0f64..=1.0).prop_map(
        |(max_retries, base_delay_ms, extra, jitter_ratio)| RetryPolicy {
            max_retries,
            base_delay_ms,
            max_delay_ms: base_delay_ms + extra,
            jitter_ratio,
        },
    )
}

/// Generates a provider failure, biased towards the messages providers emit.
fn arb_upstream_error() -> impl Strategy<Value = UpstreamError> {
    let message = prop_oneof![
        Just("quota exceeded".to_string()),
        Just("Failed to fetch".to_string()),
        Just("Network request failed".to_string()),
        Just("Request timed out".to_string()),
        Just("Too many requests".to_string()),
        Just("Video not found".to_string()),
        Just("blocked by CORS policy".to_string()),
        "[a-z ]{0,40}",
    ];
    let status = proptest::option::of(prop_oneof![
        Just(403u16),
        Just(404),
        Just(429),
        Just(500),
        Just(503),
        100u16..600,
    ]);
    (message, status).prop_map(|(message, status)| UpstreamError {
        message,
        status,
        stack_trace: None,
    })
}

fn new_log(capacity: usize) -> ErrorLog {
    ErrorLog::with_config(
        Arc::new(MemoryStore::new()),
        Arc::new(ConnectivityFlag::online()),
        ClientEnvironment::default(),
        ErrorLogConfig {
            capacity,
            ..Default::default()
        },
    )
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every computed delay sits inside the jitter band around the clamped
    /// exponential term, and never above `max_delay_ms * (1 + jitter)`.
    #[test]
    fn prop_delay_within_jitter_band(policy in arb_policy(), attempt in 0u32..40) {
        let delay_ms = policy.calculate_delay(attempt).as_secs_f64() * 1_000.0;
        let exponential = policy.exponential_delay_ms(attempt);
        let jitter = policy.jitter_ratio;
        let tolerance = 1e-6;

        prop_assert!(delay_ms >= exponential * (1.0 - jitter) - tolerance);
        prop_assert!(delay_ms <= exponential * (1.0 + jitter) + tolerance);
        prop_assert!(delay_ms <= policy.max_delay_ms as f64 * (1.0 + jitter) + tolerance);
    }

    /// The exponential term never decreases with the attempt number.
    #[test]
    fn prop_exponential_term_is_monotonic(policy in arb_policy(), attempt in 0u32..64) {
        prop_assert!(policy.exponential_delay_ms(attempt) <= policy.exponential_delay_ms(attempt + 1));
    }

    /// The log holds at most `capacity` records, and they are always the most
    /// recent ones in insertion order.
    #[test]
    fn prop_error_log_keeps_most_recent(capacity in 1usize..30, count in 0usize..60) {
        let log = new_log(capacity);
        let error = UpstreamError::new("boom");

        for i in 0..count {
            log.log_error(&format!("ctx-{}", i), &error, ErrorDetails::new(ErrorKind::UnknownUpstream));
        }

        let records = log.records();
        prop_assert_eq!(records.len(), count.min(capacity));

        let expected: Vec<String> = (count.saturating_sub(capacity)..count)
            .map(|i| format!("ctx-{}", i))
            .collect();
        let actual: Vec<String> = records.iter().map(|r| r.context.clone()).collect();
        prop_assert_eq!(actual, expected);

        let stats = log.get_error_stats();
        prop_assert_eq!(stats.total_errors, records.len());
        prop_assert_eq!(stats.errors_by_context.values().sum::<usize>(), records.len());
    }

    /// Classification is deterministic, always uses the fixed table for its
    /// kind, and never leaks the raw provider message.
    #[test]
    fn prop_classification_is_deterministic(error in arb_upstream_error(), online in any::<bool>()) {
        let first = classify_with_status(&error, online);
        let second = classify_with_status(&error, online);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &ErrorClassification::for_kind(first.kind));
        prop_assert_ne!(first.user_message.as_str(), error.message.as_str());
        if online {
            prop_assert_ne!(first.kind, ErrorKind::NetworkOffline);
        }
    }

    /// Without probes, a dependency is available exactly when its trailing
    /// run of failures is shorter than the threshold.
    #[test]
    fn prop_health_follows_trailing_failures(
        threshold in 1u32..6,
        events in proptest::collection::vec(any::<bool>(), 0..40),
    ) {
        let tracker = ServiceHealthTracker::with_config(HealthConfig {
            failure_threshold: threshold,
            ..Default::default()
        });
        let error = UpstreamError::http(500, "Internal Server Error");

        for &success in &events {
            if success {
                tracker.record_success("provider");
            } else {
                tracker.record_failure("provider", &error);
            }
        }

        let trailing = events.iter().rev().take_while(|&&s| !s).count() as u32;
        let health = tracker.get_health("provider");
        prop_assert_eq!(health.consecutive_failures, trailing);
        prop_assert_eq!(health.available, trailing < threshold);
    }
}

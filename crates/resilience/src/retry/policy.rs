//! Retry policy and backoff computation.

use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::ResilienceError;

/// Retry policy supplied per call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total attempts = max_retries + 1).
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each subsequent one.
    pub base_delay_ms: u64,
    /// Upper bound for the exponential term.
    pub max_delay_ms: u64,
    /// Relative spread applied around the exponential term, in `[0, 1]`.
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter_ratio: 0.5,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.base_delay_ms == 0 {
            return Err(ResilienceError::InvalidConfig(
                "baseDelayMs must be greater than 0".to_string(),
            ));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(ResilienceError::InvalidConfig(format!(
                "maxDelayMs ({}) must be at least baseDelayMs ({})",
                self.max_delay_ms, self.base_delay_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter_ratio) {
            return Err(ResilienceError::InvalidConfig(format!(
                "jitterRatio must be within [0, 1], got {}",
                self.jitter_ratio
            )));
        }
        Ok(())
    }

    fn jitter(&self) -> f64 {
        self.jitter_ratio.clamp(0.0, 1.0)
    }

    /// Exponential term for `attempt`, clamped to `max_delay_ms`.
    pub fn exponential_delay_ms(&self, attempt: u32) -> f64 {
        let factor = 2f64.powi(attempt.min(1_023) as i32);
        (self.base_delay_ms as f64 * factor).min(self.max_delay_ms as f64)
    }

    /// Inclusive range the jittered delay for `attempt` falls in, in milliseconds.
    pub fn delay_bounds_ms(&self, attempt: u32) -> (f64, f64) {
        let exponential = self.exponential_delay_ms(attempt);
        let jitter = self.jitter();
        let ceiling = self.max_delay_ms as f64 * (1.0 + jitter);
        (
            exponential * (1.0 - jitter),
            (exponential * (1.0 + jitter)).min(ceiling),
        )
    }

    /// Backoff before retry number `attempt + 1`.
    ///
    /// Drawn uniformly from `[e * (1 - j), e * (1 + j)]` where `e` is the
    /// clamped exponential term, then capped at `max_delay_ms * (1 + j)`.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let sample: f64 = rand::thread_rng().gen();
        self.delay_for_sample(attempt, sample)
    }

    /// Deterministic form of [`calculate_delay`](Self::calculate_delay) for a
    /// sample in `[0, 1)`.
    pub(crate) fn delay_for_sample(&self, attempt: u32, sample: f64) -> Duration {
        let (low, high) = self.delay_bounds_ms(attempt);
        let delay_ms = low + (high - low) * sample.clamp(0.0, 1.0);
        Duration::from_secs_f64(delay_ms.max(0.0) / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay_ms, 1_000);
        assert_eq!(policy.max_delay_ms, 30_000);
        assert_eq!(policy.jitter_ratio, 0.5);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_exponential_growth_and_clamp() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.exponential_delay_ms(0), 1_000.0);
        assert_eq!(policy.exponential_delay_ms(1), 2_000.0);
        assert_eq!(policy.exponential_delay_ms(4), 16_000.0);
        assert_eq!(policy.exponential_delay_ms(5), 30_000.0);
        assert_eq!(policy.exponential_delay_ms(u32::MAX), 30_000.0);
    }

    #[test]
    fn test_jitter_bounds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_sample(0, 0.0), Duration::from_millis(500));
        assert_eq!(policy.delay_for_sample(0, 1.0), Duration::from_millis(1_500));
        assert_eq!(policy.delay_for_sample(10, 1.0), Duration::from_millis(45_000));
        assert_eq!(policy.delay_for_sample(10, 0.0), Duration::from_millis(15_000));
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        let policy = RetryPolicy {
            jitter_ratio: 0.0,
            ..Default::default()
        };
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(4_000));
    }

    #[test]
    fn test_validation() {
        let zero_base = RetryPolicy {
            base_delay_ms: 0,
            ..Default::default()
        };
        assert!(zero_base.validate().is_err());

        let inverted = RetryPolicy {
            max_delay_ms: 10,
            ..Default::default()
        };
        assert!(inverted.validate().is_err());

        let wild_jitter = RetryPolicy {
            jitter_ratio: 1.5,
            ..Default::default()
        };
        assert!(wild_jitter.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"maxRetries": 1}"#).unwrap();
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.base_delay_ms, 1_000);
    }
}

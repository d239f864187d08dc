//! Aggregate configuration for the resilience layer.

use serde::{Deserialize, Serialize};

use crate::diagnostics::ErrorLogConfig;
use crate::errors::Result;
use crate::health::HealthConfig;
use crate::retry::RetryPolicy;

/// Every tunable of the resilience layer in one place.
///
/// Missing fields fall back to their defaults, so a partial JSON document
/// such as `{"retry": {"maxRetries": 1}}` is valid.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResilienceConfig {
    pub retry: RetryPolicy,
    pub health: HealthConfig,
    pub error_log: ErrorLogConfig,
}

impl ResilienceConfig {
    /// Check every section, reporting the first invalid one.
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        self.health.validate()?;
        self.error_log.validate()?;
        Ok(())
    }

    /// Parse a JSON document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ResilienceError;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ResilienceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ResilienceConfig::from_json(r#"{"retry": {"maxRetries": 1}, "health": {}}"#).unwrap();

        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert_eq!(config.health, HealthConfig::default());
        assert_eq!(config.error_log.capacity, 20);
    }

    #[test]
    fn test_invalid_section_is_rejected() {
        let err = ResilienceConfig::from_json(r#"{"health": {"failureThreshold": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, ResilienceError::InvalidConfig(_)));

        let err = ResilienceConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ResilienceError::Serialization(_)));
    }
}

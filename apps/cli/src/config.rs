use std::time::Duration;

use samplehub_resilience::{HealthConfig, ResilienceConfig, RetryPolicy};

pub struct Config {
    pub provider_url: String,
    pub db_path: String,
    pub request_timeout: Duration,
    pub resilience: ResilienceConfig,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let provider_url = std::env::var("SAMPLEHUB_PROVIDER_URL")
            .unwrap_or_else(|_| "http://localhost:8787/api".into());
        let db_path =
            std::env::var("SAMPLEHUB_DB_PATH").unwrap_or_else(|_| "./db/samplehub.db".into());
        let timeout_ms: u64 = env_or("SAMPLEHUB_REQUEST_TIMEOUT_MS", 10_000);

        let retry_defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: env_or("SAMPLEHUB_MAX_RETRIES", retry_defaults.max_retries),
            base_delay_ms: env_or("SAMPLEHUB_BASE_DELAY_MS", retry_defaults.base_delay_ms),
            max_delay_ms: env_or("SAMPLEHUB_MAX_DELAY_MS", retry_defaults.max_delay_ms),
            ..retry_defaults
        };

        let health_defaults = HealthConfig::default();
        let interval_secs: u64 = env_or(
            "SAMPLEHUB_HEALTH_CHECK_INTERVAL_SECS",
            health_defaults.health_check_interval_ms / 1_000,
        );
        let health = HealthConfig {
            failure_threshold: env_or(
                "SAMPLEHUB_FAILURE_THRESHOLD",
                health_defaults.failure_threshold,
            ),
            health_check_interval_ms: interval_secs.saturating_mul(1_000),
        };

        Self {
            provider_url,
            db_path,
            request_timeout: Duration::from_millis(timeout_ms),
            resilience: ResilienceConfig {
                retry,
                health,
                ..Default::default()
            },
        }
    }
}

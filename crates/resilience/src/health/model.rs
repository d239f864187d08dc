//! Health tracker domain models.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{ResilienceError, UpstreamError};

/// Default consecutive failures before a dependency is marked degraded.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;

/// Default wait before a degraded dependency is probed again (5 minutes).
pub const DEFAULT_HEALTH_CHECK_INTERVAL_MS: u64 = 5 * 60 * 1000;

/// Health state of a single dependency. Timestamps are epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthState {
    /// Normal operation.
    Available,
    /// Calls are short-circuited to the fallback.
    #[serde(rename_all = "camelCase")]
    Degraded { since: i64 },
    /// A single trial call is in flight.
    #[serde(rename_all = "camelCase")]
    Probing { degraded_since: i64, started_at: i64 },
}

impl HealthState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Degraded { .. } => "degraded",
            Self::Probing { .. } => "probing",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Answer to "may I call this dependency now?".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    /// Dependency is healthy, call it.
    Allowed,
    /// Dependency is degraded but due for a check; this caller is the probe.
    Probe,
    /// Dependency is degraded (or already being probed); use the fallback.
    Rejected,
}

impl Admission {
    pub fn is_permitted(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Health tracker configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthConfig {
    /// Consecutive failures before the dependency is degraded (default: 3).
    pub failure_threshold: u32,
    /// Wait after degradation before a probe is admitted (default: 5 minutes).
    pub health_check_interval_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            health_check_interval_ms: DEFAULT_HEALTH_CHECK_INTERVAL_MS,
        }
    }
}

impl HealthConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ResilienceError> {
        if self.failure_threshold == 0 {
            return Err(ResilienceError::InvalidConfig(
                "failureThreshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Full per-dependency health record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceHealthState {
    pub dependency_name: String,
    pub state: HealthState,
    pub consecutive_failures: u32,
    pub last_success_at: Option<i64>,
    pub last_failure_at: Option<i64>,
    /// Most recent failure, for operators and for deriving user notices.
    pub last_error: Option<UpstreamError>,
}

impl ServiceHealthState {
    pub fn new(dependency_name: impl Into<String>) -> Self {
        Self {
            dependency_name: dependency_name.into(),
            state: HealthState::Available,
            consecutive_failures: 0,
            last_success_at: None,
            last_failure_at: None,
            last_error: None,
        }
    }

    pub fn available(&self) -> bool {
        self.state.is_available()
    }

    pub fn degraded_since(&self) -> Option<i64> {
        match self.state {
            HealthState::Available => None,
            HealthState::Degraded { since } => Some(since),
            HealthState::Probing { degraded_since, .. } => Some(degraded_since),
        }
    }
}

/// Compact view returned by `get_health`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSnapshot {
    pub available: bool,
    pub consecutive_failures: u32,
    pub state: HealthState,
}

/// Per-dependency entry of the [`HealthReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    pub available: bool,
    pub failure_count: u32,
}

/// Aggregate status across dependencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Unavailable,
}

impl OverallHealth {
    /// Healthy when nothing is down, unavailable when everything is down.
    pub fn from_reports<'a>(reports: impl IntoIterator<Item = &'a DependencyReport>) -> Self {
        let (total, down) = reports.into_iter().fold((0usize, 0usize), |(total, down), r| {
            (total + 1, down + usize::from(!r.available))
        });

        if down == 0 {
            Self::Healthy
        } else if down == total {
            Self::Unavailable
        } else {
            Self::Degraded
        }
    }
}

/// Health report consumed by UI and ops tooling.
///
/// Serializes as `{ "<dependency>": {available, failureCount}, "overall": ..., "lastUpdated": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    #[serde(flatten)]
    pub dependencies: BTreeMap<String, DependencyReport>,
    pub overall: OverallHealth,
    pub last_updated: i64,
}

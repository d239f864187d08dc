//! Per-dependency health tracker.
//!
//! Tracks consecutive failures for each named dependency and short-circuits
//! calls once a dependency is degraded. The tracker is in-memory and resets
//! on application restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use log::{debug, info, warn};

use super::model::{
    Admission, DependencyReport, HealthConfig, HealthReport, HealthSnapshot, HealthState,
    OverallHealth, ServiceHealthState,
};
use crate::errors::UpstreamError;

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Thread-safe health tracker shared by every in-flight fetch.
pub struct ServiceHealthTracker {
    /// Per-dependency state.
    states: Mutex<HashMap<String, ServiceHealthState>>,
    config: HealthConfig,
}

impl ServiceHealthTracker {
    /// Create a tracker with default settings.
    pub fn new() -> Self {
        Self::with_config(HealthConfig::default())
    }

    /// Create a tracker with custom configuration.
    pub fn with_config(config: HealthConfig) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Lock the state map, recovering from poison if necessary.
    ///
    /// A poisoned lock at worst leaves one dependency with a stale counter.
    fn lock_states(&self) -> MutexGuard<'_, HashMap<String, ServiceHealthState>> {
        self.states.lock().unwrap_or_else(|poisoned| {
            warn!("Health tracker mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn interval_ms(&self) -> i64 {
        i64::try_from(self.config.health_check_interval_ms).unwrap_or(i64::MAX)
    }

    /// Decide whether a caller may invoke the dependency.
    ///
    /// Handles the Degraded -> Probing transition: once the health-check
    /// interval has elapsed since degradation, exactly one caller receives
    /// [`Admission::Probe`]. A probe that never reports back is considered
    /// abandoned after another full interval and a new probe is admitted.
    pub fn admit(&self, dependency: &str) -> Admission {
        let mut states = self.lock_states();
        let state = states
            .entry(dependency.to_string())
            .or_insert_with(|| ServiceHealthState::new(dependency));

        let now = now_ms();
        match state.state {
            HealthState::Available => Admission::Allowed,
            HealthState::Degraded { since } => {
                if now.saturating_sub(since) >= self.interval_ms() {
                    info!(
                        "Health tracker: probing '{}' after {}ms degraded",
                        dependency,
                        now - since
                    );
                    state.state = HealthState::Probing {
                        degraded_since: since,
                        started_at: now,
                    };
                    Admission::Probe
                } else {
                    Admission::Rejected
                }
            }
            HealthState::Probing {
                degraded_since,
                started_at,
            } => {
                if now.saturating_sub(started_at) >= self.interval_ms() {
                    warn!(
                        "Health tracker: probe for '{}' never reported back, admitting a new one",
                        dependency
                    );
                    state.state = HealthState::Probing {
                        degraded_since,
                        started_at: now,
                    };
                    Admission::Probe
                } else {
                    Admission::Rejected
                }
            }
        }
    }

    /// Record a successful call. Always resets the failure counter.
    pub fn record_success(&self, dependency: &str) {
        let mut states = self.lock_states();
        let state = states
            .entry(dependency.to_string())
            .or_insert_with(|| ServiceHealthState::new(dependency));

        if !state.state.is_available() {
            info!(
                "Health tracker: '{}' recovered ({} -> available)",
                dependency, state.state
            );
        } else if state.consecutive_failures > 0 {
            debug!(
                "Health tracker: success for '{}', failure count reset",
                dependency
            );
        }

        state.state = HealthState::Available;
        state.consecutive_failures = 0;
        state.last_success_at = Some(now_ms());
    }

    /// Record a failed call.
    ///
    /// Degrades the dependency once the threshold is reached. A failed probe
    /// re-degrades it with a fresh `degraded_since`.
    pub fn record_failure(&self, dependency: &str, error: &UpstreamError) {
        let mut states = self.lock_states();
        let state = states
            .entry(dependency.to_string())
            .or_insert_with(|| ServiceHealthState::new(dependency));

        let now = now_ms();
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_failure_at = Some(now);
        state.last_error = Some(error.clone());

        match state.state {
            HealthState::Available => {
                if state.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        "Health tracker: degrading '{}' after {} consecutive failures",
                        dependency, state.consecutive_failures
                    );
                    state.state = HealthState::Degraded { since: now };
                } else {
                    debug!(
                        "Health tracker: failure for '{}' ({}/{})",
                        dependency, state.consecutive_failures, self.config.failure_threshold
                    );
                }
            }
            HealthState::Probing { .. } => {
                info!(
                    "Health tracker: probe for '{}' failed, staying degraded",
                    dependency
                );
                state.state = HealthState::Degraded { since: now };
            }
            HealthState::Degraded { .. } => {
                debug!(
                    "Health tracker: additional failure for '{}' (already degraded)",
                    dependency
                );
            }
        }
    }

    /// Compact health view. Unknown dependencies are reported available.
    pub fn get_health(&self, dependency: &str) -> HealthSnapshot {
        let states = self.lock_states();
        match states.get(dependency) {
            Some(state) => HealthSnapshot {
                available: state.available(),
                consecutive_failures: state.consecutive_failures,
                state: state.state,
            },
            None => HealthSnapshot {
                available: true,
                consecutive_failures: 0,
                state: HealthState::Available,
            },
        }
    }

    /// Current state for a dependency.
    pub fn state(&self, dependency: &str) -> HealthState {
        self.get_health(dependency).state
    }

    /// Full record for a dependency, if it has been seen.
    pub fn snapshot(&self, dependency: &str) -> Option<ServiceHealthState> {
        self.lock_states().get(dependency).cloned()
    }

    /// Report across every tracked dependency.
    pub fn health_report(&self) -> HealthReport {
        let states = self.lock_states();
        let dependencies: BTreeMap<String, DependencyReport> = states
            .iter()
            .map(|(name, state)| {
                (
                    name.clone(),
                    DependencyReport {
                        available: state.available(),
                        failure_count: state.consecutive_failures,
                    },
                )
            })
            .collect();
        let overall = OverallHealth::from_reports(dependencies.values());

        HealthReport {
            dependencies,
            overall,
            last_updated: now_ms(),
        }
    }

    /// Reset a dependency to Available.
    pub fn reset(&self, dependency: &str) {
        let mut states = self.lock_states();
        if let Some(state) = states.get_mut(dependency) {
            info!("Health tracker: manually resetting '{}'", dependency);
            *state = ServiceHealthState::new(dependency);
        }
    }

    /// Forget every tracked dependency.
    pub fn reset_all(&self) {
        self.lock_states().clear();
        info!("Health tracker: all dependencies reset");
    }
}

impl Default for ServiceHealthTracker {
    fn default() -> Self {
        Self::new()
    }
}

//! Per-dependency health tracking.
//!
//! Each tracked dependency moves through three states:
//!
//! ```text
//!   Available --(failures >= threshold)--> Degraded
//!   Degraded  --(interval elapsed, first caller)--> Probing
//!   Probing   --(success)--> Available
//!   Probing   --(failure)--> Degraded (degraded_since reset)
//! ```
//!
//! While degraded, callers are told to skip the dependency entirely and go
//! straight to their fallback. Health state lives in memory only and resets
//! when the process restarts.

mod model;
mod tracker;

pub use model::{
    Admission, DependencyReport, HealthConfig, HealthReport, HealthSnapshot, HealthState,
    OverallHealth, ServiceHealthState,
};
pub use tracker::ServiceHealthTracker;

//! Per-fetch tier tracking for fallback diagnostics.

use serde::{Deserialize, Serialize};

/// A tier of the fallback chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Cache,
    Placeholder,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Cache => write!(f, "cache"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// Why a tier was not attempted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    /// The host reported no connectivity.
    Offline,
    /// The health tracker rejected the call.
    Degraded,
}

/// Result of a single tier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "camelCase")]
pub enum AttemptOutcome {
    Skipped(SkipReason),
    Failed(String),
    /// Cache had nothing for the query.
    Miss,
    Success,
}

/// Record of a single tier during a fetch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierAttempt {
    pub tier: Tier,
    pub outcome: AttemptOutcome,
}

/// Ordered record of every tier touched by one fetch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchDiagnostics {
    pub attempts: Vec<TierAttempt>,
}

impl FetchDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    fn push(&mut self, tier: Tier, outcome: AttemptOutcome) {
        self.attempts.push(TierAttempt { tier, outcome });
    }

    pub fn record_skip(&mut self, tier: Tier, reason: SkipReason) {
        self.push(tier, AttemptOutcome::Skipped(reason));
    }

    pub fn record_error(&mut self, tier: Tier, error: String) {
        self.push(tier, AttemptOutcome::Failed(error));
    }

    pub fn record_miss(&mut self, tier: Tier) {
        self.push(tier, AttemptOutcome::Miss);
    }

    pub fn record_success(&mut self, tier: Tier) {
        self.push(tier, AttemptOutcome::Success);
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success => format!("{}: SUCCESS", a.tier),
                AttemptOutcome::Miss => format!("{}: MISS", a.tier),
                AttemptOutcome::Skipped(reason) => format!("{}: SKIPPED ({:?})", a.tier, reason),
                AttemptOutcome::Failed(err) => format!("{}: ERROR ({})", a.tier, err),
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// Tier that produced the data, if any.
    pub fn served_by(&self) -> Option<Tier> {
        self.attempts
            .iter()
            .find(|a| a.outcome == AttemptOutcome::Success)
            .map(|a| a.tier)
    }

    /// Whether the primary provider was actually invoked.
    pub fn primary_attempted(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| a.tier == Tier::Primary && !matches!(a.outcome, AttemptOutcome::Skipped(_)))
    }

    /// All recorded errors.
    pub fn errors(&self) -> Vec<(Tier, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| match &a.outcome {
                AttemptOutcome::Failed(e) => Some((a.tier, e.as_str())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = FetchDiagnostics::new();
        diag.record_error(Tier::Primary, "QUOTA_EXCEEDED: quota exceeded".to_string());
        diag.record_miss(Tier::Cache);
        diag.record_success(Tier::Placeholder);

        assert_eq!(
            diag.summary(),
            "primary: ERROR (QUOTA_EXCEEDED: quota exceeded) -> cache: MISS -> placeholder: SUCCESS"
        );
        assert_eq!(diag.served_by(), Some(Tier::Placeholder));
        assert!(diag.primary_attempted());
    }

    #[test]
    fn test_skipped_primary_is_not_attempted() {
        let mut diag = FetchDiagnostics::new();
        diag.record_skip(Tier::Primary, SkipReason::Degraded);
        diag.record_success(Tier::Cache);

        assert!(!diag.primary_attempted());
        assert!(diag.summary().contains("primary: SKIPPED (Degraded)"));
        assert_eq!(diag.served_by(), Some(Tier::Cache));
    }

    #[test]
    fn test_errors() {
        let mut diag = FetchDiagnostics::new();
        diag.record_error(Tier::Primary, "timeout".to_string());
        diag.record_error(Tier::Cache, "disk".to_string());
        diag.record_success(Tier::Placeholder);

        assert_eq!(
            diag.errors(),
            vec![(Tier::Primary, "timeout"), (Tier::Cache, "disk")]
        );
    }
}

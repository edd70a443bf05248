//! Shared severity classification, used identically by the differ, the
//! intent-drift scorer, and the compatibility summary helper below.

use serde::{Deserialize, Serialize};

/// Severity of a reported issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Breaking,
    Warning,
    Info,
}

impl Severity {
    /// Bucket an intent-drift composite score: `>= 0.7` is low drift,
    /// `>= 0.4` medium, otherwise high. Severities here reuse the same
    /// three-value scale the differ uses, but the mapping runs in the
    /// opposite direction: a *high-severity* drift is a *low* similarity
    /// score, so this returns a dedicated `DriftSeverity`, not `Severity`.
    pub fn from_drift_score(score: f64) -> DriftSeverity {
        if score >= 0.7 {
            DriftSeverity::Low
        } else if score >= 0.4 {
            DriftSeverity::Medium
        } else {
            DriftSeverity::High
        }
    }
}

/// Severity bucket for an intent-drift composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    Low,
    Medium,
    High,
}

/// Render "no issues found" as a single affirmative `Info` line instead of
/// an empty report. Applies across the differ's batch diff and the drift
/// scorer's batch pass alike. `breaking_count` must be `<= issue_count`;
/// any breaking issue upgrades the whole summary to `Severity::Breaking`,
/// otherwise a non-empty, non-breaking issue set is a `Warning`.
pub fn compatibility_summary(breaking_count: usize, issue_count: usize) -> (Severity, String) {
    if issue_count == 0 {
        (Severity::Info, "no issues found".to_string())
    } else if breaking_count > 0 {
        (
            Severity::Breaking,
            format!("{breaking_count} breaking, {issue_count} issue(s) found"),
        )
    } else {
        (
            Severity::Warning,
            format!("{issue_count} issue(s) found"),
        )
    }
}

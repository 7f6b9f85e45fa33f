// homeport-core/src/model/report.rs
// ============================================================================
// Module: Homeport Validation Report
// Description: Immutable check results and the aggregated validation report.
// Purpose: Record heterogeneous health-check outcomes with derived counts.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! Check results are immutable once produced. The validation report keeps
//! results in registration order for reproducible diffing and derives its
//! counts and overall status at read time instead of storing them
//! redundantly. Only a failed critical check renders the estate unhealthy;
//! advisory failures are surfaced without flipping the overall status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::CheckId;
use crate::model::time::Timestamp;

// ============================================================================
// SECTION: Check Results
// ============================================================================

/// Severity assigned to a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSeverity {
    /// Informational only.
    Info,
    /// Advisory; a failure never flips the overall status.
    Warn,
    /// Load-bearing; a failure renders the estate unhealthy.
    Critical,
}

/// Outcome reported by a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    /// The check passed.
    Pass,
    /// The check failed.
    Fail,
}

/// Immutable result of one health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Check identifier.
    pub check_name: CheckId,
    /// Check severity.
    pub severity: CheckSeverity,
    /// Check outcome.
    pub outcome: CheckOutcome,
    /// One-line explanation of the outcome.
    pub message: String,
    /// Observation timestamp.
    pub observed_at: Timestamp,
}

// ============================================================================
// SECTION: Validation Report
// ============================================================================

/// Overall estate status derived from the check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// No critical check failed.
    Healthy,
    /// At least one critical check failed.
    Unhealthy,
}

/// Aggregated outcome of one validation pass.
///
/// Results keep registration order so successive reports diff cleanly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Check results in registration order.
    pub results: Vec<CheckResult>,
    /// Report generation timestamp.
    pub generated_at: Timestamp,
}

impl ValidationReport {
    /// Returns the number of passing checks.
    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.results.iter().filter(|result| result.outcome == CheckOutcome::Pass).count()
    }

    /// Returns the number of failing checks at any severity.
    #[must_use]
    pub fn fail_count(&self) -> usize {
        self.results.iter().filter(|result| result.outcome == CheckOutcome::Fail).count()
    }

    /// Returns the number of failing checks at warn severity.
    #[must_use]
    pub fn warn_count(&self) -> usize {
        self.results
            .iter()
            .filter(|result| {
                result.outcome == CheckOutcome::Fail && result.severity == CheckSeverity::Warn
            })
            .count()
    }

    /// Returns the overall estate status.
    ///
    /// Unhealthy iff at least one critical-severity check failed.
    #[must_use]
    pub fn overall_status(&self) -> OverallStatus {
        let critical_failed = self.results.iter().any(|result| {
            result.severity == CheckSeverity::Critical && result.outcome == CheckOutcome::Fail
        });
        if critical_failed {
            OverallStatus::Unhealthy
        } else {
            OverallStatus::Healthy
        }
    }

    /// Returns the failing results in registration order.
    #[must_use]
    pub fn failures(&self) -> Vec<&CheckResult> {
        self.results.iter().filter(|result| result.outcome == CheckOutcome::Fail).collect()
    }
}

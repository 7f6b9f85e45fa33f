// homeport-checks/src/phase.rs
// ============================================================================
// Module: Phase Match Check
// Description: Health check for lifecycle phase of selected objects.
// Purpose: Verify all selector-matched objects report an expected phase.
// Dependencies: homeport-core
// ============================================================================

//! ## Overview
//! The phase match check lists objects by label selector and verifies every
//! match reports the expected lifecycle phase. Non-matching objects are
//! enumerated in the result message for diagnosability; an empty selection
//! fails because the expectation cannot be confirmed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use homeport_core::CheckId;
use homeport_core::CheckOutcome;
use homeport_core::CheckResult;
use homeport_core::CheckRunner;
use homeport_core::CheckSeverity;
use homeport_core::Clock;
use homeport_core::ClusterApi;
use homeport_core::LabelSelector;
use homeport_core::NamespaceId;
use homeport_core::ObjectState;

// ============================================================================
// SECTION: Phase Match Check
// ============================================================================

/// Health check verifying selected objects are in an expected phase.
pub struct PhaseMatchCheck {
    /// Check identifier.
    check_id: CheckId,
    /// Failure severity.
    severity: CheckSeverity,
    /// Cluster interface used for the listing.
    cluster: Arc<dyn ClusterApi>,
    /// Namespace scoping the selection.
    namespace: NamespaceId,
    /// Label selector applied to the listing.
    selector: LabelSelector,
    /// Expected lifecycle phase, e.g. `Running`.
    expected_phase: String,
}

impl PhaseMatchCheck {
    /// Creates a phase match check for the given selection.
    #[must_use]
    pub fn new(
        check_id: CheckId,
        severity: CheckSeverity,
        cluster: Arc<dyn ClusterApi>,
        namespace: NamespaceId,
        selector: LabelSelector,
        expected_phase: impl Into<String>,
    ) -> Self {
        Self {
            check_id,
            severity,
            cluster,
            namespace,
            selector,
            expected_phase: expected_phase.into(),
        }
    }

    /// Builds the outcome from a successful listing.
    fn evaluate(&self, objects: &[ObjectState]) -> (CheckOutcome, String) {
        if objects.is_empty() {
            return (
                CheckOutcome::Fail,
                format!("no objects match {} in {}", self.selector, self.namespace),
            );
        }
        let mismatched: Vec<String> = objects
            .iter()
            .filter(|object| object.phase.as_deref() != Some(self.expected_phase.as_str()))
            .map(|object| {
                format!(
                    "{}/{} ({})",
                    object.kind,
                    object.name,
                    object.phase.as_deref().unwrap_or("no phase")
                )
            })
            .collect();
        if mismatched.is_empty() {
            (
                CheckOutcome::Pass,
                format!("all {} matching objects are {}", objects.len(), self.expected_phase),
            )
        } else {
            (
                CheckOutcome::Fail,
                format!("not {}: {}", self.expected_phase, mismatched.join(", ")),
            )
        }
    }
}

impl CheckRunner for PhaseMatchCheck {
    fn check_id(&self) -> CheckId {
        self.check_id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        self.severity
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        let (outcome, message) = match self.cluster.list_by_selector(&self.namespace, &self.selector)
        {
            Ok(objects) => self.evaluate(&objects),
            Err(err) => (
                CheckOutcome::Fail,
                format!("selection {} could not be observed: {err}", self.selector),
            ),
        };

        CheckResult {
            check_name: self.check_id.clone(),
            severity: self.severity,
            outcome,
            message,
            observed_at: clock.now(),
        }
    }
}

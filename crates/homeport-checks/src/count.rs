// homeport-checks/src/count.rs
// ============================================================================
// Module: Count Threshold Check
// Description: Health check for minimum counts of selected objects.
// Purpose: Grade shortfalls by severity: below minimum warns, zero is critical.
// Dependencies: homeport-core
// ============================================================================

//! ## Overview
//! The count threshold check verifies that at least a minimum number of
//! objects match a selector. The reported severity grades the shortfall: a
//! partial shortfall is advisory while a count of zero is critical, since an
//! entirely absent resource class points at a deployment defect rather than
//! a lagging rollout.

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

// ============================================================================
// SECTION: Count Threshold Check
// ============================================================================

/// Health check verifying a minimum count of selected objects.
pub struct CountThresholdCheck {
    /// Check identifier.
    check_id: CheckId,
    /// Cluster interface used for the listing.
    cluster: Arc<dyn ClusterApi>,
    /// Namespace scoping the selection.
    namespace: NamespaceId,
    /// Label selector applied to the listing.
    selector: LabelSelector,
    /// Minimum number of matching objects.
    minimum: usize,
}

impl CountThresholdCheck {
    /// Creates a count threshold check for the given selection.
    #[must_use]
    pub fn new(
        check_id: CheckId,
        cluster: Arc<dyn ClusterApi>,
        namespace: NamespaceId,
        selector: LabelSelector,
        minimum: usize,
    ) -> Self {
        Self {
            check_id,
            cluster,
            namespace,
            selector,
            minimum,
        }
    }
}

impl CheckRunner for CountThresholdCheck {
    fn check_id(&self) -> CheckId {
        self.check_id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        // Worst case this check can report.
        CheckSeverity::Critical
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        let (severity, outcome, message) =
            match self.cluster.list_by_selector(&self.namespace, &self.selector) {
                Ok(objects) => {
                    let count = objects.len();
                    if count >= self.minimum {
                        (
                            CheckSeverity::Info,
                            CheckOutcome::Pass,
                            format!("{count} of {} required objects present", self.minimum),
                        )
                    } else if count == 0 {
                        (
                            CheckSeverity::Critical,
                            CheckOutcome::Fail,
                            format!("no objects match {} in {}", self.selector, self.namespace),
                        )
                    } else {
                        (
                            CheckSeverity::Warn,
                            CheckOutcome::Fail,
                            format!("{count} of {} required objects present", self.minimum),
                        )
                    }
                }
                Err(err) => (
                    CheckSeverity::Critical,
                    CheckOutcome::Fail,
                    format!("selection {} could not be observed: {err}", self.selector),
                ),
            };

        CheckResult {
            check_name: self.check_id.clone(),
            severity,
            outcome,
            message,
            observed_at: clock.now(),
        }
    }
}

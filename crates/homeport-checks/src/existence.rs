// homeport-checks/src/existence.rs
// ============================================================================
// Module: Existence Check
// Description: Health check for named cluster object existence.
// Purpose: Fail at the configured severity when a named object is absent.
// Dependencies: homeport-core
// ============================================================================

//! ## Overview
//! The existence check reads one named cluster object or namespace and fails
//! when it is absent. Severity is per check: a missing load-bearing namespace
//! is critical while an optional extra may be advisory. Secret presence
//! guaranteed by earlier provisioning steps is validated with this same
//! check.

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
use homeport_core::NamespaceId;

// ============================================================================
// SECTION: Existence Target
// ============================================================================

/// Named target whose existence is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExistenceTarget {
    /// A namespace known by name.
    Namespace {
        /// Namespace expected to exist.
        namespace: NamespaceId,
    },
    /// A single named object.
    Object {
        /// Namespace containing the object, if namespaced.
        namespace: Option<NamespaceId>,
        /// Object kind.
        kind: String,
        /// Object name.
        name: String,
    },
}

impl ExistenceTarget {
    /// Returns a one-line description of the target.
    fn describe(&self) -> String {
        match self {
            Self::Namespace {
                namespace,
            } => format!("namespace {namespace}"),
            Self::Object {
                namespace,
                kind,
                name,
            } => match namespace {
                Some(namespace) => format!("{kind}/{name} in {namespace}"),
                None => format!("{kind}/{name}"),
            },
        }
    }
}

// ============================================================================
// SECTION: Existence Check
// ============================================================================

/// Health check verifying that a named cluster object exists.
pub struct ExistenceCheck {
    /// Check identifier.
    check_id: CheckId,
    /// Failure severity.
    severity: CheckSeverity,
    /// Cluster interface used for the read.
    cluster: Arc<dyn ClusterApi>,
    /// Target whose existence is verified.
    target: ExistenceTarget,
}

impl ExistenceCheck {
    /// Creates an existence check for the given target.
    #[must_use]
    pub fn new(
        check_id: CheckId,
        severity: CheckSeverity,
        cluster: Arc<dyn ClusterApi>,
        target: ExistenceTarget,
    ) -> Self {
        Self {
            check_id,
            severity,
            cluster,
            target,
        }
    }
}

impl CheckRunner for ExistenceCheck {
    fn check_id(&self) -> CheckId {
        self.check_id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        self.severity
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        let observed = match &self.target {
            ExistenceTarget::Namespace {
                namespace,
            } => self.cluster.namespace_exists(namespace),
            ExistenceTarget::Object {
                namespace,
                kind,
                name,
            } => self
                .cluster
                .get_object(kind, namespace.as_ref(), name)
                .map(|state| state.is_some()),
        };

        let (outcome, message) = match observed {
            Ok(true) => (CheckOutcome::Pass, format!("{} exists", self.target.describe())),
            Ok(false) => (CheckOutcome::Fail, format!("{} is absent", self.target.describe())),
            Err(err) => (
                CheckOutcome::Fail,
                format!("{} could not be observed: {err}", self.target.describe()),
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

// homeport-core/src/model/run.rs
// ============================================================================
// Module: Homeport Run Records
// Description: Append-only records for one orchestration invocation.
// Purpose: Capture phase, action, and gate outcomes for reporting and logs.
// Dependencies: serde, crate::model
// ============================================================================

//! ## Overview
//! An orchestration run owns the ordered phase records of one invocation.
//! Records are append-only and process-scoped; all durable state remains the
//! cluster's own resource store. Once a run is aborted no further phases
//! execute and already-applied resources are left in place.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::model::condition::ReadinessCondition;
use crate::model::identifiers::EnvironmentId;
use crate::model::identifiers::PhaseId;
use crate::model::plan::ApplyAction;
use crate::model::resource::ApplyReport;
use crate::model::time::Timestamp;

// ============================================================================
// SECTION: Phase Lifecycle
// ============================================================================

/// Phase lifecycle states.
///
/// Terminal states are final; a phase is never re-entered within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Phase has not started.
    Pending,
    /// Phase actions are executing.
    Applying,
    /// Phase gates are being evaluated.
    Gating,
    /// All actions succeeded and all gates were satisfied.
    Succeeded,
    /// Phase recorded warnings under the warn policy but the run continued.
    CompletedWithWarnings,
    /// Phase failed terminally.
    Failed,
}

impl PhaseStatus {
    /// Returns true when the status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::CompletedWithWarnings | Self::Failed)
    }
}

// ============================================================================
// SECTION: Action and Gate Records
// ============================================================================

/// Outcome of one apply action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Action rendered and applied; per-object dispositions recorded.
    Applied {
        /// Apply report for the action's resource set.
        report: ApplyReport,
    },
    /// Resource-set rendering failed; nothing was submitted.
    RenderFailed {
        /// Render failure cause.
        reason: String,
    },
    /// The cluster rejected a resource.
    ApplyFailed {
        /// Apply failure cause.
        reason: String,
    },
    /// Action was skipped after an earlier fatal failure in the phase.
    Skipped,
}

/// Record of one apply action within a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The declared action.
    pub action: ApplyAction,
    /// The action outcome.
    pub outcome: ActionOutcome,
}

/// Result of one readiness gate wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateResult {
    /// Whether a satisfying observation occurred within the timeout.
    pub satisfied: bool,
    /// Whether cancellation stopped the wait before resolution.
    pub cancelled: bool,
    /// Elapsed wait in milliseconds.
    pub elapsed_ms: u64,
    /// Last observation summary, for diagnosability on timeout.
    pub last_observation: String,
}

/// Record of one readiness gate within a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRecord {
    /// The declared readiness condition.
    pub condition: ReadinessCondition,
    /// The gate wait result.
    pub result: GateResult,
}

// ============================================================================
// SECTION: Phase Record
// ============================================================================

/// Record of one phase within an orchestration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Phase identifier.
    pub phase_id: PhaseId,
    /// Terminal phase status.
    pub status: PhaseStatus,
    /// Action records in declared order.
    pub actions: Vec<ActionRecord>,
    /// Gate records in declared order.
    pub gates: Vec<GateRecord>,
    /// Phase start timestamp.
    pub started_at: Timestamp,
    /// Phase completion timestamp.
    pub finished_at: Option<Timestamp>,
}

// ============================================================================
// SECTION: Orchestration Run
// ============================================================================

/// Orchestration run status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is executing.
    InProgress,
    /// All phases reached a non-fatal terminal state.
    Completed,
    /// A fatal failure or cancellation stopped the run.
    Aborted,
}

/// Warning accumulated from a warn-policy phase failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    /// Phase that produced the warning.
    pub phase_id: PhaseId,
    /// One-line warning cause.
    pub cause: String,
}

/// Result of one orchestration invocation.
///
/// # Invariants
/// - Once `status` is [`RunStatus::Aborted`] no further phases execute.
/// - Already-applied resources are left in place; recovery is a separate,
///   explicit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationRun {
    /// Target environment.
    pub environment: EnvironmentId,
    /// Run status.
    pub status: RunStatus,
    /// Phase records in execution order.
    pub phases: Vec<PhaseRecord>,
    /// Phase where a fatal failure stopped the run, if any.
    pub aborted_at: Option<PhaseId>,
    /// One-line abort cause naming the offending action or gate.
    pub abort_cause: Option<String>,
    /// Warnings accumulated from warn-policy phases.
    pub warnings: Vec<RunWarning>,
    /// Run start timestamp.
    pub started_at: Timestamp,
    /// Run completion timestamp.
    pub finished_at: Option<Timestamp>,
}

impl OrchestrationRun {
    /// Returns true when any warn-policy phase recorded a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

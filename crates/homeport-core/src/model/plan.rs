// homeport-core/src/model/plan.rs
// ============================================================================
// Module: Homeport Deployment Plan
// Description: Declared phases, apply actions, and failure policies.
// Purpose: Model the ordered phase sequence executed by the orchestrator.
// Dependencies: serde, thiserror, crate::model
// ============================================================================

//! ## Overview
//! A deployment plan declares the ordered phases of one orchestration run.
//! Each phase lists apply actions followed by readiness gates and carries an
//! explicit failure policy, replacing ad hoc per-step error suppression with
//! one uniform policy evaluated by the orchestrator. Plans are validated
//! fail-closed before any phase executes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::model::condition::ReadinessCondition;
use crate::model::identifiers::NamespaceId;
use crate::model::identifiers::PhaseId;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of phases in one plan.
pub const MAX_PLAN_PHASES: usize = 64;
/// Maximum number of apply actions per phase.
pub const MAX_PHASE_ACTIONS: usize = 64;
/// Maximum number of readiness gates per phase.
pub const MAX_PHASE_GATES: usize = 32;

// ============================================================================
// SECTION: Apply Actions
// ============================================================================

/// Reference to a declarative resource set applied by a phase action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApplyAction {
    /// A single YAML manifest file.
    Manifest {
        /// Path to the manifest file.
        path: String,
    },
    /// A directory of YAML manifest files applied in lexicographic order.
    ManifestDir {
        /// Path to the manifest directory.
        path: String,
    },
    /// A templated chart release rendered for the target environment.
    ChartRelease {
        /// Chart reference.
        chart: String,
        /// Release name.
        release: String,
        /// Namespace receiving the release.
        namespace: NamespaceId,
        /// Optional environment values file path.
        values_path: Option<String>,
    },
}

impl ApplyAction {
    /// Returns a one-line description used in logs and failure causes.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Manifest {
                path,
            } => format!("manifest {path}"),
            Self::ManifestDir {
                path,
            } => format!("manifest dir {path}"),
            Self::ChartRelease {
                chart,
                release,
                namespace,
                ..
            } => format!("chart {chart} release {release} in {namespace}"),
        }
    }
}

// ============================================================================
// SECTION: Failure Policy
// ============================================================================

/// Failure policy applied to a phase by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// A phase failure aborts the entire run.
    Fatal,
    /// A phase failure is recorded and the run continues.
    Warn,
}

// ============================================================================
// SECTION: Phase Specification
// ============================================================================

/// One ordered unit of apply-then-gate work within a deployment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpec {
    /// Unique phase identifier.
    pub phase_id: PhaseId,
    /// Ordered apply actions executed before gating.
    pub actions: Vec<ApplyAction>,
    /// Ordered readiness gates that must hold before the phase completes.
    pub gates: Vec<ReadinessCondition>,
    /// Failure policy evaluated by the orchestrator.
    pub failure_policy: FailurePolicy,
}

// ============================================================================
// SECTION: Deployment Plan
// ============================================================================

/// Ordered deployment plan executed by one orchestration run.
///
/// Phase order encodes the dependency chain: phase N+1 resources are assumed
/// consumable only after phase N readiness gates pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployPlan {
    /// Ordered phase specifications.
    pub phases: Vec<PhaseSpec>,
}

impl DeployPlan {
    /// Validates the plan before execution.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] on the first structural violation; no phase of
    /// an invalid plan ever executes.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.phases.is_empty() {
            return Err(PlanError::MissingPhases);
        }
        if self.phases.len() > MAX_PLAN_PHASES {
            return Err(PlanError::TooManyPhases(self.phases.len()));
        }

        ensure_unique_phase_ids(&self.phases)?;
        for phase in &self.phases {
            validate_phase(phase)?;
        }

        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Deployment plan validation errors.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Plan contains no phases.
    #[error("deployment plan must define at least one phase")]
    MissingPhases,
    /// Plan exceeds the phase count limit.
    #[error("deployment plan has {0} phases (limit {MAX_PLAN_PHASES})")]
    TooManyPhases(usize),
    /// Duplicate phase identifiers detected.
    #[error("duplicate phase identifier: {0}")]
    DuplicatePhaseId(String),
    /// Phase declares neither actions nor gates.
    #[error("phase {0} declares neither actions nor gates")]
    EmptyPhase(String),
    /// Phase exceeds the action count limit.
    #[error("phase {0} has {1} actions (limit {MAX_PHASE_ACTIONS})")]
    TooManyActions(String, usize),
    /// Phase exceeds the gate count limit.
    #[error("phase {0} has {1} gates (limit {MAX_PHASE_GATES})")]
    TooManyGates(String, usize),
    /// Gate declares a zero timeout or poll interval.
    #[error("phase {0} gate {1} declares a zero timeout or poll interval")]
    ZeroWait(String, usize),
    /// Gate poll interval exceeds its timeout.
    #[error("phase {0} gate {1} poll interval exceeds its timeout")]
    PollExceedsTimeout(String, usize),
    /// Gate predicate is not applicable to its target.
    #[error("phase {0} gate {1} pairs a predicate with an unsupported target")]
    MalformedCondition(String, usize),
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures phase identifiers are unique within the plan.
fn ensure_unique_phase_ids(phases: &[PhaseSpec]) -> Result<(), PlanError> {
    for (index, phase) in phases.iter().enumerate() {
        if phases.iter().skip(index + 1).any(|other| other.phase_id == phase.phase_id) {
            return Err(PlanError::DuplicatePhaseId(phase.phase_id.to_string()));
        }
    }
    Ok(())
}

/// Validates a single phase specification.
fn validate_phase(phase: &PhaseSpec) -> Result<(), PlanError> {
    if phase.actions.is_empty() && phase.gates.is_empty() {
        return Err(PlanError::EmptyPhase(phase.phase_id.to_string()));
    }
    if phase.actions.len() > MAX_PHASE_ACTIONS {
        return Err(PlanError::TooManyActions(phase.phase_id.to_string(), phase.actions.len()));
    }
    if phase.gates.len() > MAX_PHASE_GATES {
        return Err(PlanError::TooManyGates(phase.phase_id.to_string(), phase.gates.len()));
    }
    for (index, gate) in phase.gates.iter().enumerate() {
        if gate.timeout_ms == 0 || gate.poll_interval_ms == 0 {
            return Err(PlanError::ZeroWait(phase.phase_id.to_string(), index));
        }
        if gate.poll_interval_ms > gate.timeout_ms {
            return Err(PlanError::PollExceedsTimeout(phase.phase_id.to_string(), index));
        }
        if !gate.is_well_formed() {
            return Err(PlanError::MalformedCondition(phase.phase_id.to_string(), index));
        }
    }
    Ok(())
}

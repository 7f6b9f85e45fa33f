// homeport-core/src/model/mod.rs
// ============================================================================
// Module: Homeport Core Model
// Description: Data model for deployment plans, runs, and validation reports.
// Purpose: Group the serializable core types shared across Homeport crates.
// Dependencies: crate::model submodules
// ============================================================================

//! ## Overview
//! The model module defines the declarative deployment plan, the readiness
//! conditions gating phase progression, the append-only run records produced
//! by one orchestration invocation, and the validation report types. All
//! types serialize with serde for machine consumption.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod condition;
pub mod identifiers;
pub mod plan;
pub mod report;
pub mod resource;
pub mod run;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::ConditionTarget;
pub use condition::LabelSelector;
pub use condition::ReadinessCondition;
pub use condition::ReadyPredicate;
pub use identifiers::CheckId;
pub use identifiers::EnvironmentId;
pub use identifiers::NamespaceId;
pub use identifiers::PhaseId;
pub use plan::ApplyAction;
pub use plan::DeployPlan;
pub use plan::FailurePolicy;
pub use plan::PhaseSpec;
pub use plan::PlanError;
pub use report::CheckOutcome;
pub use report::CheckResult;
pub use report::CheckSeverity;
pub use report::OverallStatus;
pub use report::ValidationReport;
pub use resource::AppliedObject;
pub use resource::ApplyDisposition;
pub use resource::ApplyReport;
pub use resource::ResourceObject;
pub use resource::ResourceSet;
pub use run::ActionOutcome;
pub use run::ActionRecord;
pub use run::GateRecord;
pub use run::GateResult;
pub use run::OrchestrationRun;
pub use run::PhaseRecord;
pub use run::PhaseStatus;
pub use run::RunStatus;
pub use run::RunWarning;
pub use time::Timestamp;

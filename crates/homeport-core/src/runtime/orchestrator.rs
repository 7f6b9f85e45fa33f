// homeport-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Homeport Orchestrator
// Description: Sequential phase execution under explicit failure policies.
// Purpose: Execute deployment plans with readiness gating and fatal/warn policy.
// Dependencies: crate::{model, interfaces, runtime, runlog}
// ============================================================================

//! ## Overview
//! The orchestrator is the single canonical execution path for a deployment
//! run. Phases execute strictly in declared order; a phase never starts
//! before the previous phase reaches a terminal state. Failure policy is
//! evaluated uniformly here: render errors are always fatal, apply errors
//! and gate timeouts are fatal or warnings per the phase policy, and a fatal
//! failure aborts the run with no rollback of already-applied resources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::CancelToken;
use crate::interfaces::Clock;
use crate::interfaces::ClusterApi;
use crate::interfaces::ResourceRenderer;
use crate::model::identifiers::EnvironmentId;
use crate::model::identifiers::PhaseId;
use crate::model::plan::DeployPlan;
use crate::model::plan::FailurePolicy;
use crate::model::plan::PhaseSpec;
use crate::model::plan::PlanError;
use crate::model::run::ActionOutcome;
use crate::model::run::ActionRecord;
use crate::model::run::GateRecord;
use crate::model::run::OrchestrationRun;
use crate::model::run::PhaseRecord;
use crate::model::run::PhaseStatus;
use crate::model::run::RunStatus;
use crate::model::run::RunWarning;
use crate::runlog::RunEvent;
use crate::runlog::RunLogSink;
use crate::runtime::applier::ActionFailure;
use crate::runtime::applier::ResourceApplier;
use crate::runtime::gate::ReadinessGate;

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Orchestrator errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Deployment plan failed validation; nothing executed.
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
}

/// Executes deployment plans against the capability interfaces.
pub struct Orchestrator<R, C, K, L> {
    /// Resource-set renderer.
    renderer: R,
    /// Cluster interface.
    cluster: C,
    /// Clock supplying timestamps, monotonic readings, and sleeps.
    clock: K,
    /// Run log sink receiving progress events.
    log: L,
}

impl<R, C, K, L> Orchestrator<R, C, K, L>
where
    R: ResourceRenderer,
    C: ClusterApi,
    K: Clock,
    L: RunLogSink,
{
    /// Creates an orchestrator over the given collaborators.
    pub const fn new(renderer: R, cluster: C, clock: K, log: L) -> Self {
        Self {
            renderer,
            cluster,
            clock,
            log,
        }
    }

    /// Executes the plan for one environment and returns the run record.
    ///
    /// Failures during execution are encoded in the returned run; only an
    /// invalid plan is reported as an error, and no phase of an invalid plan
    /// ever executes.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::InvalidPlan`] when plan validation fails.
    pub fn run(
        &self,
        plan: &DeployPlan,
        environment: &EnvironmentId,
        cancel: &CancelToken,
    ) -> Result<OrchestrationRun, OrchestratorError> {
        plan.validate()?;

        let mut run = OrchestrationRun {
            environment: environment.clone(),
            status: RunStatus::InProgress,
            phases: Vec::with_capacity(plan.phases.len()),
            aborted_at: None,
            abort_cause: None,
            warnings: Vec::new(),
            started_at: self.clock.now(),
            finished_at: None,
        };
        self.log_event(RunEvent::RunStarted {
            environment: environment.clone(),
            at: run.started_at,
        });

        for phase in &plan.phases {
            if cancel.is_cancelled() {
                self.abort(&mut run, phase.phase_id.clone(), "cancelled before phase start");
                break;
            }

            let execution = self.execute_phase(phase, environment, cancel);
            let failed = execution.record.status == PhaseStatus::Failed;
            run.warnings.extend(execution.warnings);
            run.phases.push(execution.record);

            if failed {
                let cause = execution
                    .fatal_cause
                    .unwrap_or_else(|| "phase failed without recorded cause".to_string());
                self.abort(&mut run, phase.phase_id.clone(), &cause);
                break;
            }
        }

        if run.status != RunStatus::Aborted {
            run.status = RunStatus::Completed;
            self.log_event(RunEvent::RunCompleted {
                status: run.status,
                warnings: run.warnings.len(),
                at: self.clock.now(),
            });
        }
        run.finished_at = Some(self.clock.now());

        Ok(run)
    }

    /// Executes one phase through its apply and gate stages.
    fn execute_phase(
        &self,
        phase: &PhaseSpec,
        environment: &EnvironmentId,
        cancel: &CancelToken,
    ) -> PhaseExecution {
        let applier = ResourceApplier::new(&self.renderer, &self.cluster);
        let gate = ReadinessGate::new(&self.cluster, &self.clock);
        let started_at = self.clock.now();
        self.log_event(RunEvent::PhaseStarted {
            phase_id: phase.phase_id.clone(),
            at: started_at,
        });

        let mut execution = PhaseExecution {
            record: PhaseRecord {
                phase_id: phase.phase_id.clone(),
                status: PhaseStatus::Applying,
                actions: Vec::with_capacity(phase.actions.len()),
                gates: Vec::with_capacity(phase.gates.len()),
                started_at,
                finished_at: None,
            },
            warnings: Vec::new(),
            fatal_cause: None,
        };

        self.apply_actions(phase, environment, cancel, &applier, &mut execution);

        // Warn-policy action errors still proceed to gating: gates for
        // unaffected resources are not skipped because one action warned.
        if execution.fatal_cause.is_none() {
            execution.record.status = PhaseStatus::Gating;
            self.evaluate_gates(phase, cancel, &gate, &mut execution);
        }

        execution.record.status = if execution.fatal_cause.is_some() {
            PhaseStatus::Failed
        } else if execution.warnings.is_empty() {
            PhaseStatus::Succeeded
        } else {
            PhaseStatus::CompletedWithWarnings
        };
        execution.record.finished_at = Some(self.clock.now());
        self.log_event(RunEvent::PhaseCompleted {
            phase_id: phase.phase_id.clone(),
            status: execution.record.status,
            at: self.clock.now(),
        });

        execution
    }

    /// Executes the phase actions in declared order.
    fn apply_actions(
        &self,
        phase: &PhaseSpec,
        environment: &EnvironmentId,
        cancel: &CancelToken,
        applier: &ResourceApplier<'_, R, C>,
        execution: &mut PhaseExecution,
    ) {
        for action in &phase.actions {
            if execution.fatal_cause.is_some() || cancel.is_cancelled() {
                if execution.fatal_cause.is_none() {
                    execution.fatal_cause = Some("cancelled during apply".to_string());
                }
                execution.record.actions.push(ActionRecord {
                    action: action.clone(),
                    outcome: ActionOutcome::Skipped,
                });
                continue;
            }

            match applier.apply_action(action, environment) {
                Ok(report) => {
                    self.log_event(RunEvent::ActionApplied {
                        phase_id: phase.phase_id.clone(),
                        action: action.describe(),
                        applied: report.applied(),
                        unchanged: report.unchanged(),
                        at: self.clock.now(),
                    });
                    execution.record.actions.push(ActionRecord {
                        action: action.clone(),
                        outcome: ActionOutcome::Applied {
                            report,
                        },
                    });
                }
                Err(ActionFailure::Render(err)) => {
                    let cause = format!("action {}: {err}", action.describe());
                    self.log_event(RunEvent::ActionFailed {
                        phase_id: phase.phase_id.clone(),
                        action: action.describe(),
                        cause: cause.clone(),
                        at: self.clock.now(),
                    });
                    execution.record.actions.push(ActionRecord {
                        action: action.clone(),
                        outcome: ActionOutcome::RenderFailed {
                            reason: err.to_string(),
                        },
                    });
                    // Nothing was submitted; fatal regardless of policy.
                    execution.fatal_cause = Some(cause);
                }
                Err(ActionFailure::Apply(err)) => {
                    let cause = format!("action {}: {err}", action.describe());
                    self.log_event(RunEvent::ActionFailed {
                        phase_id: phase.phase_id.clone(),
                        action: action.describe(),
                        cause: cause.clone(),
                        at: self.clock.now(),
                    });
                    execution.record.actions.push(ActionRecord {
                        action: action.clone(),
                        outcome: ActionOutcome::ApplyFailed {
                            reason: err.to_string(),
                        },
                    });
                    match phase.failure_policy {
                        FailurePolicy::Fatal => {
                            execution.fatal_cause = Some(cause);
                        }
                        FailurePolicy::Warn => {
                            execution.warnings.push(RunWarning {
                                phase_id: phase.phase_id.clone(),
                                cause,
                            });
                        }
                    }
                }
            }
        }
    }

    /// Evaluates the phase gates in declared order.
    fn evaluate_gates(
        &self,
        phase: &PhaseSpec,
        cancel: &CancelToken,
        gate: &ReadinessGate<'_, C, K>,
        execution: &mut PhaseExecution,
    ) {
        for condition in &phase.gates {
            if execution.fatal_cause.is_some() {
                break;
            }

            let result = gate.wait(condition, cancel);
            let describe = condition.describe();

            if result.satisfied {
                self.log_event(RunEvent::GateSatisfied {
                    phase_id: phase.phase_id.clone(),
                    gate: describe,
                    elapsed_ms: result.elapsed_ms,
                    at: self.clock.now(),
                });
            } else if result.cancelled {
                execution.fatal_cause =
                    Some(format!("cancelled while waiting for gate {describe}"));
            } else {
                let cause = format!(
                    "gate {describe} timed out after {}ms (last observation: {})",
                    result.elapsed_ms, result.last_observation
                );
                self.log_event(RunEvent::GateTimedOut {
                    phase_id: phase.phase_id.clone(),
                    gate: describe,
                    last_observation: result.last_observation.clone(),
                    at: self.clock.now(),
                });
                match phase.failure_policy {
                    FailurePolicy::Fatal => {
                        execution.fatal_cause = Some(cause);
                    }
                    FailurePolicy::Warn => {
                        execution.warnings.push(RunWarning {
                            phase_id: phase.phase_id.clone(),
                            cause,
                        });
                    }
                }
            }

            execution.record.gates.push(GateRecord {
                condition: condition.clone(),
                result,
            });
        }
    }

    /// Marks the run aborted at the given phase.
    fn abort(&self, run: &mut OrchestrationRun, phase_id: PhaseId, cause: &str) {
        run.status = RunStatus::Aborted;
        run.aborted_at = Some(phase_id.clone());
        run.abort_cause = Some(cause.to_string());
        self.log_event(RunEvent::RunAborted {
            phase_id,
            cause: cause.to_string(),
            at: self.clock.now(),
        });
    }

    /// Records a run log event; logging is best-effort and never interrupts
    /// the run.
    fn log_event(&self, event: RunEvent) {
        if self.log.record(&event).is_err() {
            // Degraded logging is preferable to failing a deployment.
        }
    }
}

// ============================================================================
// SECTION: Phase Execution
// ============================================================================

/// Working state for one phase execution.
struct PhaseExecution {
    /// Phase record under construction.
    record: PhaseRecord,
    /// Warnings accumulated under the warn policy.
    warnings: Vec<RunWarning>,
    /// Fatal cause terminating the phase, if any.
    fatal_cause: Option<String>,
}

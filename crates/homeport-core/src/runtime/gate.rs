// homeport-core/src/runtime/gate.rs
// ============================================================================
// Module: Homeport Readiness Gate
// Description: Polling wait loop for readiness conditions.
// Purpose: Block phase progression until a condition holds or times out.
// Dependencies: crate::{model, interfaces}
// ============================================================================

//! ## Overview
//! The readiness gate is a wait-for-convergence primitive: it observes a
//! condition at a fixed poll interval, succeeds on the first satisfying
//! observation, and fails only once the timeout elapses. Transient
//! observation errors count as "not yet satisfied" rather than failing the
//! gate outright. Polling is the only intentional blocking point in the
//! runtime, and every wait has a terminal timeout outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::interfaces::CancelToken;
use crate::interfaces::Clock;
use crate::interfaces::ClusterApi;
use crate::interfaces::ClusterError;
use crate::interfaces::ObjectState;
use crate::model::condition::ConditionTarget;
use crate::model::condition::ReadinessCondition;
use crate::model::condition::ReadyPredicate;
use crate::model::run::GateResult;

// ============================================================================
// SECTION: Readiness Gate
// ============================================================================

/// Polls readiness conditions against the cluster interface.
pub struct ReadinessGate<'a, C, K> {
    /// Cluster interface used for observations.
    cluster: &'a C,
    /// Clock supplying monotonic readings and sleeps.
    clock: &'a K,
}

impl<'a, C, K> ReadinessGate<'a, C, K>
where
    C: ClusterApi,
    K: Clock,
{
    /// Creates a gate over the given cluster and clock.
    #[must_use]
    pub const fn new(cluster: &'a C, clock: &'a K) -> Self {
        Self {
            cluster,
            clock,
        }
    }

    /// Waits for the condition to hold, the timeout to elapse, or
    /// cancellation.
    ///
    /// The wait returns satisfied on the first satisfying observation. On a
    /// condition that never holds, the unsatisfied result lands within one
    /// poll interval past the timeout, never earlier. Cancellation is polled
    /// before each observation and stops the wait promptly with the gate
    /// marked incomplete.
    #[must_use]
    pub fn wait(&self, condition: &ReadinessCondition, cancel: &CancelToken) -> GateResult {
        let start = self.clock.monotonic();
        let timeout = condition.timeout();
        let poll_interval = condition.poll_interval();
        let mut last_observation = "no observation yet".to_string();

        loop {
            let elapsed = self.clock.monotonic().saturating_sub(start);
            if cancel.is_cancelled() {
                return GateResult {
                    satisfied: false,
                    cancelled: true,
                    elapsed_ms: duration_millis(elapsed),
                    last_observation,
                };
            }

            match observe(self.cluster, condition) {
                Ok(observation) => {
                    if observation.satisfied {
                        return GateResult {
                            satisfied: true,
                            cancelled: false,
                            elapsed_ms: duration_millis(elapsed),
                            last_observation: observation.summary,
                        };
                    }
                    last_observation = observation.summary;
                }
                // Observation races the apply it waits on; only a timeout
                // fails the gate.
                Err(err) => {
                    last_observation = format!("observation error: {err}");
                }
            }

            let elapsed = self.clock.monotonic().saturating_sub(start);
            if elapsed >= timeout {
                return GateResult {
                    satisfied: false,
                    cancelled: false,
                    elapsed_ms: duration_millis(elapsed),
                    last_observation,
                };
            }

            self.clock.sleep(poll_interval);
        }
    }
}

// ============================================================================
// SECTION: Observations
// ============================================================================

/// Result of one condition observation.
struct Observation {
    /// Whether the predicate held.
    satisfied: bool,
    /// One-line observation summary.
    summary: String,
}

/// Evaluates one observation of the condition. Never mutates cluster state.
fn observe<C: ClusterApi>(
    cluster: &C,
    condition: &ReadinessCondition,
) -> Result<Observation, ClusterError> {
    match (&condition.target, &condition.predicate) {
        (
            ConditionTarget::Selector {
                namespace,
                selector,
            },
            ReadyPredicate::AllReady,
        ) => {
            let objects = cluster.list_by_selector(namespace, selector)?;
            Ok(observe_all_ready(&objects))
        }
        (
            ConditionTarget::Selector {
                namespace,
                selector,
            },
            ReadyPredicate::MinimumCount {
                minimum,
            },
        ) => {
            let objects = cluster.list_by_selector(namespace, selector)?;
            let count = objects.len();
            Ok(Observation {
                satisfied: count >= *minimum,
                summary: format!("{count} of {minimum} required objects present"),
            })
        }
        (
            ConditionTarget::Namespace {
                namespace,
            },
            ReadyPredicate::Exists,
        ) => {
            let exists = cluster.namespace_exists(namespace)?;
            Ok(Observation {
                satisfied: exists,
                summary: if exists {
                    format!("namespace {namespace} exists")
                } else {
                    format!("namespace {namespace} absent")
                },
            })
        }
        (
            ConditionTarget::Object {
                namespace,
                kind,
                name,
            },
            ReadyPredicate::Exists,
        ) => {
            let state = cluster.get_object(kind, namespace.as_ref(), name)?;
            let exists = state.is_some();
            Ok(Observation {
                satisfied: exists,
                summary: if exists {
                    format!("{kind}/{name} exists")
                } else {
                    format!("{kind}/{name} absent")
                },
            })
        }
        // Rejected by plan validation; observed as never satisfied if
        // reached through an unvalidated condition.
        _ => Ok(Observation {
            satisfied: false,
            summary: "predicate not applicable to target".to_string(),
        }),
    }
}

/// Evaluates the all-ready predicate over a listing.
fn observe_all_ready(objects: &[ObjectState]) -> Observation {
    if objects.is_empty() {
        return Observation {
            satisfied: false,
            summary: "no matching objects".to_string(),
        };
    }
    let not_ready: Vec<String> = objects
        .iter()
        .filter(|object| !object.ready)
        .map(|object| format!("{}/{}", object.kind, object.name))
        .collect();
    if not_ready.is_empty() {
        Observation {
            satisfied: true,
            summary: format!("all {} matching objects ready", objects.len()),
        }
    } else {
        Observation {
            satisfied: false,
            summary: format!("not ready: {}", not_ready.join(", ")),
        }
    }
}

/// Converts a duration to whole milliseconds, saturating on overflow.
fn duration_millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

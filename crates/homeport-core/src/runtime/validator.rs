// homeport-core/src/runtime/validator.rs
// ============================================================================
// Module: Homeport Validator
// Description: Registered check execution and report aggregation.
// Purpose: Run independent health checks concurrently into one report.
// Dependencies: crate::{model, interfaces}
// ============================================================================

//! ## Overview
//! The validator runs a registered collection of check runners and aggregates
//! their immutable results into one validation report. Checks are read-only
//! and mutually independent, so they execute on a bounded worker pool; the
//! bound exists to avoid overwhelming the cluster API, not for correctness.
//! A single check failure never aborts the pass: the full set always
//! completes and the report enumerates every failure by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use crate::interfaces::Clock;
use crate::model::identifiers::CheckId;
use crate::model::report::CheckOutcome;
use crate::model::report::CheckResult;
use crate::model::report::CheckSeverity;
use crate::model::report::ValidationReport;

// ============================================================================
// SECTION: Check Runner
// ============================================================================

/// One independent, read-only health evaluation.
///
/// Runners never mutate cluster state and never depend on another runner's
/// result, so the validator may execute them concurrently.
pub trait CheckRunner: Send + Sync {
    /// Returns the check identifier.
    fn check_id(&self) -> CheckId;

    /// Returns the check severity.
    fn severity(&self) -> CheckSeverity;

    /// Executes the check and returns its immutable result.
    fn run(&self, clock: &dyn Clock) -> CheckResult;
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Default worker-pool bound for check execution.
pub const DEFAULT_CHECK_WORKERS: usize = 4;

/// Runs registered checks and aggregates their results.
pub struct Validator {
    /// Registered checks in registration order.
    checks: Vec<Box<dyn CheckRunner>>,
    /// Upper bound on concurrently executing checks.
    workers: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_WORKERS)
    }
}

impl Validator {
    /// Creates a validator with the given worker bound (minimum one).
    #[must_use]
    pub fn new(workers: usize) -> Self {
        Self {
            checks: Vec::new(),
            workers: workers.max(1),
        }
    }

    /// Registers a check; report order follows registration order.
    pub fn register(&mut self, check: Box<dyn CheckRunner>) {
        self.checks.push(check);
    }

    /// Returns the number of registered checks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true when no checks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs every registered check and returns the aggregated report.
    ///
    /// Results are assembled in registration order regardless of completion
    /// order. The full check set always completes; no single failure stops
    /// the pass.
    #[must_use]
    pub fn validate(&self, clock: &dyn Clock) -> ValidationReport {
        let total = self.checks.len();
        let slots: Vec<Mutex<Option<CheckResult>>> =
            (0..total).map(|_| Mutex::new(None)).collect();
        let next = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..self.workers.min(total) {
                scope.spawn(|| {
                    loop {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        if index >= total {
                            break;
                        }
                        let result = self.checks[index].run(clock);
                        if let Ok(mut slot) = slots[index].lock() {
                            *slot = Some(result);
                        }
                    }
                });
            }
        });

        let results = self
            .checks
            .iter()
            .zip(slots)
            .map(|(check, slot)| collect_result(check.as_ref(), slot, clock))
            .collect();

        ValidationReport {
            results,
            generated_at: clock.now(),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a slot result, synthesizing a failure when the check never
/// reported.
fn collect_result(
    check: &dyn CheckRunner,
    slot: Mutex<Option<CheckResult>>,
    clock: &dyn Clock,
) -> CheckResult {
    let reported = slot.into_inner().ok().flatten();
    reported.map_or_else(
        || CheckResult {
            check_name: check.check_id(),
            severity: check.severity(),
            outcome: CheckOutcome::Fail,
            message: "check did not report a result".to_string(),
            observed_at: clock.now(),
        },
        |result| result,
    )
}

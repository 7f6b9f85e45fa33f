// homeport-core/tests/validator.rs
// ============================================================================
// Module: Validator Tests
// Description: Tests for check execution, ordering, and report aggregation.
// ============================================================================
//! ## Overview
//! Validates registration-ordered report assembly under concurrency and the
//! critical-failure aggregation rule.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

mod common;

use common::FakeClock;
use homeport_core::CheckId;
use homeport_core::CheckOutcome;
use homeport_core::CheckResult;
use homeport_core::CheckRunner;
use homeport_core::CheckSeverity;
use homeport_core::Clock;
use homeport_core::OverallStatus;
use homeport_core::Validator;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Check runner returning a fixed outcome.
struct StaticCheck {
    /// Check identifier.
    id: CheckId,
    /// Check severity.
    severity: CheckSeverity,
    /// Fixed outcome.
    outcome: CheckOutcome,
}

impl StaticCheck {
    /// Creates a boxed static check.
    fn boxed(id: &str, severity: CheckSeverity, outcome: CheckOutcome) -> Box<Self> {
        Box::new(Self {
            id: id.into(),
            severity,
            outcome,
        })
    }
}

impl CheckRunner for StaticCheck {
    fn check_id(&self) -> CheckId {
        self.id.clone()
    }

    fn severity(&self) -> CheckSeverity {
        self.severity
    }

    fn run(&self, clock: &dyn Clock) -> CheckResult {
        CheckResult {
            check_name: self.id.clone(),
            severity: self.severity,
            outcome: self.outcome,
            message: "static outcome".to_string(),
            observed_at: clock.now(),
        }
    }
}

// ============================================================================
// SECTION: Aggregation
// ============================================================================

#[test]
fn test_critical_failure_renders_the_estate_unhealthy() {
    let mut validator = Validator::new(2);
    validator.register(StaticCheck::boxed(
        "namespace-foo",
        CheckSeverity::Critical,
        CheckOutcome::Fail,
    ));
    validator.register(StaticCheck::boxed(
        "ingress-reachable",
        CheckSeverity::Warn,
        CheckOutcome::Fail,
    ));
    let clock = FakeClock::new();

    let report = validator.validate(&clock);

    assert_eq!(report.overall_status(), OverallStatus::Unhealthy);
    assert_eq!(report.fail_count(), 2);
    assert_eq!(report.pass_count(), 0);
    assert_eq!(report.warn_count(), 1);
}

#[test]
fn test_advisory_failures_never_flip_overall_status() {
    let mut validator = Validator::new(2);
    validator.register(StaticCheck::boxed("pods", CheckSeverity::Critical, CheckOutcome::Pass));
    validator.register(StaticCheck::boxed("dns", CheckSeverity::Warn, CheckOutcome::Fail));
    validator.register(StaticCheck::boxed("notes", CheckSeverity::Info, CheckOutcome::Fail));
    let clock = FakeClock::new();

    let report = validator.validate(&clock);

    assert_eq!(report.overall_status(), OverallStatus::Healthy);
    assert_eq!(report.fail_count(), 2);
    assert_eq!(report.warn_count(), 1);
}

#[test]
fn test_every_check_completes_despite_failures() {
    let mut validator = Validator::new(1);
    for index in 0..6 {
        validator.register(StaticCheck::boxed(
            &format!("check-{index}"),
            CheckSeverity::Critical,
            CheckOutcome::Fail,
        ));
    }
    let clock = FakeClock::new();

    let report = validator.validate(&clock);
    assert_eq!(report.results.len(), 6);
    assert_eq!(report.failures().len(), 6);
}

// ============================================================================
// SECTION: Ordering
// ============================================================================

#[test]
fn test_report_order_follows_registration_order_under_concurrency() {
    let mut validator = Validator::new(4);
    let names: Vec<String> = (0..12).map(|index| format!("check-{index:02}")).collect();
    for name in &names {
        validator.register(StaticCheck::boxed(name, CheckSeverity::Info, CheckOutcome::Pass));
    }
    let clock = FakeClock::new();

    let report = validator.validate(&clock);

    let reported: Vec<String> =
        report.results.iter().map(|result| result.check_name.to_string()).collect();
    assert_eq!(reported, names);
}

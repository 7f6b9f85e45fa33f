// homeport-checks/tests/phase_count.rs
// ============================================================================
// Module: Phase and Count Check Tests
// Description: Tests for phase matching and count threshold grading.
// ============================================================================
//! ## Overview
//! Validates mismatch enumeration for phase checks and the severity ladder
//! for count thresholds.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

mod common;

use std::sync::Arc;

use common::FakeClock;
use common::seed_labeled;
use homeport_checks::CountThresholdCheck;
use homeport_checks::PhaseMatchCheck;
use homeport_core::CheckOutcome;
use homeport_core::CheckRunner;
use homeport_core::CheckSeverity;
use homeport_core::InMemoryCluster;
use homeport_core::LabelSelector;

// ============================================================================
// SECTION: Phase Matching
// ============================================================================

#[test]
fn test_all_running_passes() {
    let cluster = InMemoryCluster::new();
    seed_labeled(&cluster, "Pod", "web-0", "apps", ("app", "web"), "Running", true);
    seed_labeled(&cluster, "Pod", "web-1", "apps", ("app", "web"), "Running", true);
    let check = PhaseMatchCheck::new(
        "pods-running".into(),
        CheckSeverity::Critical,
        Arc::new(cluster),
        "apps".into(),
        LabelSelector::single("app", "web"),
        "Running",
    );

    let result = check.run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Pass);
}

#[test]
fn test_mismatched_objects_are_enumerated() {
    let cluster = InMemoryCluster::new();
    seed_labeled(&cluster, "Pod", "web-0", "apps", ("app", "web"), "Running", true);
    seed_labeled(&cluster, "Pod", "web-1", "apps", ("app", "web"), "CrashLoopBackOff", false);
    let check = PhaseMatchCheck::new(
        "pods-running".into(),
        CheckSeverity::Critical,
        Arc::new(cluster),
        "apps".into(),
        LabelSelector::single("app", "web"),
        "Running",
    );

    let result = check.run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Fail);
    assert!(result.message.contains("Pod/web-1"));
    assert!(result.message.contains("CrashLoopBackOff"));
    assert!(!result.message.contains("Pod/web-0"));
}

#[test]
fn test_empty_selection_fails() {
    let check = PhaseMatchCheck::new(
        "pods-running".into(),
        CheckSeverity::Critical,
        Arc::new(InMemoryCluster::new()),
        "apps".into(),
        LabelSelector::single("app", "web"),
        "Running",
    );

    let result = check.run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Fail);
    assert!(result.message.contains("no objects match"));
}

// ============================================================================
// SECTION: Count Thresholds
// ============================================================================

/// Seeds `count` secrets labeled `managed=homeport` into the cluster.
fn seed_secrets(cluster: &InMemoryCluster, count: usize) {
    for index in 0..count {
        seed_labeled(
            cluster,
            "Secret",
            &format!("secret-{index}"),
            "platform",
            ("managed", "homeport"),
            "Active",
            true,
        );
    }
}

/// Builds the count check expecting five managed secrets.
fn secrets_check(cluster: InMemoryCluster) -> CountThresholdCheck {
    CountThresholdCheck::new(
        "managed-secrets".into(),
        Arc::new(cluster),
        "platform".into(),
        LabelSelector::single("managed", "homeport"),
        5,
    )
}

#[test]
fn test_count_at_minimum_passes() {
    let cluster = InMemoryCluster::new();
    seed_secrets(&cluster, 5);
    let result = secrets_check(cluster).run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Pass);
}

#[test]
fn test_partial_shortfall_is_advisory() {
    let cluster = InMemoryCluster::new();
    seed_secrets(&cluster, 3);
    let result = secrets_check(cluster).run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Fail);
    assert_eq!(result.severity, CheckSeverity::Warn);
    assert!(result.message.contains("3 of 5"));
}

#[test]
fn test_zero_matches_is_critical() {
    let result = secrets_check(InMemoryCluster::new()).run(&FakeClock::new());
    assert_eq!(result.outcome, CheckOutcome::Fail);
    assert_eq!(result.severity, CheckSeverity::Critical);
}

// homeport-core/tests/gate_wait.rs
// ============================================================================
// Module: Readiness Gate Tests
// Description: Tests for polling waits, timeouts, and transient tolerance.
// ============================================================================
//! ## Overview
//! Validates deterministic gate timing with a fake clock: first-observation
//! success, timeout bounds, transient observation tolerance, and prompt
//! cancellation.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

mod common;

use common::FakeClock;
use common::labeled_object;
use homeport_core::CancelToken;
use homeport_core::ConditionTarget;
use homeport_core::InMemoryCluster;
use homeport_core::LabelSelector;
use homeport_core::ObjectState;
use homeport_core::ReadinessCondition;
use homeport_core::ReadinessGate;
use homeport_core::ReadyPredicate;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Condition waiting for all `app=web` pods in `apps` to be ready.
fn pods_ready_condition(timeout_ms: u64, poll_interval_ms: u64) -> ReadinessCondition {
    ReadinessCondition {
        target: ConditionTarget::Selector {
            namespace: "apps".into(),
            selector: LabelSelector::single("app", "web"),
        },
        predicate: ReadyPredicate::AllReady,
        timeout_ms,
        poll_interval_ms,
    }
}

// ============================================================================
// SECTION: Satisfaction
// ============================================================================

#[test]
fn test_satisfied_on_first_observation() {
    let cluster = InMemoryCluster::new();
    cluster
        .seed_object(
            ObjectState {
                kind: "Pod".to_string(),
                name: "web-0".to_string(),
                namespace: Some("apps".into()),
                phase: Some("Running".to_string()),
                ready: true,
                labels: [("app".to_string(), "web".to_string())].into_iter().collect(),
            },
            serde_json::json!({}),
        )
        .unwrap();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let result = gate.wait(&pods_ready_condition(5_000, 1_000), &CancelToken::new());
    assert!(result.satisfied);
    assert_eq!(result.elapsed_ms, 0);
}

#[test]
fn test_satisfied_after_readiness_flips() {
    let cluster = InMemoryCluster::new();
    let object = labeled_object("Pod", "web-0", "apps", ("app", "web"));
    cluster.apply_object(&object).unwrap();
    cluster.set_ready_after("Pod", Some(&"apps".into()), "web-0", 3).unwrap();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let result = gate.wait(&pods_ready_condition(10_000, 1_000), &CancelToken::new());
    assert!(result.satisfied);
    assert_eq!(result.elapsed_ms, 2_000);
}

// ============================================================================
// SECTION: Timeout Determinism
// ============================================================================

#[test]
fn test_never_satisfied_times_out_within_one_poll_interval() {
    let cluster = InMemoryCluster::new();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let condition = pods_ready_condition(5_000, 1_500);
    let result = gate.wait(&condition, &CancelToken::new());

    assert!(!result.satisfied);
    assert!(!result.cancelled);
    assert!(result.elapsed_ms >= condition.timeout_ms);
    assert!(result.elapsed_ms < condition.timeout_ms + condition.poll_interval_ms);
    assert_eq!(result.last_observation, "no matching objects");
}

#[test]
fn test_unready_objects_enumerated_in_last_observation() {
    let cluster = InMemoryCluster::new();
    let mut object = labeled_object("Pod", "web-0", "apps", ("app", "web"));
    object.manifest = serde_json::json!({ "spec": "pending" });
    cluster.apply_object(&object).unwrap();
    cluster.set_ready_after("Pod", Some(&"apps".into()), "web-0", u32::MAX).unwrap();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let result = gate.wait(&pods_ready_condition(2_000, 1_000), &CancelToken::new());
    assert!(!result.satisfied);
    assert!(result.last_observation.contains("Pod/web-0"));
}

// ============================================================================
// SECTION: Transient Tolerance
// ============================================================================

#[test]
fn test_transient_observation_errors_do_not_fail_the_gate() {
    let cluster = InMemoryCluster::new();
    let object = labeled_object("Pod", "web-0", "apps", ("app", "web"));
    cluster.apply_object(&object).unwrap();
    cluster.script_transient_errors(2).unwrap();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let result = gate.wait(&pods_ready_condition(10_000, 1_000), &CancelToken::new());
    assert!(result.satisfied);
    assert_eq!(result.elapsed_ms, 2_000);
}

#[test]
fn test_persistent_transient_errors_surface_in_timeout_observation() {
    let cluster = InMemoryCluster::new();
    cluster.script_transient_errors(u32::MAX).unwrap();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);

    let result = gate.wait(&pods_ready_condition(3_000, 1_000), &CancelToken::new());
    assert!(!result.satisfied);
    assert!(result.last_observation.contains("observation error"));
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

#[test]
fn test_cancelled_wait_stops_promptly() {
    let cluster = InMemoryCluster::new();
    let clock = FakeClock::new();
    let gate = ReadinessGate::new(&cluster, &clock);
    let cancel = CancelToken::new();
    cancel.cancel();

    let result = gate.wait(&pods_ready_condition(60_000, 1_000), &cancel);
    assert!(!result.satisfied);
    assert!(result.cancelled);
    assert_eq!(result.elapsed_ms, 0);
}

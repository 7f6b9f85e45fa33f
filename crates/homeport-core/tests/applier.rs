// homeport-core/tests/applier.rs
// ============================================================================
// Module: Resource Applier Tests
// Description: Tests for idempotent apply execution and failure taxonomy.
// ============================================================================
//! ## Overview
//! Validates idempotent apply semantics and the render/apply failure split.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

mod common;

use common::StaticRenderer;
use common::labeled_object;
use common::namespace_object;
use homeport_core::ActionFailure;
use homeport_core::ApplyAction;
use homeport_core::EnvironmentId;
use homeport_core::InMemoryCluster;
use homeport_core::ResourceApplier;
use homeport_core::ResourceSet;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a two-object resource set for the platform namespace.
fn platform_set() -> ResourceSet {
    ResourceSet::new(vec![
        namespace_object("platform"),
        labeled_object("Deployment", "gateway", "platform", ("app", "gateway")),
    ])
}

/// The manifest action used across these tests.
fn platform_action() -> ApplyAction {
    ApplyAction::Manifest {
        path: "platform.yaml".to_string(),
    }
}

// ============================================================================
// SECTION: Idempotence
// ============================================================================

#[test]
fn test_first_apply_creates_all_objects() {
    let renderer = StaticRenderer::new().with_set("platform.yaml", platform_set());
    let cluster = InMemoryCluster::new();
    let applier = ResourceApplier::new(&renderer, &cluster);

    let report = applier.apply_action(&platform_action(), &EnvironmentId::new("prod")).unwrap();
    assert_eq!(report.applied(), 2);
    assert_eq!(report.unchanged(), 0);
}

#[test]
fn test_reapplying_unchanged_set_reports_all_unchanged() {
    let renderer = StaticRenderer::new().with_set("platform.yaml", platform_set());
    let cluster = InMemoryCluster::new();
    let applier = ResourceApplier::new(&renderer, &cluster);
    let environment = EnvironmentId::new("prod");

    applier.apply_action(&platform_action(), &environment).unwrap();
    let objects_after_first = cluster.object_count().unwrap();
    let report = applier.apply_action(&platform_action(), &environment).unwrap();

    assert_eq!(report.applied(), 0);
    assert_eq!(report.unchanged(), 2);
    assert_eq!(cluster.object_count().unwrap(), objects_after_first);
}

// ============================================================================
// SECTION: Failure Taxonomy
// ============================================================================

#[test]
fn test_missing_source_is_a_render_failure() {
    let renderer = StaticRenderer::new();
    let cluster = InMemoryCluster::new();
    let applier = ResourceApplier::new(&renderer, &cluster);

    let result = applier.apply_action(&platform_action(), &EnvironmentId::new("prod"));
    assert!(matches!(result, Err(ActionFailure::Render(_))));
}

#[test]
fn test_cluster_rejection_is_an_apply_failure() {
    let renderer = StaticRenderer::new().with_set("platform.yaml", platform_set());
    let cluster = InMemoryCluster::new();
    cluster.reject_kind("Deployment").unwrap();
    let applier = ResourceApplier::new(&renderer, &cluster);

    let result = applier.apply_action(&platform_action(), &EnvironmentId::new("prod"));
    assert!(matches!(result, Err(ActionFailure::Apply(_))));
}

// homeport-cluster/tests/kubectl_adapter.rs
// ============================================================================
// Module: Kubectl Adapter Tests
// Description: Tests for the subprocess adapter against a stub binary.
// ============================================================================
//! ## Overview
//! Drives the kubectl adapter against a stub shell script that replays
//! canned responses, covering existence reads, not-found mapping, and apply
//! disposition parsing end to end.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]
#![cfg(unix)]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use homeport_cluster::KubectlCluster;
use homeport_cluster::KubectlConfig;
use homeport_core::ApplyDisposition;
use homeport_core::ClusterApi;
use homeport_core::ResourceObject;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Stub Binary
// ============================================================================

/// Stub kubectl replaying canned responses by argument shape.
const STUB: &str = r#"#!/bin/sh
case "$*" in
  *"get namespace platform"*)
    echo '{"kind":"Namespace","metadata":{"name":"platform"},"status":{"phase":"Active"}}'
    ;;
  *"get namespace missing"*)
    echo 'Error from server (NotFound): namespaces "missing" not found' >&2
    exit 1
    ;;
  *"apply"*)
    cat > /dev/null
    echo 'namespace/platform created'
    ;;
  *)
    echo 'unexpected invocation' >&2
    exit 2
    ;;
esac
"#;

/// Writes the stub script and returns an adapter pointing at it.
fn stub_cluster(dir: &Path) -> KubectlCluster {
    let path = dir.join("kubectl-stub");
    fs::write(&path, STUB).expect("write stub");
    let mut permissions = fs::metadata(&path).expect("stub metadata").permissions();
    permissions.set_mode(0o755);
    fs::set_permissions(&path, permissions).expect("set stub permissions");
    KubectlCluster::new(KubectlConfig {
        binary: path.display().to_string(),
        context: None,
    })
}

// ============================================================================
// SECTION: Adapter Behavior
// ============================================================================

#[test]
fn test_namespace_existence_round_trip() {
    let dir = TempDir::new().unwrap();
    let cluster = stub_cluster(dir.path());

    assert!(cluster.namespace_exists(&"platform".into()).unwrap());
    assert!(!cluster.namespace_exists(&"missing".into()).unwrap());
}

#[test]
fn test_apply_maps_the_disposition_token() {
    let dir = TempDir::new().unwrap();
    let cluster = stub_cluster(dir.path());
    let object = ResourceObject {
        kind: "Namespace".to_string(),
        name: "platform".to_string(),
        namespace: None,
        labels: BTreeMap::new(),
        manifest: json!({ "kind": "Namespace", "metadata": { "name": "platform" } }),
        source_text: String::new(),
    };

    let disposition = cluster.apply_object(&object).unwrap();
    assert_eq!(disposition, ApplyDisposition::Created);
}

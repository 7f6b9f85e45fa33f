// homeport-cluster/tests/render.rs
// ============================================================================
// Module: File Renderer Tests
// Description: Tests for manifest parsing and environment overlay resolution.
// ============================================================================
//! ## Overview
//! Validates multi-document parsing, overlay file replacement, and
//! fail-closed behavior on missing or malformed sources.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

use std::fs;

use homeport_cluster::FileRenderer;
use homeport_core::ApplyAction;
use homeport_core::EnvironmentId;
use homeport_core::RenderError;
use homeport_core::ResourceRenderer;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// A two-document manifest stream.
const MULTI_DOC: &str = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: platform\n---\napiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: gateway\n  namespace: platform\n  labels:\n    app: gateway\n";

/// Writes a manifest file under the temp base directory.
fn write_manifest(base: &TempDir, relative: &str, content: &str) {
    let path = base.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write manifest");
}

// ============================================================================
// SECTION: Manifest Files
// ============================================================================

#[test]
fn test_multi_document_manifest_parses_in_order() {
    let base = TempDir::new().unwrap();
    write_manifest(&base, "platform.yaml", MULTI_DOC);
    let renderer = FileRenderer::new(base.path());

    let set = renderer
        .render(
            &ApplyAction::Manifest {
                path: "platform.yaml".to_string(),
            },
            &EnvironmentId::new("prod"),
        )
        .unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(set.objects[0].kind, "Namespace");
    assert_eq!(set.objects[1].kind, "Deployment");
    assert_eq!(set.objects[1].namespace, Some("platform".into()));
    assert_eq!(set.objects[1].labels.get("app"), Some(&"gateway".to_string()));
    assert!(set.objects[1].source_text.contains("kind: Deployment"));
}

#[test]
fn test_missing_manifest_is_a_source_error() {
    let base = TempDir::new().unwrap();
    let renderer = FileRenderer::new(base.path());

    let result = renderer.render(
        &ApplyAction::Manifest {
            path: "absent.yaml".to_string(),
        },
        &EnvironmentId::new("prod"),
    );
    assert!(matches!(result, Err(RenderError::SourceMissing(_))));
}

#[test]
fn test_document_without_kind_fails_closed() {
    let base = TempDir::new().unwrap();
    write_manifest(&base, "bad.yaml", "metadata:\n  name: incomplete\n");
    let renderer = FileRenderer::new(base.path());

    let result = renderer.render(
        &ApplyAction::Manifest {
            path: "bad.yaml".to_string(),
        },
        &EnvironmentId::new("prod"),
    );
    assert!(matches!(result, Err(RenderError::Parse { .. })));
}

// ============================================================================
// SECTION: Overlay Directories
// ============================================================================

#[test]
fn test_environment_overlay_replaces_base_file() {
    let base = TempDir::new().unwrap();
    write_manifest(
        &base,
        "services/app.yaml",
        "kind: ConfigMap\nmetadata:\n  name: app\ndata:\n  replicas: \"1\"\n",
    );
    write_manifest(
        &base,
        "services/extra.yaml",
        "kind: ConfigMap\nmetadata:\n  name: extra\n",
    );
    write_manifest(
        &base,
        "services/prod/app.yaml",
        "kind: ConfigMap\nmetadata:\n  name: app\ndata:\n  replicas: \"3\"\n",
    );
    let renderer = FileRenderer::new(base.path());

    let set = renderer
        .render(
            &ApplyAction::ManifestDir {
                path: "services".to_string(),
            },
            &EnvironmentId::new("prod"),
        )
        .unwrap();

    assert_eq!(set.len(), 2);
    // Lexicographic order: app.yaml before extra.yaml.
    assert_eq!(set.objects[0].name, "app");
    assert!(set.objects[0].source_text.contains("\"3\""));
    assert_eq!(set.objects[1].name, "extra");
}

#[test]
fn test_other_environments_keep_the_base_file() {
    let base = TempDir::new().unwrap();
    write_manifest(
        &base,
        "services/app.yaml",
        "kind: ConfigMap\nmetadata:\n  name: app\ndata:\n  replicas: \"1\"\n",
    );
    write_manifest(
        &base,
        "services/prod/app.yaml",
        "kind: ConfigMap\nmetadata:\n  name: app\ndata:\n  replicas: \"3\"\n",
    );
    let renderer = FileRenderer::new(base.path());

    let set = renderer
        .render(
            &ApplyAction::ManifestDir {
                path: "services".to_string(),
            },
            &EnvironmentId::new("staging"),
        )
        .unwrap();

    assert_eq!(set.len(), 1);
    assert!(set.objects[0].source_text.contains("\"1\""));
}

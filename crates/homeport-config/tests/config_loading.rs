// homeport-config/tests/config_loading.rs
// ============================================================================
// Module: Config Loading Tests
// Description: Tests for strict TOML parsing and plan conversion.
// ============================================================================
//! ## Overview
//! Validates default application, fail-closed rejection of malformed
//! configuration, and conversion into the core deployment plan.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

use std::fs;

use homeport_config::CheckConfig;
use homeport_config::ConfigError;
use homeport_config::load_config;
use homeport_core::ApplyAction;
use homeport_core::FailurePolicy;
use homeport_core::ReadyPredicate;
use tempfile::TempDir;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// A representative configuration covering phases and every check type.
const FULL_CONFIG: &str = r#"
[defaults]
gate_timeout_ms = 60000
gate_poll_interval_ms = 2000
check_workers = 2

[[phase]]
id = "infrastructure"
on_failure = "fatal"

  [[phase.action]]
  kind = "manifest"
  path = "namespaces.yaml"

  [[phase.gate]]
  wait_for = "namespace_exists"
  namespace = "platform"

[[phase]]
id = "services"
on_failure = "warn"

  [[phase.action]]
  kind = "chart_release"
  chart = "charts/gateway"
  release = "gateway"
  namespace = "platform"
  values_path = "values/gateway.yaml"

  [[phase.gate]]
  wait_for = "pods_ready"
  namespace = "platform"
  selector = { app = "gateway" }
  timeout_ms = 120000

[[check]]
type = "namespace_exists"
id = "namespace-platform"
namespace = "platform"

[[check]]
type = "object_exists"
id = "secret-db"
object_kind = "Secret"
name = "db-credentials"
namespace = "platform"
severity = "warn"

[[check]]
type = "phase_match"
id = "pods-running"
namespace = "platform"
selector = { app = "gateway" }
expected_phase = "Running"

[[check]]
type = "count_threshold"
id = "managed-secrets"
namespace = "platform"
selector = { managed = "homeport" }
minimum = 5

[[check]]
type = "reachability"
id = "web-ui"
url = "http://gateway.lab.local/healthz"

[[check]]
type = "content_policy"
id = "no-inline-credentials"
patterns = ["PASSWORD=", "BEGIN RSA PRIVATE KEY"]
"#;

/// Writes a config file and loads it.
fn load(content: &str) -> Result<homeport_config::HomeportConfig, ConfigError> {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("homeport.toml");
    fs::write(&path, content).expect("write config");
    load_config(Some(&path))
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

#[test]
fn test_full_config_parses() {
    let config = load(FULL_CONFIG).unwrap();
    assert_eq!(config.phases.len(), 2);
    assert_eq!(config.checks.len(), 6);
    assert_eq!(config.defaults.check_workers, 2);
    assert!(matches!(config.checks[1], CheckConfig::ObjectExists { .. }));
}

#[test]
fn test_missing_file_fails_closed() {
    let dir = TempDir::new().unwrap();
    let result = load_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_unknown_field_is_rejected() {
    let result = load("[defaults]\nunknown_knob = true\n");
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_duplicate_check_ids_rejected() {
    let config = r#"
[[check]]
type = "namespace_exists"
id = "dup"
namespace = "a"

[[check]]
type = "namespace_exists"
id = "dup"
namespace = "b"
"#;
    assert!(matches!(load(config), Err(ConfigError::DuplicateCheckId(_))));
}

#[test]
fn test_content_policy_requires_patterns() {
    let config = r#"
[[check]]
type = "content_policy"
id = "no-secrets"
patterns = []
"#;
    assert!(matches!(load(config), Err(ConfigError::EmptyPatterns(_))));
}

#[test]
fn test_invalid_expected_status_rejected() {
    let config = r#"
[[check]]
type = "reachability"
id = "web"
url = "http://lab.local/"
expected_status = 42
"#;
    assert!(matches!(load(config), Err(ConfigError::InvalidExpectedStatus(_))));
}

// ============================================================================
// SECTION: Plan Conversion
// ============================================================================

#[test]
fn test_deploy_plan_applies_wait_defaults() {
    let config = load(FULL_CONFIG).unwrap();
    let plan = config.deploy_plan().unwrap();

    assert_eq!(plan.phases.len(), 2);
    assert_eq!(plan.phases[0].failure_policy, FailurePolicy::Fatal);
    assert_eq!(plan.phases[1].failure_policy, FailurePolicy::Warn);

    // First gate inherits defaults; second declares its own timeout.
    assert_eq!(plan.phases[0].gates[0].timeout_ms, 60_000);
    assert_eq!(plan.phases[0].gates[0].poll_interval_ms, 2_000);
    assert_eq!(plan.phases[1].gates[0].timeout_ms, 120_000);
    assert_eq!(plan.phases[1].gates[0].predicate, ReadyPredicate::AllReady);

    assert!(matches!(plan.phases[1].actions[0], ApplyAction::ChartRelease { .. }));
}

#[test]
fn test_config_without_phases_converts_to_an_invalid_plan() {
    let config = load("[defaults]\ncheck_workers = 1\n").unwrap();
    assert!(matches!(config.deploy_plan(), Err(ConfigError::InvalidPlan(_))));
}

// homeport-config/src/config.rs
// ============================================================================
// Module: Homeport Configuration
// Description: Configuration loading and validation for Homeport.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: homeport-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and count
//! limits. Missing or invalid configuration fails closed: no phase of an
//! invalid plan executes and no check of an invalid suite runs. The config
//! model converts into the core deployment plan, applying declared defaults
//! to per-gate wait parameters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use homeport_core::ApplyAction;
use homeport_core::CheckSeverity;
use homeport_core::ConditionTarget;
use homeport_core::DeployPlan;
use homeport_core::FailurePolicy;
use homeport_core::LabelSelector;
use homeport_core::PhaseSpec;
use homeport_core::PlanError;
use homeport_core::ReadinessCondition;
use homeport_core::ReadyPredicate;
use homeport_core::runtime::DEFAULT_CHECK_WORKERS;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "homeport.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "HOMEPORT_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Maximum number of configured checks.
pub(crate) const MAX_CHECKS: usize = 256;
/// Maximum length of a phase or check identifier.
pub(crate) const MAX_IDENTIFIER_LENGTH: usize = 128;
/// Default gate timeout in milliseconds.
const DEFAULT_GATE_TIMEOUT_MS: u64 = 300_000;
/// Default gate poll interval in milliseconds.
const DEFAULT_GATE_POLL_INTERVAL_MS: u64 = 5_000;
/// Default HTTP probe timeout in milliseconds.
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Homeport configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HomeportConfig {
    /// Shared defaults for wait parameters and tool paths.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Ordered phase declarations.
    #[serde(default, rename = "phase")]
    pub phases: Vec<PhaseConfig>,
    /// Validation check declarations.
    #[serde(default, rename = "check")]
    pub checks: Vec<CheckConfig>,
}

/// Shared configuration defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Default gate timeout in milliseconds.
    #[serde(default = "default_gate_timeout_ms")]
    pub gate_timeout_ms: u64,
    /// Default gate poll interval in milliseconds.
    #[serde(default = "default_gate_poll_interval_ms")]
    pub gate_poll_interval_ms: u64,
    /// Upper bound on concurrently executing checks.
    #[serde(default = "default_check_workers")]
    pub check_workers: usize,
    /// Path or name of the kubectl binary.
    #[serde(default = "default_kubectl_binary")]
    pub kubectl_binary: String,
    /// Path or name of the helm binary.
    #[serde(default = "default_helm_binary")]
    pub helm_binary: String,
    /// Base directory resolving relative manifest and values paths.
    #[serde(default = "default_manifest_dir")]
    pub manifest_dir: String,
    /// Append-only run log path.
    #[serde(default = "default_run_log_path")]
    pub run_log_path: String,
    /// HTTP probe timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            gate_timeout_ms: DEFAULT_GATE_TIMEOUT_MS,
            gate_poll_interval_ms: DEFAULT_GATE_POLL_INTERVAL_MS,
            check_workers: DEFAULT_CHECK_WORKERS,
            kubectl_binary: default_kubectl_binary(),
            helm_binary: default_helm_binary(),
            manifest_dir: default_manifest_dir(),
            run_log_path: default_run_log_path(),
            http_timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
        }
    }
}

/// One declared deployment phase.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseConfig {
    /// Phase identifier.
    pub id: String,
    /// Failure policy for the phase.
    #[serde(default)]
    pub on_failure: PolicyConfig,
    /// Ordered apply actions.
    #[serde(default, rename = "action")]
    pub actions: Vec<ActionConfig>,
    /// Ordered readiness gates.
    #[serde(default, rename = "gate")]
    pub gates: Vec<GateConfig>,
}

/// Failure policy configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyConfig {
    /// Phase failure aborts the run.
    #[default]
    Fatal,
    /// Phase failure is recorded and the run continues.
    Warn,
}

/// One declared apply action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionConfig {
    /// A single YAML manifest file.
    Manifest {
        /// Path to the manifest file.
        path: String,
    },
    /// A directory of YAML manifest files.
    ManifestDir {
        /// Path to the manifest directory.
        path: String,
    },
    /// A templated chart release.
    ChartRelease {
        /// Chart reference.
        chart: String,
        /// Release name.
        release: String,
        /// Namespace receiving the release.
        namespace: String,
        /// Optional values file path.
        values_path: Option<String>,
    },
}

/// One declared readiness gate.
///
/// Wait parameters fall back to the configured defaults when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    /// Observed condition.
    #[serde(flatten)]
    pub wait_for: WaitForConfig,
    /// Gate timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Gate poll interval in milliseconds.
    pub poll_interval_ms: Option<u64>,
}

/// Declared readiness condition variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "wait_for", rename_all = "snake_case")]
pub enum WaitForConfig {
    /// All selector-matched objects report ready.
    PodsReady {
        /// Namespace scoping the selection.
        namespace: String,
        /// Label selector applied to the listing.
        selector: BTreeMap<String, String>,
    },
    /// At least `minimum` objects match the selector.
    MinimumCount {
        /// Namespace scoping the selection.
        namespace: String,
        /// Label selector applied to the listing.
        selector: BTreeMap<String, String>,
        /// Minimum number of matching objects.
        minimum: usize,
    },
    /// The namespace exists.
    NamespaceExists {
        /// Namespace expected to exist.
        namespace: String,
    },
    /// A named object exists.
    ObjectExists {
        /// Namespace containing the object, if namespaced.
        namespace: Option<String>,
        /// Object kind.
        object_kind: String,
        /// Object name.
        name: String,
    },
}

/// Check severity configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityConfig {
    /// Informational only.
    Info,
    /// Advisory.
    Warn,
    /// Load-bearing.
    Critical,
}

impl SeverityConfig {
    /// Maps the configured severity into the core model.
    #[must_use]
    pub const fn into_severity(self) -> CheckSeverity {
        match self {
            Self::Info => CheckSeverity::Info,
            Self::Warn => CheckSeverity::Warn,
            Self::Critical => CheckSeverity::Critical,
        }
    }
}

/// Returns the default severity for existence and phase checks.
const fn default_severity() -> SeverityConfig {
    SeverityConfig::Critical
}

/// Returns the default expected HTTP status.
const fn default_expected_status() -> u16 {
    200
}

/// One declared validation check.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckConfig {
    /// A namespace exists.
    NamespaceExists {
        /// Check identifier.
        id: String,
        /// Namespace expected to exist.
        namespace: String,
        /// Failure severity.
        #[serde(default = "default_severity")]
        severity: SeverityConfig,
    },
    /// A named object exists.
    ObjectExists {
        /// Check identifier.
        id: String,
        /// Namespace containing the object, if namespaced.
        namespace: Option<String>,
        /// Object kind.
        object_kind: String,
        /// Object name.
        name: String,
        /// Failure severity.
        #[serde(default = "default_severity")]
        severity: SeverityConfig,
    },
    /// All selector-matched objects report an expected phase.
    PhaseMatch {
        /// Check identifier.
        id: String,
        /// Namespace scoping the selection.
        namespace: String,
        /// Label selector applied to the listing.
        selector: BTreeMap<String, String>,
        /// Expected lifecycle phase.
        expected_phase: String,
        /// Failure severity.
        #[serde(default = "default_severity")]
        severity: SeverityConfig,
    },
    /// At least `minimum` objects match the selector.
    CountThreshold {
        /// Check identifier.
        id: String,
        /// Namespace scoping the selection.
        namespace: String,
        /// Label selector applied to the listing.
        selector: BTreeMap<String, String>,
        /// Minimum number of matching objects.
        minimum: usize,
    },
    /// An endpoint answers with an expected status.
    Reachability {
        /// Check identifier.
        id: String,
        /// Probe URL.
        url: String,
        /// Expected response status code.
        #[serde(default = "default_expected_status")]
        expected_status: u16,
    },
    /// Rendered definitions contain no disallowed literals.
    ContentPolicy {
        /// Check identifier.
        id: String,
        /// Disallowed literal patterns.
        patterns: Vec<String>,
    },
}

impl CheckConfig {
    /// Returns the declared check identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::NamespaceExists {
                id, ..
            }
            | Self::ObjectExists {
                id, ..
            }
            | Self::PhaseMatch {
                id, ..
            }
            | Self::CountThreshold {
                id, ..
            }
            | Self::Reachability {
                id, ..
            }
            | Self::ContentPolicy {
                id, ..
            } => id,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist.
    #[error("config file not found: {0}")]
    NotFound(String),
    /// Configuration file could not be read.
    #[error("config read failed for {0}: {1}")]
    Io(String, String),
    /// Configuration file exceeds the size limit.
    #[error("config file exceeds {MAX_CONFIG_FILE_SIZE} bytes: {0}")]
    TooLarge(String),
    /// Configuration failed to parse.
    #[error("config parse failed: {0}")]
    Parse(String),
    /// Identifier is empty.
    #[error("empty identifier in {0}")]
    EmptyIdentifier(String),
    /// Identifier exceeds the length limit.
    #[error("identifier too long: {0}")]
    IdentifierTooLong(String),
    /// Duplicate check identifiers declared.
    #[error("duplicate check identifier: {0}")]
    DuplicateCheckId(String),
    /// Too many checks declared.
    #[error("config declares {0} checks (limit {MAX_CHECKS})")]
    TooManyChecks(usize),
    /// Expected HTTP status is out of range.
    #[error("check {0} declares an invalid expected status")]
    InvalidExpectedStatus(String),
    /// Content policy check declares no patterns.
    #[error("check {0} declares no patterns")]
    EmptyPatterns(String),
    /// Declared plan failed core validation.
    #[error(transparent)]
    InvalidPlan(#[from] PlanError),
}

// ============================================================================
// SECTION: Loading
// ============================================================================

/// Loads and validates configuration from an explicit path, the
/// `HOMEPORT_CONFIG` environment variable, or `homeport.toml`.
///
/// # Errors
///
/// Returns [`ConfigError`] when the file is missing, oversized, unparseable,
/// or structurally invalid.
pub fn load_config(path: Option<&Path>) -> Result<HomeportConfig, ConfigError> {
    let resolved: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => env::var(CONFIG_ENV_VAR)
            .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
    };
    let display = resolved.display().to_string();

    if !resolved.is_file() {
        return Err(ConfigError::NotFound(display));
    }
    let metadata =
        fs::metadata(&resolved).map_err(|err| ConfigError::Io(display.clone(), err.to_string()))?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::TooLarge(display));
    }
    let text = fs::read_to_string(&resolved)
        .map_err(|err| ConfigError::Io(display.clone(), err.to_string()))?;

    let config: HomeportConfig =
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))?;
    config.validate()?;
    Ok(config)
}

impl HomeportConfig {
    /// Validates identifiers, limits, and check declarations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on the first structural violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for phase in &self.phases {
            ensure_identifier(&phase.id, "phase")?;
        }
        if self.checks.len() > MAX_CHECKS {
            return Err(ConfigError::TooManyChecks(self.checks.len()));
        }
        for (index, check) in self.checks.iter().enumerate() {
            ensure_identifier(check.id(), "check")?;
            if self.checks.iter().skip(index + 1).any(|other| other.id() == check.id()) {
                return Err(ConfigError::DuplicateCheckId(check.id().to_string()));
            }
            match check {
                CheckConfig::Reachability {
                    id,
                    expected_status,
                    ..
                } => {
                    if !(100..=599).contains(expected_status) {
                        return Err(ConfigError::InvalidExpectedStatus(id.clone()));
                    }
                }
                CheckConfig::ContentPolicy {
                    id,
                    patterns,
                } => {
                    if patterns.is_empty() || patterns.iter().any(String::is_empty) {
                        return Err(ConfigError::EmptyPatterns(id.clone()));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Converts the declared phases into a validated deployment plan.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPlan`] when the declared plan fails core
    /// validation.
    pub fn deploy_plan(&self) -> Result<DeployPlan, ConfigError> {
        let phases = self
            .phases
            .iter()
            .map(|phase| self.phase_spec(phase))
            .collect();
        let plan = DeployPlan {
            phases,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Converts one phase declaration into a phase specification.
    fn phase_spec(&self, phase: &PhaseConfig) -> PhaseSpec {
        PhaseSpec {
            phase_id: phase.id.as_str().into(),
            actions: phase.actions.iter().map(action_spec).collect(),
            gates: phase.gates.iter().map(|gate| self.condition_spec(gate)).collect(),
            failure_policy: match phase.on_failure {
                PolicyConfig::Fatal => FailurePolicy::Fatal,
                PolicyConfig::Warn => FailurePolicy::Warn,
            },
        }
    }

    /// Converts one gate declaration, applying wait-parameter defaults.
    fn condition_spec(&self, gate: &GateConfig) -> ReadinessCondition {
        let (target, predicate) = match &gate.wait_for {
            WaitForConfig::PodsReady {
                namespace,
                selector,
            } => (
                ConditionTarget::Selector {
                    namespace: namespace.as_str().into(),
                    selector: LabelSelector::new(selector.clone()),
                },
                ReadyPredicate::AllReady,
            ),
            WaitForConfig::MinimumCount {
                namespace,
                selector,
                minimum,
            } => (
                ConditionTarget::Selector {
                    namespace: namespace.as_str().into(),
                    selector: LabelSelector::new(selector.clone()),
                },
                ReadyPredicate::MinimumCount {
                    minimum: *minimum,
                },
            ),
            WaitForConfig::NamespaceExists {
                namespace,
            } => (
                ConditionTarget::Namespace {
                    namespace: namespace.as_str().into(),
                },
                ReadyPredicate::Exists,
            ),
            WaitForConfig::ObjectExists {
                namespace,
                object_kind,
                name,
            } => (
                ConditionTarget::Object {
                    namespace: namespace.as_deref().map(Into::into),
                    kind: object_kind.clone(),
                    name: name.clone(),
                },
                ReadyPredicate::Exists,
            ),
        };
        ReadinessCondition {
            target,
            predicate,
            timeout_ms: gate.timeout_ms.unwrap_or(self.defaults.gate_timeout_ms),
            poll_interval_ms: gate
                .poll_interval_ms
                .unwrap_or(self.defaults.gate_poll_interval_ms),
        }
    }
}

/// Converts one action declaration into a core apply action.
fn action_spec(action: &ActionConfig) -> ApplyAction {
    match action {
        ActionConfig::Manifest {
            path,
        } => ApplyAction::Manifest {
            path: path.clone(),
        },
        ActionConfig::ManifestDir {
            path,
        } => ApplyAction::ManifestDir {
            path: path.clone(),
        },
        ActionConfig::ChartRelease {
            chart,
            release,
            namespace,
            values_path,
        } => ApplyAction::ChartRelease {
            chart: chart.clone(),
            release: release.clone(),
            namespace: namespace.as_str().into(),
            values_path: values_path.clone(),
        },
    }
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures an identifier is non-empty and within the length limit.
fn ensure_identifier(id: &str, context: &str) -> Result<(), ConfigError> {
    if id.is_empty() {
        return Err(ConfigError::EmptyIdentifier(context.to_string()));
    }
    if id.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConfigError::IdentifierTooLong(id.to_string()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Serde Defaults
// ============================================================================

/// Default gate timeout.
const fn default_gate_timeout_ms() -> u64 {
    DEFAULT_GATE_TIMEOUT_MS
}

/// Default gate poll interval.
const fn default_gate_poll_interval_ms() -> u64 {
    DEFAULT_GATE_POLL_INTERVAL_MS
}

/// Default check worker bound.
const fn default_check_workers() -> usize {
    DEFAULT_CHECK_WORKERS
}

/// Default kubectl binary name.
fn default_kubectl_binary() -> String {
    "kubectl".to_string()
}

/// Default helm binary name.
fn default_helm_binary() -> String {
    "helm".to_string()
}

/// Default manifest base directory.
fn default_manifest_dir() -> String {
    ".".to_string()
}

/// Default run log path.
fn default_run_log_path() -> String {
    "homeport-run.log".to_string()
}

/// Default HTTP probe timeout.
const fn default_http_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

// homeport-cluster/src/kubectl.rs
// ============================================================================
// Module: Kubectl Cluster Adapter
// Description: Cluster interface over kubectl subprocess invocations.
// Purpose: Apply and observe cluster objects through structured JSON reads.
// Dependencies: homeport-core, serde_json, std::process
// ============================================================================

//! ## Overview
//! The kubectl adapter implements the cluster interface by shelling out to
//! `kubectl`. Every read uses `-o json` and parses structured output; apply
//! maps the trailing disposition token of `kubectl apply`, which is a stable
//! CLI contract. Connection-class failures are classified as transient so
//! gates keep polling through API hiccups instead of failing outright.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use homeport_core::ApplyDisposition;
use homeport_core::ClusterApi;
use homeport_core::ClusterError;
use homeport_core::LabelSelector;
use homeport_core::NamespaceId;
use homeport_core::ObjectState;
use homeport_core::ResourceObject;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the kubectl adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KubectlConfig {
    /// Path or name of the kubectl binary.
    pub binary: String,
    /// Optional kubeconfig context.
    pub context: Option<String>,
}

impl Default for KubectlConfig {
    fn default() -> Self {
        Self {
            binary: "kubectl".to_string(),
            context: None,
        }
    }
}

// ============================================================================
// SECTION: Kubectl Cluster
// ============================================================================

/// Cluster interface backed by kubectl subprocess invocations.
#[derive(Debug, Clone)]
pub struct KubectlCluster {
    /// Adapter configuration.
    config: KubectlConfig,
}

impl KubectlCluster {
    /// Creates a kubectl-backed cluster interface.
    #[must_use]
    pub const fn new(config: KubectlConfig) -> Self {
        Self {
            config,
        }
    }

    /// Runs kubectl with the given arguments and optional stdin payload.
    fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<Output, ClusterError> {
        let mut command = Command::new(&self.config.binary);
        if let Some(context) = &self.config.context {
            command.arg("--context").arg(context);
        }
        command.args(args);
        command.stdout(Stdio::piped()).stderr(Stdio::piped());

        if let Some(payload) = stdin {
            command.stdin(Stdio::piped());
            let mut child = command
                .spawn()
                .map_err(|err| ClusterError::Api(format!("kubectl spawn failed: {err}")))?;
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(payload.as_bytes())
                    .map_err(|err| ClusterError::Api(format!("kubectl stdin failed: {err}")))?;
            }
            child
                .wait_with_output()
                .map_err(|err| ClusterError::Api(format!("kubectl wait failed: {err}")))
        } else {
            command
                .output()
                .map_err(|err| ClusterError::Api(format!("kubectl spawn failed: {err}")))
        }
    }

    /// Runs a read command and parses its JSON output.
    fn read_json(&self, args: &[&str]) -> Result<Option<Value>, ClusterError> {
        let output = self.run(args, None)?;
        if output.status.success() {
            let value = serde_json::from_slice(&output.stdout)
                .map_err(|err| ClusterError::Api(format!("kubectl json parse failed: {err}")))?;
            return Ok(Some(value));
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_not_found(&stderr) {
            return Ok(None);
        }
        Err(classify_failure(&stderr))
    }
}

impl ClusterApi for KubectlCluster {
    fn apply_object(&self, object: &ResourceObject) -> Result<ApplyDisposition, ClusterError> {
        let payload = serde_json::to_string(&object.manifest)
            .map_err(|err| ClusterError::Api(format!("manifest serialization failed: {err}")))?;
        let output = self.run(&["apply", "-f", "-"], Some(&payload))?;
        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            return parse_apply_disposition(&stdout).ok_or_else(|| {
                ClusterError::Api(format!("unrecognized apply output: {}", stdout.trim()))
            });
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if is_transient(&stderr) {
            return Err(ClusterError::Transient(stderr.trim().to_string()));
        }
        Err(ClusterError::Rejected {
            kind: object.kind.clone(),
            name: object.name.clone(),
            reason: stderr.trim().to_string(),
        })
    }

    fn get_object(
        &self,
        kind: &str,
        namespace: Option<&NamespaceId>,
        name: &str,
    ) -> Result<Option<ObjectState>, ClusterError> {
        let mut args = vec!["get", kind, name, "-o", "json"];
        if let Some(namespace) = namespace {
            args.push("-n");
            args.push(namespace.as_str());
        }
        match self.read_json(&args)? {
            Some(value) => Ok(Some(parse_object_state(&value)?)),
            None => Ok(None),
        }
    }

    fn list_by_selector(
        &self,
        namespace: &NamespaceId,
        selector: &LabelSelector,
    ) -> Result<Vec<ObjectState>, ClusterError> {
        let selector_arg = selector.to_string();
        let args = vec![
            "get",
            "all",
            "-n",
            namespace.as_str(),
            "-l",
            selector_arg.as_str(),
            "-o",
            "json",
        ];
        match self.read_json(&args)? {
            Some(value) => parse_object_list(&value),
            None => Ok(Vec::new()),
        }
    }

    fn namespace_exists(&self, namespace: &NamespaceId) -> Result<bool, ClusterError> {
        let args = vec!["get", "namespace", namespace.as_str(), "-o", "json"];
        Ok(self.read_json(&args)?.is_some())
    }
}

// ============================================================================
// SECTION: Output Parsing
// ============================================================================

/// Maps the trailing disposition token of `kubectl apply` output.
#[must_use]
pub fn parse_apply_disposition(stdout: &str) -> Option<ApplyDisposition> {
    let token = stdout.trim().rsplit(char::is_whitespace).next()?;
    match token {
        "created" | "serverside-applied" => Some(ApplyDisposition::Created),
        "configured" => Some(ApplyDisposition::Patched),
        "unchanged" => Some(ApplyDisposition::Unchanged),
        _ => None,
    }
}

/// Parses one kubectl object JSON document into an object state.
///
/// # Errors
///
/// Returns [`ClusterError::Api`] when required fields are missing.
pub fn parse_object_state(value: &Value) -> Result<ObjectState, ClusterError> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| ClusterError::Api("object has no kind".to_string()))?;
    let metadata = value
        .get("metadata")
        .ok_or_else(|| ClusterError::Api("object has no metadata".to_string()))?;
    let name = metadata
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ClusterError::Api("object has no name".to_string()))?;
    let namespace = metadata
        .get("namespace")
        .and_then(Value::as_str)
        .map(NamespaceId::new);
    let labels = metadata
        .get("labels")
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .filter_map(|(key, value)| {
                    value.as_str().map(|value| (key.clone(), value.to_string()))
                })
                .collect::<BTreeMap<String, String>>()
        })
        .unwrap_or_default();
    let phase = value
        .get("status")
        .and_then(|status| status.get("phase"))
        .and_then(Value::as_str)
        .map(ToString::to_string);

    Ok(ObjectState {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace,
        ready: is_ready(value, phase.as_deref()),
        phase,
        labels,
    })
}

/// Parses a kubectl list document into object states.
///
/// # Errors
///
/// Returns [`ClusterError::Api`] when the listing shape is unexpected.
pub fn parse_object_list(value: &Value) -> Result<Vec<ObjectState>, ClusterError> {
    let items = value
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ClusterError::Api("listing has no items".to_string()))?;
    items.iter().map(parse_object_state).collect()
}

/// Derives readiness from status conditions, falling back to the phase.
fn is_ready(value: &Value, phase: Option<&str>) -> bool {
    let conditions = value
        .get("status")
        .and_then(|status| status.get("conditions"))
        .and_then(Value::as_array);
    if let Some(conditions) = conditions {
        let ready_condition = conditions.iter().find(|condition| {
            condition.get("type").and_then(Value::as_str) == Some("Ready")
        });
        if let Some(condition) = ready_condition {
            return condition.get("status").and_then(Value::as_str) == Some("True");
        }
    }
    matches!(phase, Some("Running" | "Active" | "Bound" | "Succeeded"))
}

// ============================================================================
// SECTION: Failure Classification
// ============================================================================

/// Returns true when stderr indicates a missing object.
fn is_not_found(stderr: &str) -> bool {
    stderr.contains("NotFound") || stderr.contains("not found")
}

/// Returns true when stderr indicates a retryable connection-class failure.
fn is_transient(stderr: &str) -> bool {
    let lowered = stderr.to_lowercase();
    lowered.contains("connection refused")
        || lowered.contains("i/o timeout")
        || lowered.contains("timed out")
        || lowered.contains("tls handshake")
        || lowered.contains("temporarily unavailable")
}

/// Classifies a failed read into a transient or terminal cluster error.
fn classify_failure(stderr: &str) -> ClusterError {
    let trimmed = stderr.trim().to_string();
    if is_transient(stderr) {
        ClusterError::Transient(trimmed)
    } else {
        ClusterError::Api(trimmed)
    }
}

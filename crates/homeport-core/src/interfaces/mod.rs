// homeport-core/src/interfaces/mod.rs
// ============================================================================
// Module: Homeport Interfaces
// Description: Capability interfaces for cluster access, rendering, and time.
// Purpose: Define the contract surfaces used by the Homeport runtime.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Interfaces define how Homeport integrates with external systems without
//! embedding backend-specific details. The cluster control plane, the
//! resource-set producers, and wall-clock time are all consumed through these
//! traits; implementations must be deterministic where the contract requires
//! it and fail closed on missing or invalid data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::model::condition::LabelSelector;
use crate::model::identifiers::EnvironmentId;
use crate::model::identifiers::NamespaceId;
use crate::model::plan::ApplyAction;
use crate::model::resource::ApplyDisposition;
use crate::model::resource::ResourceObject;
use crate::model::resource::ResourceSet;
use crate::model::time::Timestamp;

// ============================================================================
// SECTION: Cluster API
// ============================================================================

/// Observed state of one cluster object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    /// Object kind.
    pub kind: String,
    /// Object name.
    pub name: String,
    /// Namespace containing the object, if namespaced.
    pub namespace: Option<NamespaceId>,
    /// Lifecycle phase reported by the cluster, if any.
    pub phase: Option<String>,
    /// Whether the object reports a ready condition.
    pub ready: bool,
    /// Object labels.
    pub labels: BTreeMap<String, String>,
}

/// Cluster API errors.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// The cluster rejected a submitted resource.
    #[error("cluster rejected {kind}/{name}: {reason}")]
    Rejected {
        /// Rejected object kind.
        kind: String,
        /// Rejected object name.
        name: String,
        /// Rejection cause reported by the cluster.
        reason: String,
    },
    /// A read temporarily could not be evaluated.
    ///
    /// Transient errors are never terminal by themselves; gates treat them as
    /// "not yet satisfied" and checks surface them in the result message.
    #[error("transient cluster error: {0}")]
    Transient(String),
    /// The cluster API reported a non-transient error.
    #[error("cluster api error: {0}")]
    Api(String),
}

/// Capability interface over the cluster control plane.
///
/// Apply semantics are idempotent and declarative: create if absent, patch if
/// present and changed, no-op if identical. Reads never mutate state. The
/// cluster's own concurrency control is the only shared-resource policy;
/// Homeport holds no in-process lock over it.
pub trait ClusterApi: Send + Sync {
    /// Submits one declarative object to the cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Rejected`] when the cluster refuses the
    /// resource and [`ClusterError::Transient`] for retryable API failures.
    fn apply_object(&self, object: &ResourceObject) -> Result<ApplyDisposition, ClusterError>;

    /// Reads one named object, returning `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the read fails.
    fn get_object(
        &self,
        kind: &str,
        namespace: Option<&NamespaceId>,
        name: &str,
    ) -> Result<Option<ObjectState>, ClusterError>;

    /// Lists objects matching a label selector within a namespace.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the listing fails.
    fn list_by_selector(
        &self,
        namespace: &NamespaceId,
        selector: &LabelSelector,
    ) -> Result<Vec<ObjectState>, ClusterError>;

    /// Returns true when the namespace exists.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError`] when the read fails.
    fn namespace_exists(&self, namespace: &NamespaceId) -> Result<bool, ClusterError>;
}

impl<T: ClusterApi + ?Sized> ClusterApi for &T {
    fn apply_object(&self, object: &ResourceObject) -> Result<ApplyDisposition, ClusterError> {
        (**self).apply_object(object)
    }

    fn get_object(
        &self,
        kind: &str,
        namespace: Option<&NamespaceId>,
        name: &str,
    ) -> Result<Option<ObjectState>, ClusterError> {
        (**self).get_object(kind, namespace, name)
    }

    fn list_by_selector(
        &self,
        namespace: &NamespaceId,
        selector: &LabelSelector,
    ) -> Result<Vec<ObjectState>, ClusterError> {
        (**self).list_by_selector(namespace, selector)
    }

    fn namespace_exists(&self, namespace: &NamespaceId) -> Result<bool, ClusterError> {
        (**self).namespace_exists(namespace)
    }
}

// ============================================================================
// SECTION: Resource Renderer
// ============================================================================

/// Resource-set rendering errors.
///
/// A render error is always fatal to its phase regardless of failure policy:
/// nothing was submitted, so there is nothing to converge against.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Manifest source file or directory is missing.
    #[error("manifest source not found: {0}")]
    SourceMissing(String),
    /// Manifest document failed to parse.
    #[error("manifest parse failed for {path}: {reason}")]
    Parse {
        /// Source path of the failing document.
        path: String,
        /// Parse failure cause.
        reason: String,
    },
    /// Template composition for a chart release failed.
    #[error("template rendering failed for release {release}: {reason}")]
    Template {
        /// Release name that failed to render.
        release: String,
        /// Rendering failure cause.
        reason: String,
    },
    /// Rendered output exceeds a size limit.
    #[error("render output exceeds size limit: {0}")]
    TooLarge(String),
}

/// Capability interface producing concrete resource sets for an environment.
pub trait ResourceRenderer: Send + Sync {
    /// Renders an apply action into a concrete resource set.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when composition fails; no resource was
    /// submitted in that case.
    fn render(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError>;
}

impl<T: ResourceRenderer + ?Sized> ResourceRenderer for &T {
    fn render(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        (**self).render(action, environment)
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Time capability supplying timestamps, monotonic readings, and sleeps.
///
/// The runtime never reads wall-clock time directly; injecting the clock
/// keeps gate-timeout tests deterministic with short windows.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp for record stamping.
    fn now(&self) -> Timestamp;

    /// Returns elapsed time since an arbitrary fixed origin.
    fn monotonic(&self) -> Duration;

    /// Blocks the calling thread for the given duration.
    fn sleep(&self, duration: Duration);
}

/// System clock backed by `SystemTime` and `Instant`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    /// Monotonic origin captured at construction.
    origin: Instant,
}

impl SystemClock {
    /// Creates a system clock with its monotonic origin at construction time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX));
        Timestamp::UnixMillis(millis)
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation token checked between observations and phases.
///
/// Cancellation stops polling promptly, marks the active gate incomplete, and
/// aborts the run; in-flight apply actions are never rolled back.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true when cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

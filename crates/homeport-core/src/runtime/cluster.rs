// homeport-core/src/runtime/cluster.rs
// ============================================================================
// Module: Homeport In-Memory Cluster
// Description: Simple in-memory cluster interface for tests and dry runs.
// Purpose: Provide a deterministic cluster implementation without external deps.
// Dependencies: crate::{model, interfaces}
// ============================================================================

//! ## Overview
//! This module provides a simple in-memory implementation of
//! [`ClusterApi`] for tests, local demos, and dry runs. It supports object
//! seeding, idempotent apply semantics over manifest equality, scripted
//! transient observation errors, and readiness that flips after a configured
//! number of observations. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;

use crate::interfaces::ClusterApi;
use crate::interfaces::ClusterError;
use crate::interfaces::ObjectState;
use crate::model::condition::LabelSelector;
use crate::model::identifiers::NamespaceId;
use crate::model::resource::ApplyDisposition;
use crate::model::resource::ResourceObject;

// ============================================================================
// SECTION: Stored Objects
// ============================================================================

/// One stored object with its manifest and readiness schedule.
#[derive(Debug, Clone)]
struct StoredObject {
    /// Observed object state.
    state: ObjectState,
    /// Manifest content used for idempotence comparison.
    manifest: Value,
    /// Readiness flips true after this many observations, when set.
    ready_after: Option<u32>,
    /// Number of observations of this object so far.
    observations: u32,
}

impl StoredObject {
    /// Returns the object state with effective readiness applied.
    fn observed_state(&mut self) -> ObjectState {
        self.observations = self.observations.saturating_add(1);
        let mut state = self.state.clone();
        if let Some(threshold) = self.ready_after {
            state.ready = self.observations >= threshold;
        }
        state
    }
}

/// Mutable interior state of the in-memory cluster.
#[derive(Debug, Default)]
struct ClusterState {
    /// Stored objects keyed by `kind/namespace/name`.
    objects: BTreeMap<String, StoredObject>,
    /// Kinds whose apply is scripted to be rejected.
    rejected_kinds: BTreeSet<String>,
    /// Remaining scripted transient observation errors.
    transient_remaining: u32,
}

// ============================================================================
// SECTION: In-Memory Cluster
// ============================================================================

/// In-memory cluster interface for tests, demos, and dry runs.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCluster {
    /// Interior state protected by a mutex.
    state: Arc<Mutex<ClusterState>>,
}

impl InMemoryCluster {
    /// Creates an empty in-memory cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object without going through apply.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Api`] when the state mutex is poisoned.
    pub fn seed_object(&self, state: ObjectState, manifest: Value) -> Result<(), ClusterError> {
        let key = object_key(&state.kind, state.namespace.as_ref(), &state.name);
        let mut guard = self.lock()?;
        guard.objects.insert(key, StoredObject {
            state,
            manifest,
            ready_after: None,
            observations: 0,
        });
        Ok(())
    }

    /// Schedules an object's readiness to flip true after N observations.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Api`] when the object is unknown or the state
    /// mutex is poisoned.
    pub fn set_ready_after(
        &self,
        kind: &str,
        namespace: Option<&NamespaceId>,
        name: &str,
        observations: u32,
    ) -> Result<(), ClusterError> {
        let key = object_key(kind, namespace, name);
        let mut guard = self.lock()?;
        let object = guard
            .objects
            .get_mut(&key)
            .ok_or_else(|| ClusterError::Api(format!("unknown object {key}")))?;
        object.ready_after = Some(observations);
        Ok(())
    }

    /// Scripts the next N observations to fail with a transient error.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Api`] when the state mutex is poisoned.
    pub fn script_transient_errors(&self, count: u32) -> Result<(), ClusterError> {
        let mut guard = self.lock()?;
        guard.transient_remaining = count;
        Ok(())
    }

    /// Scripts apply rejection for every object of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Api`] when the state mutex is poisoned.
    pub fn reject_kind(&self, kind: impl Into<String>) -> Result<(), ClusterError> {
        let mut guard = self.lock()?;
        guard.rejected_kinds.insert(kind.into());
        Ok(())
    }

    /// Returns the number of stored objects.
    ///
    /// # Errors
    ///
    /// Returns [`ClusterError::Api`] when the state mutex is poisoned.
    pub fn object_count(&self) -> Result<usize, ClusterError> {
        Ok(self.lock()?.objects.len())
    }

    /// Locks the interior state.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ClusterState>, ClusterError> {
        self.state.lock().map_err(|_| ClusterError::Api("cluster mutex poisoned".to_string()))
    }

    /// Consumes one scripted transient error, if any remain.
    fn take_transient(guard: &mut ClusterState) -> Result<(), ClusterError> {
        if guard.transient_remaining > 0 {
            guard.transient_remaining -= 1;
            return Err(ClusterError::Transient("scripted observation error".to_string()));
        }
        Ok(())
    }
}

impl ClusterApi for InMemoryCluster {
    fn apply_object(&self, object: &ResourceObject) -> Result<ApplyDisposition, ClusterError> {
        let mut guard = self.lock()?;
        if guard.rejected_kinds.contains(&object.kind) {
            return Err(ClusterError::Rejected {
                kind: object.kind.clone(),
                name: object.name.clone(),
                reason: "scripted rejection".to_string(),
            });
        }

        let key = object_key(&object.kind, object.namespace.as_ref(), &object.name);
        if let Some(existing) = guard.objects.get_mut(&key) {
            if existing.manifest == object.manifest {
                return Ok(ApplyDisposition::Unchanged);
            }
            existing.manifest = object.manifest.clone();
            existing.state.labels = object.labels.clone();
            return Ok(ApplyDisposition::Patched);
        }

        guard.objects.insert(key, StoredObject {
            state: ObjectState {
                kind: object.kind.clone(),
                name: object.name.clone(),
                namespace: object.namespace.clone(),
                phase: Some("Running".to_string()),
                ready: true,
                labels: object.labels.clone(),
            },
            manifest: object.manifest.clone(),
            ready_after: None,
            observations: 0,
        });
        Ok(ApplyDisposition::Created)
    }

    fn get_object(
        &self,
        kind: &str,
        namespace: Option<&NamespaceId>,
        name: &str,
    ) -> Result<Option<ObjectState>, ClusterError> {
        let mut guard = self.lock()?;
        Self::take_transient(&mut guard)?;
        let key = object_key(kind, namespace, name);
        Ok(guard.objects.get_mut(&key).map(StoredObject::observed_state))
    }

    fn list_by_selector(
        &self,
        namespace: &NamespaceId,
        selector: &LabelSelector,
    ) -> Result<Vec<ObjectState>, ClusterError> {
        let mut guard = self.lock()?;
        Self::take_transient(&mut guard)?;
        let states = guard
            .objects
            .values_mut()
            .filter(|object| {
                object.state.namespace.as_ref() == Some(namespace)
                    && selector.matches(&object.state.labels)
            })
            .map(StoredObject::observed_state)
            .collect();
        Ok(states)
    }

    fn namespace_exists(&self, namespace: &NamespaceId) -> Result<bool, ClusterError> {
        let mut guard = self.lock()?;
        Self::take_transient(&mut guard)?;
        let key = object_key("Namespace", None, namespace.as_str());
        Ok(guard.objects.contains_key(&key))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the storage key for an object.
fn object_key(kind: &str, namespace: Option<&NamespaceId>, name: &str) -> String {
    match namespace {
        Some(namespace) => format!("{kind}/{namespace}/{name}"),
        None => format!("{kind}//{name}"),
    }
}

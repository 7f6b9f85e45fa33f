// homeport-core/tests/common/mod.rs
// ============================================================================
// Module: Core Test Fixtures
// Description: Shared fixtures for orchestration and validation tests.
// ============================================================================
//! ## Overview
//! Deterministic clock, static renderer, and object builders shared across
//! the core test suite.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use homeport_core::ApplyAction;
use homeport_core::Clock;
use homeport_core::EnvironmentId;
use homeport_core::RenderError;
use homeport_core::ResourceObject;
use homeport_core::ResourceRenderer;
use homeport_core::ResourceSet;
use homeport_core::Timestamp;
use serde_json::json;

/// Interior state of the fake clock.
struct FakeClockState {
    /// Accumulated monotonic time.
    monotonic: Duration,
    /// Logical timestamp counter.
    logical: u64,
}

/// Deterministic clock whose sleeps advance monotonic time instantly.
pub struct FakeClock {
    /// Interior state protected by a mutex.
    state: Mutex<FakeClockState>,
}

impl FakeClock {
    /// Creates a fake clock at time zero.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeClockState {
                monotonic: Duration::ZERO,
                logical: 0,
            }),
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        let mut state = self.state.lock().expect("fake clock mutex");
        state.logical += 1;
        Timestamp::Logical(state.logical)
    }

    fn monotonic(&self) -> Duration {
        self.state.lock().expect("fake clock mutex").monotonic
    }

    fn sleep(&self, duration: Duration) {
        let mut state = self.state.lock().expect("fake clock mutex");
        state.monotonic += duration;
    }
}

/// Renderer serving fixed resource sets keyed by manifest path.
pub struct StaticRenderer {
    /// Resource sets keyed by manifest path.
    sets: BTreeMap<String, ResourceSet>,
    /// Paths rendered, in call order.
    rendered: Mutex<Vec<String>>,
}

impl StaticRenderer {
    /// Creates an empty static renderer.
    pub fn new() -> Self {
        Self {
            sets: BTreeMap::new(),
            rendered: Mutex::new(Vec::new()),
        }
    }

    /// Registers a resource set under a manifest path.
    pub fn with_set(mut self, path: &str, set: ResourceSet) -> Self {
        self.sets.insert(path.to_string(), set);
        self
    }

    /// Returns the paths rendered so far, in call order.
    pub fn rendered_paths(&self) -> Vec<String> {
        self.rendered.lock().expect("renderer mutex").clone()
    }
}

impl ResourceRenderer for StaticRenderer {
    fn render(
        &self,
        action: &ApplyAction,
        _environment: &EnvironmentId,
    ) -> Result<ResourceSet, RenderError> {
        let path = match action {
            ApplyAction::Manifest {
                path,
            }
            | ApplyAction::ManifestDir {
                path,
            } => path.clone(),
            ApplyAction::ChartRelease {
                release, ..
            } => release.clone(),
        };
        self.rendered.lock().expect("renderer mutex").push(path.clone());
        self.sets
            .get(&path)
            .cloned()
            .ok_or(RenderError::SourceMissing(path))
    }
}

/// Builds a namespaced resource object with a single label.
pub fn labeled_object(kind: &str, name: &str, namespace: &str, label: (&str, &str)) -> ResourceObject {
    let mut labels = BTreeMap::new();
    labels.insert(label.0.to_string(), label.1.to_string());
    ResourceObject {
        kind: kind.to_string(),
        name: name.to_string(),
        namespace: Some(namespace.into()),
        labels,
        manifest: json!({ "kind": kind, "name": name }),
        source_text: format!("kind: {kind}\nname: {name}\n"),
    }
}

/// Builds a cluster-scoped namespace object.
pub fn namespace_object(name: &str) -> ResourceObject {
    ResourceObject {
        kind: "Namespace".to_string(),
        name: name.to_string(),
        namespace: None,
        labels: BTreeMap::new(),
        manifest: json!({ "kind": "Namespace", "name": name }),
        source_text: format!("kind: Namespace\nname: {name}\n"),
    }
}

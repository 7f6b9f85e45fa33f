// homeport-checks/tests/common/mod.rs
// ============================================================================
// Module: Check Test Fixtures
// Description: Shared fixtures for check runner tests.
// ============================================================================
//! ## Overview
//! Deterministic clock and object seeding helpers shared across the check
//! test suite.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use homeport_core::Clock;
use homeport_core::InMemoryCluster;
use homeport_core::ObjectState;
use homeport_core::Timestamp;
use serde_json::json;

/// Deterministic clock stamping logical timestamps.
pub struct FakeClock {
    /// Logical timestamp counter.
    logical: Mutex<u64>,
}

impl FakeClock {
    /// Creates a fake clock at time zero.
    pub fn new() -> Self {
        Self {
            logical: Mutex::new(0),
        }
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Timestamp {
        let mut logical = self.logical.lock().expect("fake clock mutex");
        *logical += 1;
        Timestamp::Logical(*logical)
    }

    fn monotonic(&self) -> Duration {
        Duration::ZERO
    }

    fn sleep(&self, _duration: Duration) {}
}

/// Seeds an object with a phase, readiness, and a single label.
pub fn seed_labeled(
    cluster: &InMemoryCluster,
    kind: &str,
    name: &str,
    namespace: &str,
    label: (&str, &str),
    phase: &str,
    ready: bool,
) {
    let mut labels = BTreeMap::new();
    labels.insert(label.0.to_string(), label.1.to_string());
    cluster
        .seed_object(
            ObjectState {
                kind: kind.to_string(),
                name: name.to_string(),
                namespace: Some(namespace.into()),
                phase: Some(phase.to_string()),
                ready,
                labels,
            },
            json!({ "kind": kind, "name": name }),
        )
        .expect("seed object");
}

// homeport-core/src/model/condition.rs
// ============================================================================
// Module: Homeport Readiness Conditions
// Description: Polled readiness conditions gating phase progression.
// Purpose: Describe what a readiness gate observes and how long it waits.
// Dependencies: serde, crate::model::identifiers
// ============================================================================

//! ## Overview
//! A readiness condition pairs a cluster target with a predicate and explicit
//! wait parameters. Conditions are idempotent to re-evaluate and never mutate
//! cluster state; the readiness gate polls them until satisfied or timed out.
//! Timeout and poll interval are explicit, injectable values so tests can run
//! with short deterministic windows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::model::identifiers::NamespaceId;

// ============================================================================
// SECTION: Label Selector
// ============================================================================

/// Label selector matching cluster objects by exact label values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSelector(BTreeMap<String, String>);

impl LabelSelector {
    /// Creates a selector from label key/value pairs.
    #[must_use]
    pub const fn new(labels: BTreeMap<String, String>) -> Self {
        Self(labels)
    }

    /// Creates a selector matching a single label.
    #[must_use]
    pub fn single(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut labels = BTreeMap::new();
        labels.insert(key.into(), value.into());
        Self(labels)
    }

    /// Returns true when every selector label is present with the same value.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.0.iter().all(|(key, value)| labels.get(key) == Some(value))
    }

    /// Returns true when the selector has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{key}={value}")?;
            first = false;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Condition Target
// ============================================================================

/// Cluster locator observed by a readiness condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionTarget {
    /// Objects matching a label selector within a namespace.
    Selector {
        /// Namespace scoping the selection.
        namespace: NamespaceId,
        /// Label selector applied to the listing.
        selector: LabelSelector,
    },
    /// A namespace known by name.
    Namespace {
        /// Namespace expected to exist.
        namespace: NamespaceId,
    },
    /// A single named object.
    Object {
        /// Namespace containing the object, if namespaced.
        namespace: Option<NamespaceId>,
        /// Object kind.
        kind: String,
        /// Object name.
        name: String,
    },
}

impl fmt::Display for ConditionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector {
                namespace,
                selector,
            } => write!(f, "selector {selector} in {namespace}"),
            Self::Namespace {
                namespace,
            } => write!(f, "namespace {namespace}"),
            Self::Object {
                namespace,
                kind,
                name,
            } => match namespace {
                Some(namespace) => write!(f, "{kind}/{name} in {namespace}"),
                None => write!(f, "{kind}/{name}"),
            },
        }
    }
}

// ============================================================================
// SECTION: Ready Predicate
// ============================================================================

/// Predicate evaluated against the observed target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadyPredicate {
    /// All matched objects report a ready condition.
    AllReady,
    /// The target exists.
    Exists,
    /// At least `minimum` objects match the selector.
    MinimumCount {
        /// Minimum number of matching objects.
        minimum: usize,
    },
}

impl fmt::Display for ReadyPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllReady => write!(f, "all ready"),
            Self::Exists => write!(f, "exists"),
            Self::MinimumCount {
                minimum,
            } => write!(f, "at least {minimum} present"),
        }
    }
}

// ============================================================================
// SECTION: Readiness Condition
// ============================================================================

/// Polled readiness condition with explicit wait parameters.
///
/// # Invariants
/// - Re-evaluation is idempotent; observation never mutates cluster state.
/// - `poll_interval_ms` never exceeds `timeout_ms` in a validated plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessCondition {
    /// Cluster locator observed by this condition.
    pub target: ConditionTarget,
    /// Predicate that must hold for the condition to be satisfied.
    pub predicate: ReadyPredicate,
    /// Maximum wait duration in milliseconds.
    pub timeout_ms: u64,
    /// Fixed interval between observations in milliseconds.
    pub poll_interval_ms: u64,
}

impl ReadinessCondition {
    /// Returns the maximum wait duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the interval between observations.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns a one-line description used in logs and failure causes.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({})", self.target, self.predicate)
    }

    /// Returns true when the predicate is applicable to the target.
    ///
    /// Selector targets support readiness and count predicates; namespace and
    /// object targets support only existence.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        matches!(
            (&self.target, &self.predicate),
            (
                ConditionTarget::Selector {
                    ..
                },
                ReadyPredicate::AllReady
                    | ReadyPredicate::MinimumCount {
                        ..
                    },
            ) | (
                ConditionTarget::Namespace {
                    ..
                } | ConditionTarget::Object {
                    ..
                },
                ReadyPredicate::Exists,
            )
        )
    }
}

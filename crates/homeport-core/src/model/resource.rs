// homeport-core/src/model/resource.rs
// ============================================================================
// Module: Homeport Resource Sets
// Description: Rendered declarative resource sets and apply outcomes.
// Purpose: Carry renderer output to the applier and record per-object results.
// Dependencies: serde, serde_json, crate::model::identifiers
// ============================================================================

//! ## Overview
//! A resource set is the rendered, concrete form of one apply action: an
//! ordered list of declarative objects ready for submission to the cluster.
//! Apply outcomes are recorded per object; aggregate counts are derived at
//! read time rather than stored redundantly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::model::identifiers::NamespaceId;

// ============================================================================
// SECTION: Resource Objects
// ============================================================================

/// One rendered declarative object ready for cluster submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceObject {
    /// Object kind.
    pub kind: String,
    /// Object name.
    pub name: String,
    /// Namespace containing the object, if namespaced.
    pub namespace: Option<NamespaceId>,
    /// Object labels.
    pub labels: BTreeMap<String, String>,
    /// Structured manifest content.
    pub manifest: Value,
    /// Raw source text of the rendered document, retained for policy scans.
    pub source_text: String,
}

impl ResourceObject {
    /// Returns a `kind/name` display form used in logs and reports.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}/{} ({namespace})", self.kind, self.name),
            None => format!("{}/{}", self.kind, self.name),
        }
    }
}

/// Ordered set of rendered resource objects for one apply action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Rendered objects in application order.
    pub objects: Vec<ResourceObject>,
}

impl ResourceSet {
    /// Creates a resource set from rendered objects.
    #[must_use]
    pub const fn new(objects: Vec<ResourceObject>) -> Self {
        Self {
            objects,
        }
    }

    /// Returns the number of objects in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true when the set contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

// ============================================================================
// SECTION: Apply Outcomes
// ============================================================================

/// Per-object apply disposition under idempotent declarative semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyDisposition {
    /// Object was absent and has been created.
    Created,
    /// Object existed with different content and has been patched.
    Patched,
    /// Object existed with identical content; nothing was submitted.
    Unchanged,
}

/// Apply outcome recorded for one submitted object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedObject {
    /// Object kind.
    pub kind: String,
    /// Object name.
    pub name: String,
    /// Apply disposition reported by the cluster.
    pub disposition: ApplyDisposition,
}

/// Apply report for one action, listing per-object dispositions.
///
/// Aggregate counts are derived from the disposition list at read time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Per-object apply outcomes in submission order.
    pub objects: Vec<AppliedObject>,
}

impl ApplyReport {
    /// Returns the number of objects created or patched.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| {
                matches!(object.disposition, ApplyDisposition::Created | ApplyDisposition::Patched)
            })
            .count()
    }

    /// Returns the number of objects left unchanged.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| object.disposition == ApplyDisposition::Unchanged)
            .count()
    }
}

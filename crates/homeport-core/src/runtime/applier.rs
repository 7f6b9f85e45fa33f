// homeport-core/src/runtime/applier.rs
// ============================================================================
// Module: Homeport Resource Applier
// Description: Render-then-apply execution for one phase action.
// Purpose: Submit declarative resource sets idempotently and report outcomes.
// Dependencies: crate::{model, interfaces}
// ============================================================================

//! ## Overview
//! The resource applier turns one apply action into a rendered resource set
//! and submits each object through the cluster interface. Idempotence comes
//! from the cluster's declarative apply semantics; the applier records the
//! per-object dispositions. A render failure is distinguished from an apply
//! failure: with nothing submitted there is nothing to converge against, so
//! render failures are fatal to their phase regardless of failure policy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::interfaces::ClusterApi;
use crate::interfaces::ClusterError;
use crate::interfaces::RenderError;
use crate::interfaces::ResourceRenderer;
use crate::model::identifiers::EnvironmentId;
use crate::model::plan::ApplyAction;
use crate::model::resource::AppliedObject;
use crate::model::resource::ApplyReport;

// ============================================================================
// SECTION: Action Failures
// ============================================================================

/// Failure of one apply action.
#[derive(Debug, Error)]
pub enum ActionFailure {
    /// Resource-set composition failed; always fatal to the phase.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The cluster rejected a resource; fatal only under the fatal policy.
    #[error("apply failed: {0}")]
    Apply(ClusterError),
}

// ============================================================================
// SECTION: Resource Applier
// ============================================================================

/// Applies rendered resource sets through the cluster interface.
pub struct ResourceApplier<'a, R, C> {
    /// Resource-set renderer.
    renderer: &'a R,
    /// Cluster interface receiving submissions.
    cluster: &'a C,
}

impl<'a, R, C> ResourceApplier<'a, R, C>
where
    R: ResourceRenderer,
    C: ClusterApi,
{
    /// Creates an applier over the given renderer and cluster.
    #[must_use]
    pub const fn new(renderer: &'a R, cluster: &'a C) -> Self {
        Self {
            renderer,
            cluster,
        }
    }

    /// Renders one action and applies every object in the resource set.
    ///
    /// Objects are submitted in set order; the first cluster rejection fails
    /// the action. Re-applying an unchanged set reports every object as
    /// unchanged and converges to identical cluster state.
    ///
    /// # Errors
    ///
    /// Returns [`ActionFailure::Render`] when composition fails and
    /// [`ActionFailure::Apply`] when the cluster rejects a resource.
    pub fn apply_action(
        &self,
        action: &ApplyAction,
        environment: &EnvironmentId,
    ) -> Result<ApplyReport, ActionFailure> {
        let resource_set = self.renderer.render(action, environment)?;

        let mut objects = Vec::with_capacity(resource_set.len());
        for object in &resource_set.objects {
            let disposition =
                self.cluster.apply_object(object).map_err(ActionFailure::Apply)?;
            objects.push(AppliedObject {
                kind: object.kind.clone(),
                name: object.name.clone(),
                disposition,
            });
        }

        Ok(ApplyReport {
            objects,
        })
    }
}

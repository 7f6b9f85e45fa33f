// homeport-cluster/src/lib.rs
// ============================================================================
// Module: Homeport Cluster Library
// Description: Concrete cluster adapter and resource-set renderers.
// Purpose: Back the core capability interfaces with kubectl, YAML, and helm.
// Dependencies: homeport-core, serde_json, serde_yaml
// ============================================================================

//! ## Overview
//! This crate backs the core capability interfaces with thin adapters over
//! existing systems: a `kubectl`-based cluster interface that only consumes
//! structured JSON output, a YAML manifest renderer with environment overlay
//! resolution, and a `helm template` renderer for chart releases. The
//! adapters contain no orchestration logic of their own.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod kubectl;
pub mod render;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use kubectl::KubectlCluster;
pub use kubectl::KubectlConfig;
pub use render::FileRenderer;
pub use render::HelmRenderer;
pub use render::PlanRenderer;

// homeport-core/src/lib.rs
// ============================================================================
// Module: Homeport Core Library
// Description: Public API surface for the Homeport deployment core.
// Purpose: Expose model types, capability interfaces, and runtime helpers.
// Dependencies: crate::{model, interfaces, runtime, runlog}
// ============================================================================

//! ## Overview
//! Homeport core provides the deployment orchestration and validation engine
//! for a multi-service homelab platform. It is cluster-agnostic and integrates
//! with the container-orchestration control plane through explicit capability
//! interfaces rather than embedding a specific client.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod interfaces;
pub mod model;
pub mod runlog;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use interfaces::CancelToken;
pub use interfaces::Clock;
pub use interfaces::ClusterApi;
pub use interfaces::ClusterError;
pub use interfaces::ObjectState;
pub use interfaces::RenderError;
pub use interfaces::ResourceRenderer;
pub use interfaces::SystemClock;
pub use model::*;
pub use runlog::JsonRunLog;
pub use runlog::NullRunLog;
pub use runlog::RunEvent;
pub use runlog::RunLogError;
pub use runlog::RunLogSink;
pub use runtime::ActionFailure;
pub use runtime::CheckRunner;
pub use runtime::InMemoryCluster;
pub use runtime::Orchestrator;
pub use runtime::OrchestratorError;
pub use runtime::ReadinessGate;
pub use runtime::ResourceApplier;
pub use runtime::Validator;

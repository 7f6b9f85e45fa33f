// homeport-checks/src/lib.rs
// ============================================================================
// Module: Homeport Checks Library
// Description: Typed health-check runners for the validation engine.
// Purpose: Provide the built-in check variants evaluated by the validator.
// Dependencies: homeport-core, reqwest, url
// ============================================================================

//! ## Overview
//! Homeport checks implement the built-in health-check variants: object
//! existence, lifecycle phase matching, count thresholds, external
//! reachability, and content policy scanning. Every check is read-only and
//! independent; each evaluates against structured cluster reads rather than
//! scraping textual command output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod content_policy;
pub mod count;
pub mod existence;
pub mod phase;
pub mod reachability;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use content_policy::ContentPolicyCheck;
pub use content_policy::PolicySource;
pub use count::CountThresholdCheck;
pub use existence::ExistenceCheck;
pub use existence::ExistenceTarget;
pub use phase::PhaseMatchCheck;
pub use reachability::ReachabilityCheck;
pub use reachability::ReachabilityConfig;
pub use reachability::ReachabilityError;

// homeport-core/src/model/time.rs
// ============================================================================
// Module: Homeport Time Model
// Description: Canonical timestamp representation for run and check records.
// Purpose: Provide deterministic, replayable time values across Homeport records.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Homeport embeds explicit time values in run and check records to keep
//! replay deterministic. The core engine never reads wall-clock time
//! directly; a [`crate::interfaces::Clock`] supplies timestamps, and tests
//! inject a stepping fake clock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Canonical timestamp used in Homeport run logs and check records.
///
/// # Invariants
/// - Values are supplied by a clock implementation; the core never reads
///   wall-clock time directly.
/// - No validation is performed; monotonicity is a clock responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Monotonic logical time value used by deterministic tests.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as unix milliseconds when available.
    #[must_use]
    pub const fn as_unix_millis(&self) -> Option<i64> {
        match self {
            Self::UnixMillis(value) => Some(*value),
            Self::Logical(_) => None,
        }
    }

    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }
}

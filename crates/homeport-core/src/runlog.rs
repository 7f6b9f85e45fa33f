// homeport-core/src/runlog.rs
// ============================================================================
// Module: Homeport Run Log
// Description: Append-only run log sink for orchestration events.
// Purpose: Persist structured progress records without external log stacks.
// Dependencies: serde, serde_json, std
// ============================================================================

//! ## Overview
//! The run log is an append-only stream of structured JSON lines recording
//! orchestration progress: run and phase starts, action outcomes, gate
//! resolutions, and terminal run states. Logging is best-effort from the
//! orchestrator's point of view; a log write failure never interrupts a run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::model::identifiers::EnvironmentId;
use crate::model::identifiers::PhaseId;
use crate::model::run::PhaseStatus;
use crate::model::run::RunStatus;
use crate::model::time::Timestamp;

// ============================================================================
// SECTION: Run Events
// ============================================================================

/// Structured run log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// Orchestration run started.
    RunStarted {
        /// Target environment.
        environment: EnvironmentId,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Phase started applying.
    PhaseStarted {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Action applied a resource set.
    ActionApplied {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Action description.
        action: String,
        /// Number of created or patched objects.
        applied: usize,
        /// Number of unchanged objects.
        unchanged: usize,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Action failed to render or apply.
    ActionFailed {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Action description.
        action: String,
        /// Failure cause.
        cause: String,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Gate was satisfied.
    GateSatisfied {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Gate description.
        gate: String,
        /// Elapsed wait in milliseconds.
        elapsed_ms: u64,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Gate timed out without a satisfying observation.
    GateTimedOut {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Gate description.
        gate: String,
        /// Last observation before the timeout.
        last_observation: String,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Phase reached a terminal state.
    PhaseCompleted {
        /// Phase identifier.
        phase_id: PhaseId,
        /// Terminal phase status.
        status: PhaseStatus,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Run was aborted by a fatal failure or cancellation.
    RunAborted {
        /// Phase where the run stopped.
        phase_id: PhaseId,
        /// One-line abort cause.
        cause: String,
        /// Event timestamp.
        at: Timestamp,
    },
    /// Run reached a terminal state.
    RunCompleted {
        /// Terminal run status.
        status: RunStatus,
        /// Number of accumulated warnings.
        warnings: usize,
        /// Event timestamp.
        at: Timestamp,
    },
}

// ============================================================================
// SECTION: Run Log Sink
// ============================================================================

/// Run log errors.
#[derive(Debug, Error)]
pub enum RunLogError {
    /// Writing a log record failed.
    #[error("run log write failed: {0}")]
    WriteFailed(String),
}

/// Append-only sink receiving run log events.
pub trait RunLogSink: Send + Sync {
    /// Appends one event to the log.
    ///
    /// # Errors
    ///
    /// Returns [`RunLogError`] when the record cannot be written.
    fn record(&self, event: &RunEvent) -> Result<(), RunLogError>;
}

impl<T: RunLogSink + ?Sized> RunLogSink for &T {
    fn record(&self, event: &RunEvent) -> Result<(), RunLogError> {
        (**self).record(event)
    }
}

/// JSON-line run log over any writer.
pub struct JsonRunLog<W: Write + Send> {
    /// Output writer for log records.
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonRunLog<W> {
    /// Creates a run log writing JSON lines to the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the log and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`RunLogError`] when the writer mutex is poisoned.
    pub fn into_inner(self) -> Result<W, RunLogError> {
        self.writer
            .into_inner()
            .map_err(|_| RunLogError::WriteFailed("run log mutex poisoned".to_string()))
    }
}

impl<W: Write + Send> RunLogSink for JsonRunLog<W> {
    fn record(&self, event: &RunEvent) -> Result<(), RunLogError> {
        let mut guard = self
            .writer
            .lock()
            .map_err(|_| RunLogError::WriteFailed("run log mutex poisoned".to_string()))?;
        serde_json::to_writer(&mut *guard, event)
            .map_err(|err| RunLogError::WriteFailed(err.to_string()))?;
        guard.write_all(b"\n").map_err(|err| RunLogError::WriteFailed(err.to_string()))?;
        guard.flush().map_err(|err| RunLogError::WriteFailed(err.to_string()))
    }
}

/// Run log sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRunLog;

impl RunLogSink for NullRunLog {
    fn record(&self, _event: &RunEvent) -> Result<(), RunLogError> {
        Ok(())
    }
}

// homeport-cli/src/outcome.rs
// ============================================================================
// Module: CLI Outcome Mapping
// Description: Exit codes and summaries for runs and validation reports.
// Purpose: Map structured outcomes to process exit codes and operator text.
// Dependencies: homeport-core
// ============================================================================

//! ## Overview
//! Exit codes distinguish the three failure families so calling pipelines can
//! gate on them: an aborted orchestration run, an unhealthy validation
//! report, and a completed run that accumulated warnings. Summaries name the
//! failing phase, action or gate, and every failed check so a failure is
//! diagnosable from the output alone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use homeport_core::OrchestrationRun;
use homeport_core::OverallStatus;
use homeport_core::PhaseStatus;
use homeport_core::RunStatus;
use homeport_core::ValidationReport;

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

/// Full success.
pub const EXIT_SUCCESS: u8 = 0;
/// Usage or configuration error.
pub const EXIT_USAGE: u8 = 2;
/// Orchestration run aborted on a fatal failure.
pub const EXIT_ABORTED: u8 = 10;
/// Validation reported an unhealthy estate.
pub const EXIT_UNHEALTHY: u8 = 11;
/// Run completed but accumulated warnings.
pub const EXIT_WARNINGS: u8 = 12;

/// Maps an orchestration run to its exit code.
#[must_use]
pub fn run_exit_code(run: &OrchestrationRun) -> u8 {
    match run.status {
        RunStatus::Aborted => EXIT_ABORTED,
        RunStatus::Completed | RunStatus::InProgress => {
            if run.has_warnings() {
                EXIT_WARNINGS
            } else {
                EXIT_SUCCESS
            }
        }
    }
}

/// Maps a validation report to its exit code.
#[must_use]
pub fn report_exit_code(report: &ValidationReport) -> u8 {
    match report.overall_status() {
        OverallStatus::Unhealthy => EXIT_UNHEALTHY,
        OverallStatus::Healthy => EXIT_SUCCESS,
    }
}

/// Maps a deploy-then-validate invocation to its exit code.
///
/// An aborted run dominates, then an unhealthy report, then warnings.
#[must_use]
pub fn combined_exit_code(run: &OrchestrationRun, report: Option<&ValidationReport>) -> u8 {
    let run_code = run_exit_code(run);
    if run_code == EXIT_ABORTED {
        return EXIT_ABORTED;
    }
    if let Some(report) = report
        && report_exit_code(report) == EXIT_UNHEALTHY
    {
        return EXIT_UNHEALTHY;
    }
    run_code
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

/// Renders the operator-facing run summary lines.
#[must_use]
pub fn run_summary(run: &OrchestrationRun) -> Vec<String> {
    let mut lines = Vec::new();
    for phase in &run.phases {
        lines.push(format!("phase {}: {}", phase.phase_id, phase_status_label(phase.status)));
    }
    match run.status {
        RunStatus::Aborted => {
            let phase = run
                .aborted_at
                .as_ref()
                .map_or_else(|| "unknown phase".to_string(), ToString::to_string);
            let cause = run
                .abort_cause
                .as_deref()
                .unwrap_or("no cause recorded");
            lines.push(format!("run aborted at {phase}: {cause}"));
        }
        RunStatus::Completed | RunStatus::InProgress => {
            lines.push(format!(
                "run completed with {} warning(s)",
                run.warnings.len()
            ));
        }
    }
    for warning in &run.warnings {
        lines.push(format!("warning [{}]: {}", warning.phase_id, warning.cause));
    }
    lines
}

/// Renders the operator-facing validation summary lines.
#[must_use]
pub fn report_summary(report: &ValidationReport) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "checks: {} passed, {} failed ({} advisory)",
        report.pass_count(),
        report.fail_count(),
        report.warn_count()
    ));
    for failure in report.failures() {
        lines.push(format!("failed [{}]: {}", failure.check_name, failure.message));
    }
    let status = match report.overall_status() {
        OverallStatus::Healthy => "healthy",
        OverallStatus::Unhealthy => "unhealthy",
    };
    lines.push(format!("estate is {status}"));
    lines
}

/// Returns the display label for a phase status.
#[must_use]
pub const fn phase_status_label(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Pending => "pending",
        PhaseStatus::Applying => "applying",
        PhaseStatus::Gating => "gating",
        PhaseStatus::Succeeded => "succeeded",
        PhaseStatus::CompletedWithWarnings => "completed with warnings",
        PhaseStatus::Failed => "failed",
    }
}

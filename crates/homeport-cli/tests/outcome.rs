// homeport-cli/tests/outcome.rs
// ============================================================================
// Module: CLI Outcome Tests
// Description: Tests for exit-code mapping and summary rendering.
// ============================================================================
//! ## Overview
//! Validates the exit-code families and that summaries name failing phases
//! and checks.

#![allow(clippy::unwrap_used, reason = "Tests use unwrap on deterministic fixtures.")]
#![allow(clippy::expect_used, reason = "Tests use expect for explicit failure messages.")]

use homeport_cli::EXIT_ABORTED;
use homeport_cli::EXIT_SUCCESS;
use homeport_cli::EXIT_UNHEALTHY;
use homeport_cli::EXIT_WARNINGS;
use homeport_cli::combined_exit_code;
use homeport_cli::report_exit_code;
use homeport_cli::report_summary;
use homeport_cli::run_exit_code;
use homeport_cli::run_summary;
use homeport_core::CheckOutcome;
use homeport_core::CheckResult;
use homeport_core::CheckSeverity;
use homeport_core::OrchestrationRun;
use homeport_core::RunStatus;
use homeport_core::RunWarning;
use homeport_core::Timestamp;
use homeport_core::ValidationReport;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a run with the given status and warnings.
fn run(status: RunStatus, warnings: Vec<RunWarning>) -> OrchestrationRun {
    OrchestrationRun {
        environment: "prod".into(),
        status,
        phases: Vec::new(),
        aborted_at: (status == RunStatus::Aborted).then(|| "services".into()),
        abort_cause: (status == RunStatus::Aborted)
            .then(|| "gate selector app=web timed out".to_string()),
        warnings,
        started_at: Timestamp::Logical(1),
        finished_at: Some(Timestamp::Logical(2)),
    }
}

/// Builds a report with one result.
fn report(severity: CheckSeverity, outcome: CheckOutcome) -> ValidationReport {
    ValidationReport {
        results: vec![CheckResult {
            check_name: "namespace-foo".into(),
            severity,
            outcome,
            message: "namespace foo is absent".to_string(),
            observed_at: Timestamp::Logical(1),
        }],
        generated_at: Timestamp::Logical(2),
    }
}

// ============================================================================
// SECTION: Exit Codes
// ============================================================================

#[test]
fn test_exit_code_families() {
    assert_eq!(run_exit_code(&run(RunStatus::Completed, Vec::new())), EXIT_SUCCESS);
    assert_eq!(run_exit_code(&run(RunStatus::Aborted, Vec::new())), EXIT_ABORTED);
    let warned = run(
        RunStatus::Completed,
        vec![RunWarning {
            phase_id: "media".into(),
            cause: "gate timed out".to_string(),
        }],
    );
    assert_eq!(run_exit_code(&warned), EXIT_WARNINGS);

    assert_eq!(
        report_exit_code(&report(CheckSeverity::Critical, CheckOutcome::Fail)),
        EXIT_UNHEALTHY
    );
    assert_eq!(
        report_exit_code(&report(CheckSeverity::Warn, CheckOutcome::Fail)),
        EXIT_SUCCESS
    );
}

#[test]
fn test_abort_dominates_combined_exit() {
    let aborted = run(RunStatus::Aborted, Vec::new());
    let unhealthy = report(CheckSeverity::Critical, CheckOutcome::Fail);
    assert_eq!(combined_exit_code(&aborted, Some(&unhealthy)), EXIT_ABORTED);

    let completed = run(RunStatus::Completed, Vec::new());
    assert_eq!(combined_exit_code(&completed, Some(&unhealthy)), EXIT_UNHEALTHY);
    assert_eq!(combined_exit_code(&completed, None), EXIT_SUCCESS);
}

// ============================================================================
// SECTION: Summaries
// ============================================================================

#[test]
fn test_abort_summary_names_the_phase_and_cause() {
    let lines = run_summary(&run(RunStatus::Aborted, Vec::new()));
    let joined = lines.join("\n");
    assert!(joined.contains("run aborted at services"));
    assert!(joined.contains("timed out"));
}

#[test]
fn test_report_summary_enumerates_failures() {
    let lines = report_summary(&report(CheckSeverity::Critical, CheckOutcome::Fail));
    let joined = lines.join("\n");
    assert!(joined.contains("failed [namespace-foo]"));
    assert!(joined.contains("estate is unhealthy"));
}

// homeport-cli/src/main.rs
// ============================================================================
// Module: Homeport CLI Entry Point
// Description: Command dispatcher for deployment and validation runs.
// Purpose: Provide the single operator entry point with distinct exit codes.
// Dependencies: clap, homeport-core, homeport-cluster, homeport-checks, tokio
// ============================================================================

//! ## Overview
//! The `homeport` binary deploys and validates one environment of the
//! homelab estate. It wires the configured plan and check suite to the
//! kubectl-backed cluster adapter (or the in-memory cluster for dry runs),
//! emits progress to stdout and structured events to the run log, and maps
//! outcomes to distinct exit codes so calling pipelines can gate on them.
//! An operator interrupt cancels polling promptly without rolling back
//! already-applied resources.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use homeport_checks::ContentPolicyCheck;
use homeport_checks::CountThresholdCheck;
use homeport_checks::ExistenceCheck;
use homeport_checks::ExistenceTarget;
use homeport_checks::PhaseMatchCheck;
use homeport_checks::PolicySource;
use homeport_checks::ReachabilityCheck;
use homeport_checks::ReachabilityConfig;
use homeport_checks::ReachabilityError;
use homeport_cli::EXIT_SUCCESS;
use homeport_cli::EXIT_USAGE;
use homeport_cli::combined_exit_code;
use homeport_cli::phase_status_label;
use homeport_cli::report_exit_code;
use homeport_cli::report_summary;
use homeport_cli::run_exit_code;
use homeport_cli::run_summary;
use homeport_cluster::FileRenderer;
use homeport_cluster::HelmRenderer;
use homeport_cluster::KubectlCluster;
use homeport_cluster::KubectlConfig;
use homeport_cluster::PlanRenderer;
use homeport_config::CheckConfig;
use homeport_config::HomeportConfig;
use homeport_config::load_config;
use homeport_core::CancelToken;
use homeport_core::ClusterApi;
use homeport_core::EnvironmentId;
use homeport_core::InMemoryCluster;
use homeport_core::JsonRunLog;
use homeport_core::LabelSelector;
use homeport_core::Orchestrator;
use homeport_core::OrchestrationRun;
use homeport_core::OrchestratorError;
use homeport_core::RenderError;
use homeport_core::ResourceRenderer;
use homeport_core::RunEvent;
use homeport_core::RunLogError;
use homeport_core::RunLogSink;
use homeport_core::SystemClock;
use homeport_core::ValidationReport;
use homeport_core::Validator;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "homeport", version, about = "Deploy and validate the homelab estate")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the deployment plan for an environment.
    Deploy(TargetArgs),
    /// Run the validation check suite for an environment.
    Validate(TargetArgs),
    /// Deploy, then validate.
    Run(TargetArgs),
    /// Parse and validate the configuration, then print a summary.
    Plan(PlanArgs),
}

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable progress and summary lines.
    Text,
    /// Structured JSON for machine consumption.
    Json,
}

/// Arguments shared by deploy, validate, and run.
#[derive(Args, Debug)]
struct TargetArgs {
    /// Target environment identifier.
    #[arg(long = "env")]
    environment: String,
    /// Configuration file path.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Use the in-memory cluster instead of kubectl.
    #[arg(long)]
    dry_run: bool,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Arguments for the plan subcommand.
#[derive(Args, Debug)]
struct PlanArgs {
    /// Configuration file path.
    #[arg(long)]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI execution errors.
#[derive(Debug, Error)]
enum CliError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] homeport_config::ConfigError),
    /// Deployment plan was rejected by the orchestrator.
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
    /// Check construction failed.
    #[error(transparent)]
    Check(#[from] ReachabilityError),
    /// Content policy sources failed to render.
    #[error("content policy render failed: {0}")]
    PolicyRender(#[from] RenderError),
    /// Run log could not be opened.
    #[error("run log open failed for {0}: {1}")]
    RunLog(String, String),
    /// Writing output failed.
    #[error("output write failed: {0}")]
    Output(String),
    /// Background task failed.
    #[error("worker task failed: {0}")]
    Task(String),
}

/// CLI result alias.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Binary entry point.
#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            let message = err.to_string();
            if write_stderr_line(&message).is_err() {
                // Nothing left to report to.
            }
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<u8> {
    let cli = Cli::parse();

    let cancel = CancelToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    match cli.command {
        Commands::Deploy(args) => {
            spawn_command(move || command_deploy(&args, &cancel)).await
        }
        Commands::Validate(args) => {
            spawn_command(move || command_validate(&args, &cancel)).await
        }
        Commands::Run(args) => spawn_command(move || command_run(&args, &cancel)).await,
        Commands::Plan(args) => command_plan(&args),
    }
}

/// Runs a blocking command on the worker pool.
async fn spawn_command<F>(command: F) -> CliResult<u8>
where
    F: FnOnce() -> CliResult<u8> + Send + 'static,
{
    tokio::task::spawn_blocking(command)
        .await
        .map_err(|err| CliError::Task(err.to_string()))?
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the deployment plan for one environment.
fn command_deploy(args: &TargetArgs, cancel: &CancelToken) -> CliResult<u8> {
    let config = load_config(args.config.as_deref())?;
    let environment = EnvironmentId::new(args.environment.clone());
    let progress = args.output == OutputFormat::Text;
    let run = if args.dry_run {
        deploy(&config, &environment, InMemoryCluster::new(), cancel, progress)?
    } else {
        deploy(&config, &environment, kubectl_cluster(&config), cancel, progress)?
    };

    emit_run(args, &run)?;
    Ok(run_exit_code(&run))
}

/// Runs the validation check suite for one environment.
fn command_validate(args: &TargetArgs, _cancel: &CancelToken) -> CliResult<u8> {
    let config = load_config(args.config.as_deref())?;
    let environment = EnvironmentId::new(args.environment.clone());
    let report = if args.dry_run {
        validate(&config, &environment, InMemoryCluster::new())?
    } else {
        validate(&config, &environment, kubectl_cluster(&config))?
    };

    emit_report(args, &report)?;
    Ok(report_exit_code(&report))
}

/// Deploys, then validates, one environment.
fn command_run(args: &TargetArgs, cancel: &CancelToken) -> CliResult<u8> {
    let config = load_config(args.config.as_deref())?;
    let environment = EnvironmentId::new(args.environment.clone());

    let progress = args.output == OutputFormat::Text;
    let (run, report) = if args.dry_run {
        run_both(&config, &environment, InMemoryCluster::new(), cancel, progress)?
    } else {
        run_both(&config, &environment, kubectl_cluster(&config), cancel, progress)?
    };

    match args.output {
        OutputFormat::Json => {
            let combined = serde_json::json!({
                "run": run,
                "report": report,
            });
            let rendered = serde_json::to_string_pretty(&combined)
                .map_err(|err| CliError::Output(err.to_string()))?;
            write_stdout_line(&rendered)?;
        }
        OutputFormat::Text => {
            for line in run_summary(&run) {
                write_stdout_line(&line)?;
            }
            if let Some(report) = &report {
                for line in report_summary(report) {
                    write_stdout_line(&line)?;
                }
            }
        }
    }
    Ok(combined_exit_code(&run, report.as_ref()))
}

/// Parses and validates configuration, then prints a plan summary.
fn command_plan(args: &PlanArgs) -> CliResult<u8> {
    let config = load_config(args.config.as_deref())?;
    let plan = config.deploy_plan()?;

    for phase in &plan.phases {
        write_stdout_line(&format!(
            "phase {}: {} action(s), {} gate(s)",
            phase.phase_id,
            phase.actions.len(),
            phase.gates.len()
        ))?;
    }
    write_stdout_line(&format!("{} check(s) configured", config.checks.len()))?;
    Ok(EXIT_SUCCESS)
}

// ============================================================================
// SECTION: Execution Wiring
// ============================================================================

/// Builds the kubectl-backed cluster adapter from configuration.
fn kubectl_cluster(config: &HomeportConfig) -> KubectlCluster {
    KubectlCluster::new(KubectlConfig {
        binary: config.defaults.kubectl_binary.clone(),
        context: None,
    })
}

/// Builds the composite plan renderer from configuration.
fn plan_renderer(config: &HomeportConfig) -> PlanRenderer {
    let base_dir = PathBuf::from(&config.defaults.manifest_dir);
    PlanRenderer::new(
        FileRenderer::new(base_dir.clone()),
        HelmRenderer::new(config.defaults.helm_binary.clone(), base_dir),
    )
}

/// Executes the deployment plan against the given cluster.
fn deploy<C>(
    config: &HomeportConfig,
    environment: &EnvironmentId,
    cluster: C,
    cancel: &CancelToken,
    progress: bool,
) -> CliResult<OrchestrationRun>
where
    C: ClusterApi + Clone + 'static,
{
    let plan = config.deploy_plan()?;
    let log_path = &config.defaults.run_log_path;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|err| CliError::RunLog(log_path.clone(), err.to_string()))?;
    let log = ProgressLog {
        file: JsonRunLog::new(log_file),
        progress,
    };

    let orchestrator =
        Orchestrator::new(plan_renderer(config), cluster, SystemClock::new(), log);
    Ok(orchestrator.run(&plan, environment, cancel)?)
}

/// Runs the configured check suite against the given cluster.
fn validate<C>(
    config: &HomeportConfig,
    environment: &EnvironmentId,
    cluster: C,
) -> CliResult<ValidationReport>
where
    C: ClusterApi + Clone + 'static,
{
    let cluster: Arc<dyn ClusterApi> = Arc::new(cluster);
    let mut validator = Validator::new(config.defaults.check_workers);
    for check in &config.checks {
        validator.register(build_check(config, environment, check, &cluster)?);
    }
    let clock = SystemClock::new();
    Ok(validator.validate(&clock))
}

/// Deploys, then validates unless the run aborted.
fn run_both<C>(
    config: &HomeportConfig,
    environment: &EnvironmentId,
    cluster: C,
    cancel: &CancelToken,
    progress: bool,
) -> CliResult<(OrchestrationRun, Option<ValidationReport>)>
where
    C: ClusterApi + Clone + 'static,
{
    let run = deploy(config, environment, cluster.clone(), cancel, progress)?;
    if run.status == homeport_core::RunStatus::Aborted {
        return Ok((run, None));
    }
    let report = validate(config, environment, cluster)?;
    Ok((run, Some(report)))
}

/// Builds one configured check runner.
fn build_check(
    config: &HomeportConfig,
    environment: &EnvironmentId,
    check: &CheckConfig,
    cluster: &Arc<dyn ClusterApi>,
) -> CliResult<Box<dyn homeport_core::CheckRunner>> {
    let runner: Box<dyn homeport_core::CheckRunner> = match check {
        CheckConfig::NamespaceExists {
            id,
            namespace,
            severity,
        } => Box::new(ExistenceCheck::new(
            id.as_str().into(),
            severity.into_severity(),
            Arc::clone(cluster),
            ExistenceTarget::Namespace {
                namespace: namespace.as_str().into(),
            },
        )),
        CheckConfig::ObjectExists {
            id,
            namespace,
            object_kind,
            name,
            severity,
        } => Box::new(ExistenceCheck::new(
            id.as_str().into(),
            severity.into_severity(),
            Arc::clone(cluster),
            ExistenceTarget::Object {
                namespace: namespace.as_deref().map(Into::into),
                kind: object_kind.clone(),
                name: name.clone(),
            },
        )),
        CheckConfig::PhaseMatch {
            id,
            namespace,
            selector,
            expected_phase,
            severity,
        } => Box::new(PhaseMatchCheck::new(
            id.as_str().into(),
            severity.into_severity(),
            Arc::clone(cluster),
            namespace.as_str().into(),
            LabelSelector::new(selector.clone()),
            expected_phase.clone(),
        )),
        CheckConfig::CountThreshold {
            id,
            namespace,
            selector,
            minimum,
        } => Box::new(CountThresholdCheck::new(
            id.as_str().into(),
            Arc::clone(cluster),
            namespace.as_str().into(),
            LabelSelector::new(selector.clone()),
            *minimum,
        )),
        CheckConfig::Reachability {
            id,
            url,
            expected_status,
        } => {
            let http = ReachabilityConfig {
                timeout_ms: config.defaults.http_timeout_ms,
                ..ReachabilityConfig::default()
            };
            Box::new(ReachabilityCheck::new(
                id.as_str().into(),
                url,
                *expected_status,
                &http,
            )?)
        }
        CheckConfig::ContentPolicy {
            id,
            patterns,
        } => Box::new(ContentPolicyCheck::new(
            id.as_str().into(),
            patterns.clone(),
            policy_sources(config, environment)?,
        )),
    };
    Ok(runner)
}

/// Renders every plan action into policy scan sources.
fn policy_sources(
    config: &HomeportConfig,
    environment: &EnvironmentId,
) -> CliResult<Vec<PolicySource>> {
    let renderer = plan_renderer(config);
    let plan = config.deploy_plan()?;
    let mut sources = Vec::new();
    for phase in &plan.phases {
        for action in &phase.actions {
            let set = renderer.render(action, environment)?;
            sources.extend(PolicySource::from_resource_set(&set));
        }
    }
    Ok(sources)
}

// ============================================================================
// SECTION: Progress Log
// ============================================================================

/// Run log sink appending JSON events and mirroring progress to stdout.
struct ProgressLog {
    /// Append-only JSON-line file log.
    file: JsonRunLog<std::fs::File>,
    /// Whether to mirror progress lines to stdout.
    progress: bool,
}

impl RunLogSink for ProgressLog {
    fn record(&self, event: &RunEvent) -> Result<(), RunLogError> {
        self.file.record(event)?;
        if self.progress
            && let Some(line) = progress_line(event)
        {
            write_stdout_line(&line)
                .map_err(|err| RunLogError::WriteFailed(err.to_string()))?;
        }
        Ok(())
    }
}

/// Renders one run event as a stdout progress line.
fn progress_line(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::RunStarted {
            environment, ..
        } => Some(format!("deploying environment {environment}")),
        RunEvent::PhaseStarted {
            phase_id, ..
        } => Some(format!("phase {phase_id}: starting")),
        RunEvent::ActionApplied {
            phase_id,
            action,
            applied,
            unchanged,
            ..
        } => Some(format!(
            "phase {phase_id}: {action} ({applied} applied, {unchanged} unchanged)"
        )),
        RunEvent::ActionFailed {
            phase_id,
            cause,
            ..
        } => Some(format!("phase {phase_id}: {cause}")),
        RunEvent::GateSatisfied {
            phase_id,
            gate,
            elapsed_ms,
            ..
        } => Some(format!("phase {phase_id}: gate {gate} satisfied after {elapsed_ms}ms")),
        RunEvent::GateTimedOut {
            phase_id,
            gate,
            last_observation,
            ..
        } => Some(format!(
            "phase {phase_id}: gate {gate} timed out (last observation: {last_observation})"
        )),
        RunEvent::PhaseCompleted {
            phase_id,
            status,
            ..
        } => Some(format!("phase {phase_id}: {}", phase_status_label(*status))),
        RunEvent::RunAborted {
            phase_id,
            cause,
            ..
        } => Some(format!("run aborted at {phase_id}: {cause}")),
        RunEvent::RunCompleted {
            ..
        } => None,
    }
}

// ============================================================================
// SECTION: Output Emission
// ============================================================================

/// Emits a run in the requested format.
fn emit_run(args: &TargetArgs, run: &OrchestrationRun) -> CliResult<()> {
    match args.output {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(run)
                .map_err(|err| CliError::Output(err.to_string()))?;
            write_stdout_line(&rendered)
        }
        OutputFormat::Text => {
            for line in run_summary(run) {
                write_stdout_line(&line)?;
            }
            Ok(())
        }
    }
}

/// Emits a validation report in the requested format.
fn emit_report(args: &TargetArgs, report: &ValidationReport) -> CliResult<()> {
    match args.output {
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(report)
                .map_err(|err| CliError::Output(err.to_string()))?;
            write_stdout_line(&rendered)
        }
        OutputFormat::Text => {
            for line in report_summary(report) {
                write_stdout_line(&line)?;
            }
            Ok(())
        }
    }
}

/// Writes one line to stdout.
fn write_stdout_line(line: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}").map_err(|err| CliError::Output(err.to_string()))
}

/// Writes one line to stderr.
fn write_stderr_line(line: &str) -> Result<(), std::io::Error> {
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{line}")
}

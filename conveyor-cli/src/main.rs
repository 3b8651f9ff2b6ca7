//! devopsctl - developer CLI for the conveyor pipeline.
//!
//! Provides a unified command interface for running the delivery pipeline
//! locally and consistently: one subcommand per stage plus `all` for the
//! full sequence. Each command exits with the stage's (or run's) exit code
//! so shell callers can branch on success.

mod pipeline;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use conveyor::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "devopsctl")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Developer CLI for the delivery pipeline", long_about = None)]
struct Cli {
    /// Emit the run report as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Directory containing the pipeline's stage scripts
    #[arg(long, default_value = "scripts", global = true)]
    scripts_dir: PathBuf,

    /// Repository directory for VCS probes
    #[arg(long, default_value = ".", global = true)]
    repo_dir: PathBuf,

    /// Path to the project version file
    #[arg(long, default_value = "VERSION", global = true)]
    version_file: PathBuf,

    /// Branch allowed to publish artifacts
    #[arg(long, default_value = "main", global = true)]
    release_branch: String,

    /// Per-stage timeout in seconds
    #[arg(long, default_value_t = 1800, global = true)]
    stage_timeout: u64,

    /// Archive the JSON run report to this path, whatever the outcome
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run linters
    Lint,
    /// Execute unit tests
    Test,
    /// Build the package
    Build,
    /// Build the container image
    Docker,
    /// Publish artifacts (release branch only)
    Publish,
    /// Run the complete pipeline
    All,
    /// Show version information
    Version,
    /// Bump the project version file
    Bump {
        /// Which component to bump; patch when omitted
        #[arg(value_enum)]
        kind: Option<BumpArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BumpArg {
    Major,
    Minor,
    Patch,
}

impl From<BumpArg> for BumpKind {
    fn from(arg: BumpArg) -> Self {
        match arg {
            BumpArg::Major => Self::Major,
            BumpArg::Minor => Self::Minor,
            BumpArg::Patch => Self::Patch,
        }
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let code = match dispatch(&cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            1
        }
    };

    std::process::exit(code);
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();
}

async fn dispatch(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Commands::Lint => run_pipeline(cli, Some("lint")).await,
        Commands::Test => run_pipeline(cli, Some("test")).await,
        Commands::Build => run_pipeline(cli, Some("build")).await,
        Commands::Docker => run_pipeline(cli, Some("docker")).await,
        Commands::Publish => run_pipeline(cli, Some("publish")).await,
        Commands::All => run_pipeline(cli, None).await,
        Commands::Version => show_version(cli).await,
        Commands::Bump { kind } => {
            let kind = kind.map_or(BumpKind::Patch, Into::into);
            bump_version_file(&cli.version_file, kind).await
        }
    }
}

async fn run_pipeline(cli: &Cli, only: Option<&str>) -> Result<i32> {
    let registry = pipeline::build_registry(&cli.scripts_dir, &cli.release_branch)?;
    let registry = match only {
        Some(name) => registry
            .select(name)
            .with_context(|| format!("unknown stage '{name}'"))?,
        None => registry,
    };

    let ctx = probes::collect(&cli.repo_dir, &cli.version_file)
        .await
        .context("failed to collect run context")?;

    let mut runner = PipelineRunner::new(pipeline::PIPELINE_NAME, registry)
        .with_default_timeout(Duration::from_secs(cli.stage_timeout))
        .with_event_sink(Arc::new(LoggingEventSink::info()));

    if let Some(path) = &cli.report {
        let path = path.clone();
        runner = runner.with_post_run(move |report| pipeline::archive_report(&path, report));
    }

    let token = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel("interrupted by user");
        }
    });

    let report = runner.run(ctx).await?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(exit_code_for(&report))
}

fn exit_code_for(report: &RunReport) -> i32 {
    if report.overall.is_success() {
        0
    } else {
        report
            .first_failure()
            .and_then(|result| result.exit_code)
            .unwrap_or(1)
    }
}

async fn show_version(cli: &Cli) -> Result<i32> {
    println!("devopsctl {}", env!("CARGO_PKG_VERSION"));
    if let Ok(project) = probes::read_version_file(&cli.version_file).await {
        println!("project version {project}");
    }
    Ok(0)
}

async fn bump_version_file(path: &Path, kind: BumpKind) -> Result<i32> {
    let current = probes::read_version_file(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let next = current.bump(kind);

    tokio::fs::write(path, format!("{next}\n"))
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("{current} -> {next}");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report_with(results: Vec<StageResult>) -> RunReport {
        let ctx = RunContext::new(Version::new(0, 1, 0), "a11dfd9", "main");
        RunReport::new(pipeline::PIPELINE_NAME, ctx, results, 1.0)
    }

    #[test]
    fn test_exit_code_zero_on_success() {
        let report = report_with(vec![StageResult::passed("lint", Utc::now(), 1.0)]);
        assert_eq!(exit_code_for(&report), 0);
    }

    #[test]
    fn test_exit_code_propagates_stage_code() {
        let report = report_with(vec![StageResult::failed("test", Utc::now(), 1.0, 2)]);
        assert_eq!(exit_code_for(&report), 2);
    }

    #[test]
    fn test_exit_code_defaults_to_one_without_stage_code() {
        let report = report_with(vec![StageResult::timed_out("docker", Utc::now(), 1.0)]);
        assert_eq!(exit_code_for(&report), 1);
    }

    #[tokio::test]
    async fn test_bump_rewrites_version_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VERSION");
        tokio::fs::write(&path, "0.1.0\n").await.unwrap();

        let code = bump_version_file(&path, BumpKind::Minor).await.unwrap();
        assert_eq!(code, 0);

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents.trim(), "0.2.0");
    }
}

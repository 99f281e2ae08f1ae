//! Gauntlet - Containerized Quality Check Orchestrator
//!
//! Runs linters, type checkers, and security scanners against a source
//! tree inside disposable containers and reduces their verdicts to a
//! single exit code.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use gauntlet::check::CheckRegistry;
use gauntlet::config::PipelineConfig;
use gauntlet::engine::{ExecutionEngine, ExecutionMode};
use gauntlet::error::{GauntletError, Result};
use gauntlet::provider::DockerProvider;
use gauntlet::report::{ReportFormat, Reporter};

#[derive(Parser)]
#[command(name = "gauntlet")]
#[command(version = "0.1.0")]
#[command(about = "Run quality checks in isolated containers", long_about = None)]
struct Cli {
    /// Source directory to check
    #[arg(default_value = ".")]
    source: PathBuf,

    /// Verbose output (include captured tool output in the report)
    #[arg(short, long)]
    verbose: bool,

    /// Run checks one at a time instead of concurrently
    #[arg(long)]
    sequential: bool,

    /// Keep running remaining checks after the first failure
    #[arg(long)]
    no_fail_fast: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    format: ReportFormat,

    /// List known checks and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "gauntlet=debug,info"
    } else {
        "gauntlet=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let code = match run(cli).await {
        Ok(passed) => {
            if passed {
                0
            } else {
                1
            }
        }
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            err.exit_code()
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<bool> {
    let registry = CheckRegistry::builtin();

    if cli.list {
        list_checks(&registry);
        return Ok(true);
    }

    if !cli.source.exists() {
        return Err(GauntletError::config_with_path(
            "source directory does not exist",
            cli.source,
        ));
    }
    let source = cli.source.canonicalize().unwrap_or(cli.source);

    // Environment first, then CLI flags on top.
    let mut config = PipelineConfig::from_env();
    if cli.verbose {
        config.options.verbose = true;
    }
    if cli.sequential {
        config.options.parallel = false;
    }
    if cli.no_fail_fast {
        config.options.fail_fast = false;
    }

    let checks = registry.resolve(&config)?;
    if checks.is_empty() {
        println!("{}", "No checks enabled; nothing to do.".yellow());
        return Ok(true);
    }

    // Only probe for a container runtime once we know work exists.
    let provider = Arc::new(DockerProvider::new()?);

    let mode = if config.options.parallel {
        ExecutionMode::Parallel
    } else {
        ExecutionMode::Sequential
    };
    debug!(source = %source.display(), count = checks.len(), ?mode, "Starting run");

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = ExecutionEngine::new(provider, &source).with_events(tx);

    // Ctrl-C stops scheduling; in-flight containers finish on their own.
    let cancel = engine.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted; finishing in-flight checks...".yellow());
            cancel.cancel();
        }
    });

    let progress = match cli.format {
        ReportFormat::Table => Some(progress_bar(checks.len() as u64)),
        ReportFormat::Json => None,
    };
    let progress_task = progress.clone().map(|bar| {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                bar.set_message(event.name);
                bar.inc(1);
            }
        })
    });

    let outcome = engine
        .execute(checks, mode, config.options.fail_fast)
        .await?;

    if let Some(task) = progress_task {
        task.abort();
    }
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    Reporter::new(config.options.verbose).print(&outcome, cli.format)?;
    Ok(outcome.passed)
}

fn list_checks(registry: &CheckRegistry) {
    println!("{}", "Known checks:".bold());
    for name in registry.names() {
        println!("  {}", name.cyan());
    }
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

#![warn(missing_docs)]
//! HarpBench CLI Library
//!
//! This module provides the CLI infrastructure for device test binaries.
//! Use `harpbench::run()` (or `harpbench_cli::run()`) in your main function to
//! get the full harpbench CLI experience with your own suites.
//!
//! # Example
//!
//! ```ignore
//! use harpbench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     harpbench_cli::run(|config| {
//!         Ok(Runner::new().with_suite(MySuite::new(&config.suites)))
//!     })
//! }
//! ```

mod config;
mod executor;

pub use config::*;
pub use executor::{
    CampaignOutcome, device_name, execute_campaign, format_human_output, format_result_details,
    format_result_line,
};

use anyhow::Context;
use clap::Parser;
use harpbench_core::{CancellationToken, Runner};
use harpbench_report::{OutputFormat, Report, generate_json_report};
use indicatif::ProgressBar;
use std::io::Write;
use std::path::{Path, PathBuf};

/// HarpBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "harpbench")]
#[command(author, version, about = "HarpBench - test and benchmark Harp devices")]
pub struct Cli {
    /// Serial port of the device (falls back to [device] port in harpbench.toml)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Write a JSON report to this path
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Show detailed results for each test
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format: human, json
    #[arg(long)]
    pub format: Option<String>,

    /// List suites and test cases without running them
    #[arg(long)]
    pub list: bool,

    /// Write a default harpbench.toml in the current directory and exit
    #[arg(long)]
    pub init: bool,
}

/// Run the HarpBench CLI with the given suite factory.
/// This is the main entry point for test binaries.
///
/// The factory receives the discovered configuration and returns the runner
/// to execute.
pub fn run<F>(build_runner: F) -> anyhow::Result<()>
where
    F: FnOnce(&HarpConfig) -> anyhow::Result<Runner>,
{
    let cli = Cli::parse();
    run_with_cli(cli, build_runner)
}

/// Run the HarpBench CLI with pre-parsed arguments.
pub fn run_with_cli<F>(cli: Cli, build_runner: F) -> anyhow::Result<()>
where
    F: FnOnce(&HarpConfig) -> anyhow::Result<Runner>,
{
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("harpbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("harpbench=info")
            .init();
    }

    if cli.init {
        let dir = std::env::current_dir().context("failed to read current directory")?;
        let path = HarpConfig::init(&dir)?;
        println!("Created {}", path.display());
        return Ok(());
    }

    // Discover harpbench.toml configuration (CLI flags override)
    let config = HarpConfig::discover().unwrap_or_default();
    let runner = build_runner(&config).context("failed to build test runner")?;

    if cli.list {
        list_suites(&runner);
        return Ok(());
    }

    // Parse output format
    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()
        .unwrap_or(OutputFormat::Human);

    let port = cli
        .port
        .clone()
        .or_else(|| config.device.port.clone())
        .context("no device port given: pass --port or set [device] port in harpbench.toml")?;

    let report_path = cli
        .report
        .clone()
        .or_else(|| config.output.report_path.as_ref().map(PathBuf::from));

    run_campaign(&cli, &runner, &port, format, report_path)
}

fn list_suites(runner: &Runner) {
    println!("HarpBench Plan:");
    for suite in runner.suites() {
        println!("├── suite: {} ({})", suite.name(), suite.description());
        for case in suite.cases() {
            if case.description.is_empty() {
                println!("│   ├── {}", case.name);
            } else {
                println!("│   ├── {} - {}", case.name, case.description);
            }
        }
    }
    println!("{} tests found.", runner.test_count());
}

fn run_campaign(
    cli: &Cli,
    runner: &Runner,
    port: &str,
    format: OutputFormat,
    report_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create async runtime")?;

    writeln!(notice_stream(format), "Running tests on {}...\n", port)?;

    let outcome = rt.block_on(async {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, stopping after the current test");
                    cancel.cancel();
                }
            }
        });

        let outcome = execute_campaign(runner, port, &cancel, ProgressBar::new(0)).await;
        watcher.abort();
        outcome
    });

    let report = &outcome.report;
    write_output(
        report,
        format,
        cli.verbose,
        report_path.as_deref(),
        &mut std::io::stdout(),
        &mut notice_stream(format),
    )?;

    // Exit with appropriate code
    if !outcome.is_success() {
        if outcome.cancelled {
            eprintln!("\nTest run cancelled before all tests completed");
        }
        let summary = report.summary();
        if !summary.is_success() {
            eprintln!("\n{} failed, {} error(s)", summary.failed, summary.errors);
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Status lines go to stderr when stdout carries a JSON document
fn notice_stream(format: OutputFormat) -> Box<dyn Write> {
    match format {
        OutputFormat::Json => Box::new(std::io::stderr()),
        OutputFormat::Human => Box::new(std::io::stdout()),
    }
}

/// Render `report` to `out` and optionally save it as JSON
fn write_output(
    report: &Report,
    format: OutputFormat,
    verbose: bool,
    report_path: Option<&Path>,
    out: &mut impl Write,
    notices: &mut impl Write,
) -> anyhow::Result<()> {
    let output = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Human => format_human_output(report, verbose),
    };
    write!(out, "{}", output)?;

    if let Some(path) = report_path {
        let json = generate_json_report(report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report file {}", path.display()))?;
        writeln!(notices, "Report written to: {}", path.display())?;
    }
    Ok(())
}

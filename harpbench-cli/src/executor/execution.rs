//! Campaign Execution
//!
//! Drives the runner's result stream to completion against one device,
//! reporting progress as each case finishes and collecting a [`Report`].
//!
//! ## Data Flow
//!
//! ```text
//! Runner (suites in order)
//!        │  run_all(endpoint, cancel)
//!        ▼
//! (suite, MethodResult) stream ──► progress line + bar tick
//!        │
//!        ▼
//!   ReportBuilder ──► Report
//! ```

use super::formatting::format_result_line;
use futures::StreamExt;
use harpbench_core::{CancellationToken, Cancelled, Runner};
use harpbench_report::{Report, ReportBuilder};
use indicatif::{ProgressBar, ProgressStyle};

/// Report for the device behind `endpoint`
pub fn device_name(endpoint: &str) -> String {
    format!("Harp Device ({})", endpoint)
}

/// Everything a finished (or interrupted) campaign produced
#[derive(Debug)]
pub struct CampaignOutcome {
    /// Results recorded before the run ended
    pub report: Report,
    /// The run stopped early because the token was cancelled
    pub cancelled: bool,
}

impl CampaignOutcome {
    /// The run finished and nothing failed or errored
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.report.summary().is_success()
    }
}

/// Run every suite against `endpoint`, reporting progress as results arrive
pub async fn execute_campaign(
    runner: &Runner,
    endpoint: &str,
    cancel: &CancellationToken,
    progress: ProgressBar,
) -> CampaignOutcome {
    progress.set_length(runner.test_count() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    progress.set_message("Running tests...");

    let mut builder = ReportBuilder::new(device_name(endpoint));
    let mut cancelled = false;

    let mut results = runner.run_all(endpoint, cancel);
    while let Some(item) = results.next().await {
        match item {
            Ok((suite, result)) => {
                progress.println(format_result_line(suite.name(), &result));
                builder.record(suite.name(), suite.description(), result);
                progress.inc(1);
            }
            Err(Cancelled) => {
                cancelled = true;
                progress.println("Test run cancelled; remaining tests skipped.");
            }
        }
    }

    if cancelled {
        progress.abandon_with_message("Cancelled");
    } else {
        progress.finish_with_message("Complete");
    }

    CampaignOutcome {
        report: builder.finish(),
        cancelled,
    }
}

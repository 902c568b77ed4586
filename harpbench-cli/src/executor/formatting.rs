//! Output Formatting
//!
//! Human-readable output formatting for campaign reports.
//!
//! Generates terminal-friendly output with:
//! - One progress line per completed test case
//! - Per-suite detail sections with status icons (✓/✗/💥/⊘)
//! - Summary statistics for numeric benchmarks

use harpbench_core::{Status, TestResult};
use harpbench_report::{MethodResult, Report};

fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Passed => "✓",
        Status::Failed => "✗",
        Status::Error => "💥",
        Status::Skipped => "⊘",
    }
}

/// Live progress line for a completed case: `Suite::case .... Status`
pub fn format_result_line(suite: &str, result: &MethodResult) -> String {
    format!("{}::{} .... {}", suite, result.name, result.result.status())
}

/// Detail cell for a result: statistics, error kind, or the measured value
pub fn format_result_details(result: &TestResult) -> String {
    match result {
        TestResult::Benchmark(benchmark) => {
            let summary = benchmark.summary();
            format!(
                "Mean: {:.4}\nMedian: {:.4}\nStdDev: {:.4}\nMin: {:.4}\nMax: {:.4}\nPercentiles: 99th={:.4}, 01th={:.4}",
                summary.mean(),
                summary.median(),
                summary.std_dev(),
                summary.min(),
                summary.max(),
                summary.percentile_99(),
                summary.percentile_01()
            )
        }
        TestResult::Error(error) => error.kind().to_string(),
        TestResult::Value(value) => value.value().to_string(),
    }
}

/// Format a report for human-readable terminal display
///
/// The summary is always printed; `verbose` adds a detail section per suite.
pub fn format_human_output(report: &Report, verbose: bool) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!("HarpBench Results: {}\n", report.device_name));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "Run date: {}\n\n",
        report.run_date.format("%Y-%m-%d %H:%M:%S")
    ));

    if verbose {
        for suite in &report.suites {
            output.push_str(&format!("Suite: {}\n", suite.name));
            if !suite.description.is_empty() {
                output.push_str(&format!("{}\n", suite.description));
            }
            output.push_str(&"-".repeat(60));
            output.push('\n');

            for test in &suite.results {
                let status = test.result.status();
                output.push_str(&format!("  {} {} ({})\n", status_icon(status), test.name, status));
                if !test.description.is_empty() {
                    output.push_str(&format!("      {}\n", test.description));
                }
                for line in format_result_details(&test.result).lines() {
                    output.push_str(&format!("      {}\n", line));
                }
                if let Some(message) = test.result.message() {
                    output.push_str(&format!("      message: {}\n", message));
                }
                output.push('\n');
            }
        }
    }

    let summary = report.summary();
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  Total: {}  Passed: {}  Failed: {}  Errors: {}  Skipped: {}\n",
        summary.total, summary.passed, summary.failed, summary.errors, summary.skipped
    ));

    output
}

//! Report Data Structures

use chrono::{DateTime, Local};
use harpbench_core::{MethodResult, Status};
use serde::{Deserialize, Serialize};

/// Results of one suite, in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteResult {
    /// Suite name
    pub name: String,
    /// Suite description
    pub description: String,
    /// Case results in the order they completed
    pub results: Vec<MethodResult>,
}

/// Complete campaign report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Device under test, e.g. `Harp Device (COM3)`
    pub device_name: String,
    /// Local time the run started
    pub run_date: DateTime<Local>,
    /// Suites in first-seen order
    pub suites: Vec<SuiteResult>,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            device_name: "Unknown Device".to_string(),
            run_date: Local::now(),
            suites: Vec::new(),
        }
    }
}

impl Report {
    /// Empty report for `device_name`, dated now
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            ..Self::default()
        }
    }

    /// Every case result across all suites
    pub fn results(&self) -> impl Iterator<Item = &MethodResult> {
        self.suites.iter().flat_map(|s| s.results.iter())
    }

    /// Count outcomes by status
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary::default();
        for result in self.results() {
            summary.total += 1;
            match result.result.status() {
                Status::Passed => summary.passed += 1,
                Status::Failed => summary.failed += 1,
                Status::Skipped => summary.skipped += 1,
                Status::Error => summary.errors += 1,
            }
        }
        summary
    }
}

/// Outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Results recorded
    pub total: usize,
    /// Passed results
    pub passed: usize,
    /// Failed results
    pub failed: usize,
    /// Skipped results
    pub skipped: usize,
    /// Error results
    pub errors: usize,
}

impl ReportSummary {
    /// No result failed or errored
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

/// Accumulates streamed results into a [`Report`].
///
/// Results are grouped under the suite name they were recorded with; a suite
/// entry is created the first time its name is seen.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    /// Start a report for `device_name`
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            report: Report::new(device_name),
        }
    }

    /// Override the run date
    pub fn run_date(mut self, run_date: DateTime<Local>) -> Self {
        self.report.run_date = run_date;
        self
    }

    /// Append `result` under `suite_name`
    pub fn record(&mut self, suite_name: &str, suite_description: &str, result: MethodResult) {
        let index = match self.report.suites.iter().position(|s| s.name == suite_name) {
            Some(index) => index,
            None => {
                self.report.suites.push(SuiteResult {
                    name: suite_name.to_string(),
                    description: suite_description.to_string(),
                    results: Vec::new(),
                });
                self.report.suites.len() - 1
            }
        };
        self.report.suites[index].results.push(result);
    }

    /// Report assembled so far
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Finish and hand out the report
    pub fn finish(self) -> Report {
        self.report
    }
}

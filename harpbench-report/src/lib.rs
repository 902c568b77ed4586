#![warn(missing_docs)]
//! HarpBench Report - Campaign Results
//!
//! Collects streamed case results into a report tree and renders it:
//! - JSON (machine-readable, round-trips through serde)
//! - Human-readable terminal output lives in the CLI

mod json;
mod report;

pub use harpbench_core::MethodResult;
pub use json::{generate_json_report, parse_json_report};
pub use report::{Report, ReportBuilder, ReportSummary, SuiteResult};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable terminal output
    #[default]
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

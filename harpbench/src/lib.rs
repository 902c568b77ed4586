#![warn(missing_docs)]
//! # HarpBench
//!
//! Test and benchmark harness for Harp devices.
//!
//! HarpBench discovers test cases grouped into suites, runs them one at a
//! time against a single live device, and streams each outcome as it
//! completes:
//! - **Compile-time discovery**: `#[suite]` collects `#[harp_test]` methods in declaration order
//! - **Rich outcomes**: value, assertion, benchmark and error results with pass/fail status
//! - **Statistics**: mean, median, standard deviation and interpolated percentiles
//! - **Fault containment**: errors and panics in a test become `Error` results; the run continues
//! - **Cooperative cancellation**: checked between test cases
//!
//! ## Quick Start
//!
//! ```ignore
//! use harpbench::prelude::*;
//! use std::sync::Arc;
//!
//! struct RegisterTests {
//!     connector: Arc<dyn Connector>,
//! }
//!
//! #[suite(description = "Register Tests")]
//! impl RegisterTests {
//!     #[harp_test(description = "WhoAmI holds a valid id")]
//!     async fn check_who_am_i(&self, port: &str) -> anyhow::Result<ValueResult<u16>> {
//!         let mut device = self.connector.open(port).await?;
//!         let id = device.read_who_am_i().await?;
//!         Ok(ValueResult::evaluate(id, |v| *v > 0 && *v < 9999))
//!     }
//! }
//! ```
//!
//! ## Running
//!
//! ```ignore
//! fn main() -> anyhow::Result<()> {
//!     harpbench::run(Arc::new(SerialConnector::default()))
//! }
//! ```

extern crate self as harpbench;

pub mod suites;

// Re-export core types
pub use harpbench_core::{
    AssertionResult, BoxFuture, Cancelled, CancellationToken, CaseInfo, Connector, Device,
    DeviceError, ErrorResult, IntoTestResult, MethodResult, NumericBenchmarkResult, RunStream,
    Runner, RunnerError, Status, Suite, SuiteStream, TestCase, TestFn, TestResult, TestSuite,
    Value, ValueResult,
};

// Re-export macros
pub use harpbench_macros::{harp_test, suite};

// Re-export report types
pub use harpbench_report::{
    OutputFormat, Report, ReportBuilder, ReportSummary, SuiteResult, generate_json_report,
    parse_json_report,
};

// Re-export stats
pub use harpbench_stats::{BenchmarkSummary, StatsError};

// Re-export CLI configuration
pub use harpbench_cli::{
    Cli, DeviceConfig, HarpConfig, OutputConfig, RoundTripConfig, SuitesConfig, TimestampConfig,
};

pub use suites::{RoundTripSuite, TimestampSecondsSuite, WhoAmISuite, default_runner};

/// Internal re-exports for macro use
#[doc(hidden)]
pub mod internal {
    pub use anyhow;
    pub use futures::future::BoxFuture;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AssertionResult, BenchmarkSummary, Connector, Device, DeviceError, ErrorResult,
        NumericBenchmarkResult, Runner, Status, Suite, TestResult, TestSuite, ValueResult,
        harp_test, suite,
    };
}

/// Run the HarpBench CLI with the built-in suites.
///
/// Call this from your binary's `main()` with the connector that reaches
/// your hardware:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     harpbench::run(Arc::new(MyConnector::default()))
/// }
/// ```
pub fn run(connector: std::sync::Arc<dyn Connector>) -> anyhow::Result<()> {
    harpbench_cli::run(|config| default_runner(connector, &config.suites))
}

/// Run the HarpBench CLI with a custom runner factory
pub use harpbench_cli::run as run_with;

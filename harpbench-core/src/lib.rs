#![warn(missing_docs)]
//! HarpBench Core - Test Campaign Runtime
//!
//! This crate provides the pipeline that turns registered test cases into a
//! stream of outcomes:
//! - Result model (`Status`, `TestResult` and its variants)
//! - `TestSuite`/`Suite` for grouping test cases and running them in order
//! - `Runner` for composing suites into one cancellable campaign
//! - `Connector`/`Device` traits through which test cases reach hardware
//!
//! Execution is strictly sequential: every test case shares one physical
//! device, so at most one case is in flight across the whole runner.

mod device;
mod result;
mod runner;
mod suite;

pub use device::{Connector, Device, DeviceError};
pub use result::{
    AssertionResult, ErrorResult, IntoTestResult, NumericBenchmarkResult, Status, TestResult,
    Value, ValueResult,
};
pub use runner::{RunStream, Runner, RunnerError};
pub use suite::{
    Cancelled, CaseInfo, MethodResult, Suite, SuiteStream, TestCase, TestFn, TestSuite,
};

pub use futures::future::BoxFuture;
pub use harpbench_stats::{BenchmarkSummary, StatsError};
pub use tokio_util::sync::CancellationToken;

//! Result Model
//!
//! Every executed test case produces exactly one [`TestResult`]. Results are
//! snapshots: status and message are fixed at construction and nothing
//! mutates them afterwards.

use crate::device::DeviceError;
use harpbench_stats::{BenchmarkSummary, StatsError};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

/// Outcome of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Predicate held
    Passed,
    /// Predicate did not hold
    Failed,
    /// Not executed
    Skipped,
    /// The test body raised a fault
    Error,
}

impl Status {
    /// Map a predicate evaluation onto Passed/Failed
    pub fn from_evaluation(passed: bool) -> Self {
        if passed { Status::Passed } else { Status::Failed }
    }

    /// Whether this outcome should fail the campaign
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failed | Status::Error)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Passed => "Passed",
            Status::Failed => "Failed",
            Status::Skipped => "Skipped",
            Status::Error => "Error",
        };
        f.write_str(name)
    }
}

/// Scalar carried by a type-erased value result.
///
/// Serialized with its kind, e.g. `{"kind": "uint", "value": 1216}`, so the
/// variant survives a reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(#[serde(with = "harpbench_stats::non_finite")] f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Uint(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_value_from {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(value as $target)
                }
            }
        )*
    };
}

impl_value_from!(Int as i64: i8, i16, i32, i64, isize);
impl_value_from!(Uint as u64: u8, u16, u32, u64, usize);
impl_value_from!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

/// Result holding a typed value and a status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueResult<T> {
    value: T,
    status: Status,
    #[serde(default)]
    message: String,
}

impl<T> ValueResult<T> {
    /// Build a result with an explicit status
    pub fn new(value: T, status: Status, message: impl Into<String>) -> Self {
        Self {
            value,
            status,
            message: message.into(),
        }
    }

    /// Derive the status from `predicate`; the message stays empty
    pub fn evaluate(value: T, predicate: impl FnOnce(&T) -> bool) -> Self {
        let status = Status::from_evaluation(predicate(&value));
        Self::new(value, status, String::new())
    }

    /// Derive the status from `predicate` and build the message from the
    /// value and the predicate's verdict
    pub fn evaluate_with(
        value: T,
        predicate: impl FnOnce(&T) -> bool,
        message: impl FnOnce(&T, bool) -> String,
    ) -> Self {
        let passed = predicate(&value);
        let message = message(&value, passed);
        Self::new(value, Status::from_evaluation(passed), message)
    }

    /// Measured value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume the result, keeping the value
    pub fn into_value(self) -> T {
        self.value
    }

    /// Outcome
    pub fn status(&self) -> Status {
        self.status
    }

    /// Human-readable message, `None` when empty
    pub fn message(&self) -> Option<&str> {
        (!self.message.is_empty()).then_some(self.message.as_str())
    }

    /// Convert the value while keeping status and message
    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> ValueResult<U> {
        ValueResult {
            value: f(self.value),
            status: self.status,
            message: self.message,
        }
    }
}

/// Boolean assertion result
pub type AssertionResult = ValueResult<bool>;

impl ValueResult<bool> {
    /// `true` passes, `false` fails
    pub fn assertion(value: bool, message: impl Into<String>) -> Self {
        Self::new(value, Status::from_evaluation(value), message)
    }

    /// Like [`assertion`](Self::assertion), with the message chosen from the verdict
    pub fn assertion_with(value: bool, message: impl FnOnce(bool) -> String) -> Self {
        Self::evaluate_with(value, |v| *v, |v, _| message(*v))
    }
}

/// Fault raised while running a test case.
///
/// Carries the innermost cause only; the status is always [`Status::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResult {
    kind: String,
    message: String,
}

impl ErrorResult {
    /// Build from an explicit kind and message
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Unwrap an error chain down to its root cause
    pub fn from_error(error: &anyhow::Error) -> Self {
        let root = error.root_cause();
        Self::new(error_kind(root), root.to_string())
    }

    /// Record a panic payload from a test body
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self::new("panic", message)
    }

    /// Type name of the failure
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Failure message, `None` when empty
    pub fn message(&self) -> Option<&str> {
        (!self.message.is_empty()).then_some(self.message.as_str())
    }

    /// Always [`Status::Error`]
    pub fn status(&self) -> Status {
        Status::Error
    }
}

fn error_kind(root: &(dyn std::error::Error + 'static)) -> String {
    if let Some(device) = root.downcast_ref::<DeviceError>() {
        device.kind().to_string()
    } else if root.is::<StatsError>() {
        "OutOfRange".to_string()
    } else if let Some(io) = root.downcast_ref::<std::io::Error>() {
        format!("IoError({:?})", io.kind())
    } else {
        "Error".to_string()
    }
}

/// Value result over a numeric sample, with its statistical summary.
///
/// The sample lives inside the summary; `values()` is the sorted sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericBenchmarkResult {
    status: Status,
    #[serde(default)]
    message: String,
    summary: BenchmarkSummary,
}

impl NumericBenchmarkResult {
    /// Summarize `values` with an explicit status
    pub fn new(values: Vec<f64>, status: Status, message: impl Into<String>) -> Self {
        Self::from_summary(BenchmarkSummary::new(values), status, message)
    }

    /// Reuse an existing summary and its sample as-is
    pub fn from_summary(
        summary: BenchmarkSummary,
        status: Status,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message: message.into(),
            summary,
        }
    }

    /// Derive the status from `predicate`, evaluated in the caller's sample order
    pub fn evaluate(values: Vec<f64>, predicate: impl FnOnce(&[f64]) -> bool) -> Self {
        let status = Status::from_evaluation(predicate(&values));
        Self::new(values, status, String::new())
    }

    /// Like [`evaluate`](Self::evaluate), with a message built from the sample and verdict
    pub fn evaluate_with(
        values: Vec<f64>,
        predicate: impl FnOnce(&[f64]) -> bool,
        message: impl FnOnce(&[f64], bool) -> String,
    ) -> Self {
        let passed = predicate(&values);
        let message = message(&values, passed);
        Self::new(values, Status::from_evaluation(passed), message)
    }

    /// Sorted sample
    pub fn values(&self) -> &[f64] {
        self.summary.values()
    }

    /// Statistics over the sample
    pub fn summary(&self) -> &BenchmarkSummary {
        &self.summary
    }

    /// Outcome
    pub fn status(&self) -> Status {
        self.status
    }

    /// Human-readable message, `None` when empty
    pub fn message(&self) -> Option<&str> {
        (!self.message.is_empty()).then_some(self.message.as_str())
    }
}

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TestResult {
    /// Generic value or assertion result
    Value(ValueResult<Value>),
    /// Numeric benchmark with summary statistics
    Benchmark(NumericBenchmarkResult),
    /// Fault raised by the test body
    Error(ErrorResult),
}

impl TestResult {
    /// Outcome
    pub fn status(&self) -> Status {
        match self {
            TestResult::Value(r) => r.status(),
            TestResult::Benchmark(r) => r.status(),
            TestResult::Error(r) => r.status(),
        }
    }

    /// Human-readable message, `None` when empty
    pub fn message(&self) -> Option<&str> {
        match self {
            TestResult::Value(r) => r.message(),
            TestResult::Benchmark(r) => r.message(),
            TestResult::Error(r) => r.message(),
        }
    }

    /// Benchmark payload, if any
    pub fn as_benchmark(&self) -> Option<&NumericBenchmarkResult> {
        match self {
            TestResult::Benchmark(r) => Some(r),
            _ => None,
        }
    }

    /// Error payload, if any
    pub fn as_error(&self) -> Option<&ErrorResult> {
        match self {
            TestResult::Error(r) => Some(r),
            _ => None,
        }
    }
}

impl<T: Into<Value>> From<ValueResult<T>> for TestResult {
    fn from(result: ValueResult<T>) -> Self {
        TestResult::Value(result.map_value(Into::into))
    }
}

impl From<NumericBenchmarkResult> for TestResult {
    fn from(result: NumericBenchmarkResult) -> Self {
        TestResult::Benchmark(result)
    }
}

impl From<ErrorResult> for TestResult {
    fn from(result: ErrorResult) -> Self {
        TestResult::Error(result)
    }
}

/// Return types accepted from a test case body.
///
/// Implemented for every result variant, for `TestResult` itself, and for
/// `Result<R, E>` where the error converts into `anyhow::Error`. An `Err` is
/// turned into an [`ErrorResult`] by the suite, not here.
pub trait IntoTestResult {
    /// Normalize into the suite's fallible result type
    fn into_test_result(self) -> anyhow::Result<TestResult>;
}

impl IntoTestResult for TestResult {
    fn into_test_result(self) -> anyhow::Result<TestResult> {
        Ok(self)
    }
}

impl<T: Into<Value>> IntoTestResult for ValueResult<T> {
    fn into_test_result(self) -> anyhow::Result<TestResult> {
        Ok(self.into())
    }
}

impl IntoTestResult for NumericBenchmarkResult {
    fn into_test_result(self) -> anyhow::Result<TestResult> {
        Ok(self.into())
    }
}

impl IntoTestResult for ErrorResult {
    fn into_test_result(self) -> anyhow::Result<TestResult> {
        Ok(self.into())
    }
}

impl<R, E> IntoTestResult for Result<R, E>
where
    R: IntoTestResult,
    E: Into<anyhow::Error>,
{
    fn into_test_result(self) -> anyhow::Result<TestResult> {
        self.map_err(Into::into)?.into_test_result()
    }
}

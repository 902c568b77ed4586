//! Test Suites
//!
//! A suite is a type whose test cases were collected at compile time (by
//! `#[suite]` or a hand-written [`TestSuite`] impl). Running a suite invokes
//! each case exactly once, in declaration order, and yields one
//! [`MethodResult`] per case. Failures inside a case, whether returned as an
//! error or raised as a panic, are recorded as an [`ErrorResult`] and never
//! interrupt the remaining cases.

use crate::result::{ErrorResult, TestResult};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Type-erased body of a test case: borrows the suite and the device endpoint
pub type TestFn<S> = for<'a> fn(&'a S, &'a str) -> BoxFuture<'a, anyhow::Result<TestResult>>;

/// A registered test case
pub struct TestCase<S> {
    /// Method name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Case body
    pub run: TestFn<S>,
}

impl<S> Clone for TestCase<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for TestCase<S> {}

impl<S> fmt::Debug for TestCase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Raised in place of further results once a run is cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("test run cancelled")]
pub struct Cancelled;

/// Result of one test case, tagged with the case that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodResult {
    /// Method name
    pub name: String,
    /// Case description
    pub description: String,
    /// Outcome
    pub result: TestResult,
}

/// Name and description of a registered case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseInfo {
    /// Method name
    pub name: &'static str,
    /// Case description
    pub description: &'static str,
}

/// Lazy, ordered stream of case results
pub type SuiteStream<'a> = BoxStream<'a, Result<MethodResult, Cancelled>>;

/// Statically typed suite definition.
///
/// Usually generated by `#[suite]`.
pub trait TestSuite: Send + Sync + Sized + 'static {
    /// Human-readable description
    fn description(&self) -> &str;

    /// Registered cases in declaration order
    fn test_cases() -> Vec<TestCase<Self>>;

    /// Display name, the type's own name unless overridden
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }
}

/// Object-safe view of a suite used by the runner
pub trait Suite: Send + Sync {
    /// Display name
    fn name(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Number of registered cases
    fn test_count(&self) -> usize;

    /// Registered cases in declaration order
    fn cases(&self) -> Vec<CaseInfo>;

    /// Run every case against `endpoint`, one at a time.
    ///
    /// Cancellation is checked before each case starts. An in-flight case is
    /// always allowed to finish. The first case that observes the token
    /// yields `Err(Cancelled)` and ends the stream.
    fn run_all<'a>(&'a self, endpoint: &'a str, cancel: &'a CancellationToken)
    -> SuiteStream<'a>;
}

impl<S: TestSuite> Suite for S {
    fn name(&self) -> &str {
        TestSuite::name(self)
    }

    fn description(&self) -> &str {
        TestSuite::description(self)
    }

    fn test_count(&self) -> usize {
        S::test_cases().len()
    }

    fn cases(&self) -> Vec<CaseInfo> {
        S::test_cases()
            .into_iter()
            .map(|case| CaseInfo {
                name: case.name,
                description: case.description,
            })
            .collect()
    }

    fn run_all<'a>(
        &'a self,
        endpoint: &'a str,
        cancel: &'a CancellationToken,
    ) -> SuiteStream<'a> {
        let cases = S::test_cases().into_iter();
        stream::unfold(Some(cases), move |state| async move {
            let mut cases = state?;
            let case = cases.next()?;
            if cancel.is_cancelled() {
                info!(
                    suite = TestSuite::name(self),
                    next = case.name,
                    "cancellation observed, stopping suite"
                );
                return Some((Err(Cancelled), None));
            }
            let result = invoke(self, case, endpoint).await;
            Some((Ok(result), Some(cases)))
        })
        .boxed()
    }
}

async fn invoke<S: TestSuite>(suite: &S, case: TestCase<S>, endpoint: &str) -> MethodResult {
    let suite_name = TestSuite::name(suite);
    debug!(suite = suite_name, case = case.name, endpoint, "running test case");

    let outcome = AssertUnwindSafe(async { (case.run)(suite, endpoint).await })
        .catch_unwind()
        .await;

    let result = match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(error)) => {
            warn!(
                suite = suite_name,
                case = case.name,
                error = %format!("{error:#}"),
                "test case failed with error"
            );
            ErrorResult::from_error(&error).into()
        }
        Err(payload) => {
            let result = ErrorResult::from_panic(payload);
            warn!(
                suite = suite_name,
                case = case.name,
                panic = ?result.message(),
                "test case panicked"
            );
            result.into()
        }
    };

    debug!(suite = suite_name, case = case.name, status = %result.status(), "test case finished");
    MethodResult {
        name: case.name.to_string(),
        description: case.description.to_string(),
        result,
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

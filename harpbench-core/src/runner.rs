//! Test Runner
//!
//! Holds an ordered list of suites and flattens their result streams into a
//! single campaign. Suites run in insertion order and only one test case is
//! ever in flight.

use crate::suite::{Cancelled, MethodResult, Suite};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Runner misuse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunnerError {
    /// A required argument was absent
    #[error("invalid argument: {0} must not be null")]
    InvalidArgument(&'static str),
}

/// Flattened campaign stream: every result paired with the suite that produced it
pub type RunStream<'a> = BoxStream<'a, Result<(Arc<dyn Suite>, MethodResult), Cancelled>>;

/// Ordered collection of suites
#[derive(Default)]
pub struct Runner {
    suites: Vec<Arc<dyn Suite>>,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.suites.iter().map(|s| s.name()).collect();
        f.debug_struct("Runner").field("suites", &names).finish()
    }
}

impl Runner {
    /// Create an empty runner
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a suite. The same suite may be added more than once.
    pub fn add_suite(&mut self, suite: Option<Arc<dyn Suite>>) -> Result<(), RunnerError> {
        let suite = suite.ok_or(RunnerError::InvalidArgument("suite"))?;
        debug!(suite = suite.name(), cases = suite.test_count(), "suite added");
        self.push(suite);
        Ok(())
    }

    /// Append a suite that is known to be present
    pub fn push(&mut self, suite: Arc<dyn Suite>) {
        self.suites.push(suite);
    }

    /// Builder-style append
    pub fn with_suite(mut self, suite: impl Suite + 'static) -> Self {
        self.push(Arc::new(suite));
        self
    }

    /// Remove the first occurrence of `suite`, compared by identity
    pub fn remove(&mut self, suite: &Arc<dyn Suite>) -> bool {
        match self.suites.iter().position(|s| Arc::ptr_eq(s, suite)) {
            Some(index) => {
                self.suites.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove the first occurrence of `suite`, compared by identity.
    ///
    /// Returns whether anything was removed.
    pub fn remove_suite(&mut self, suite: Option<&Arc<dyn Suite>>) -> Result<bool, RunnerError> {
        let suite = suite.ok_or(RunnerError::InvalidArgument("suite"))?;
        Ok(self.remove(suite))
    }

    /// Remove every suite
    pub fn clear_suites(&mut self) {
        self.suites.clear();
    }

    /// Suites in run order
    pub fn suites(&self) -> &[Arc<dyn Suite>] {
        &self.suites
    }

    /// Total number of test cases across every suite, recomputed on each call
    pub fn test_count(&self) -> usize {
        self.suites.iter().map(|s| s.test_count()).sum()
    }

    /// Run every suite in order against `endpoint`.
    ///
    /// The stream ends right after the first `Err(Cancelled)`; suites after
    /// the cancelled one are never started.
    pub fn run_all<'a>(
        &'a self,
        endpoint: &'a str,
        cancel: &'a CancellationToken,
    ) -> RunStream<'a> {
        info!(
            suites = self.suites.len(),
            cases = self.test_count(),
            endpoint,
            "starting test run"
        );
        stream::iter(&self.suites)
            .flat_map(move |suite| {
                debug!(suite = suite.name(), "starting suite");
                let owner = Arc::clone(suite);
                suite
                    .run_all(endpoint, cancel)
                    .map(move |item| item.map(|result| (Arc::clone(&owner), result)))
            })
            .scan(false, |stopped, item| {
                if *stopped {
                    return future::ready(None);
                }
                *stopped = item.is_err();
                future::ready(Some(item))
            })
            .boxed()
    }
}

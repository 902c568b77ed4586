#![warn(missing_docs)]
//! HarpBench Statistical Engine
//!
//! Summarizes numeric benchmark samples collected from a device:
//! - Mean and population standard deviation
//! - Median (average of the two central elements for even sample sizes)
//! - Min/max from the sorted sample
//! - Percentiles with linear interpolation between closest ranks
//!
//! An empty sample never fails: every statistic degrades to `f64::NAN`.
//! The only error this crate raises is [`StatsError::OutOfRange`] for a
//! percentile requested outside `[0, 1]`.

pub mod non_finite;
mod percentiles;
mod summary;

pub use percentiles::{check_percentile, interpolate_sorted};
pub use summary::BenchmarkSummary;

use thiserror::Error;

/// Percentile used by [`BenchmarkSummary::percentile_99`]
pub const P99: f64 = 0.99;

/// Percentile used by [`BenchmarkSummary::percentile_01`]
pub const P01: f64 = 0.01;

/// Errors raised by the statistics engine
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StatsError {
    /// Requested percentile lies outside `[0, 1]`
    #[error("Percentile must be between 0 and 1, got {0}")]
    OutOfRange(f64),
}

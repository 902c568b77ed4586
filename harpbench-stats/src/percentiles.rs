//! Percentile Computation
//!
//! Linear interpolation between closest ranks over an already sorted sample:
//! `rank = p * (n - 1)`, then blend the two neighbouring values by the
//! fractional part of the rank.

use crate::StatsError;

/// Validate a percentile expressed as a fraction in `[0, 1]`.
///
/// NaN is rejected along with every value outside the closed interval.
pub fn check_percentile(percentile: f64) -> Result<f64, StatsError> {
    if (0.0..=1.0).contains(&percentile) {
        Ok(percentile)
    } else {
        Err(StatsError::OutOfRange(percentile))
    }
}

/// Interpolate a percentile from a sorted sample.
///
/// `percentile` must already be validated with [`check_percentile`].
/// Returns NaN for an empty sample.
///
/// # Examples
///
/// ```
/// # use harpbench_stats::interpolate_sorted;
/// let sorted = [1.0, 2.0, 3.0, 4.0];
/// assert_eq!(interpolate_sorted(&sorted, 0.5), 2.5);
/// assert_eq!(interpolate_sorted(&sorted, 1.0), 4.0);
/// ```
pub fn interpolate_sorted(sorted: &[f64], percentile: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }

    let rank = percentile * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }

    let weight = rank - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

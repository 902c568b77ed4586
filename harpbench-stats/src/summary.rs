//! Summary Statistics
//!
//! `BenchmarkSummary` takes ownership of a sample and sorts it once at
//! construction. Every statistic is then read from the sorted storage.
//! Callers that still need the original order must clone before handing the
//! sample over.

use crate::non_finite;
use crate::percentiles::{check_percentile, interpolate_sorted};
use crate::{P01, P99, StatsError};
use serde::{Deserialize, Serialize};

/// Immutable sorted view of a numeric sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SummaryRecord", into = "SummaryRecord")]
pub struct BenchmarkSummary {
    values: Vec<f64>,
}

impl BenchmarkSummary {
    /// Build a summary, sorting `values` in place.
    ///
    /// NaN entries are ordered after every finite value (`f64::total_cmp`).
    pub fn new(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        Self { values }
    }

    /// Sorted sample backing this summary
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Give the sorted sample back
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the sample is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Arithmetic mean
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Population standard deviation (divides by N)
    pub fn std_dev(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let mean = self.mean();
        let sum_of_squares: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        (sum_of_squares / self.values.len() as f64).sqrt()
    }

    /// Middle element, or the average of the two central elements for even N
    pub fn median(&self) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return f64::NAN;
        }
        let mid = n / 2;
        if n % 2 == 0 {
            (self.values[mid - 1] + self.values[mid]) / 2.0
        } else {
            self.values[mid]
        }
    }

    /// Smallest sample
    pub fn min(&self) -> f64 {
        self.values.first().copied().unwrap_or(f64::NAN)
    }

    /// Largest sample
    pub fn max(&self) -> f64 {
        self.values.last().copied().unwrap_or(f64::NAN)
    }

    /// Percentile for `percentile` in `[0, 1]`.
    ///
    /// The range is checked before anything else, so an out-of-range request
    /// fails even on an empty sample. A valid request on an empty sample
    /// yields NaN.
    pub fn percentile(&self, percentile: f64) -> Result<f64, StatsError> {
        let percentile = check_percentile(percentile)?;
        Ok(interpolate_sorted(&self.values, percentile))
    }

    /// 99th percentile
    pub fn percentile_99(&self) -> f64 {
        interpolate_sorted(&self.values, P99)
    }

    /// 1st percentile
    pub fn percentile_01(&self) -> f64 {
        interpolate_sorted(&self.values, P01)
    }
}

impl From<Vec<f64>> for BenchmarkSummary {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

impl From<&[f64]> for BenchmarkSummary {
    fn from(values: &[f64]) -> Self {
        Self::new(values.to_vec())
    }
}

/// Wire shape: the sorted sample plus derived statistics for consumers that
/// only read the report. Derived fields are ignored when deserializing.
/// Non-finite floats are written as strings so the sample always reloads.
#[derive(Serialize, Deserialize)]
struct SummaryRecord {
    #[serde(with = "non_finite::seq")]
    values: Vec<f64>,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    mean: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    std_dev: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    median: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    min: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    max: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    p99: f64,
    #[serde(default, skip_deserializing, serialize_with = "non_finite::serialize")]
    p01: f64,
}

impl From<BenchmarkSummary> for SummaryRecord {
    fn from(summary: BenchmarkSummary) -> Self {
        Self {
            mean: summary.mean(),
            std_dev: summary.std_dev(),
            median: summary.median(),
            min: summary.min(),
            max: summary.max(),
            p99: summary.percentile_99(),
            p01: summary.percentile_01(),
            values: summary.into_values(),
        }
    }
}

impl From<SummaryRecord> for BenchmarkSummary {
    fn from(record: SummaryRecord) -> Self {
        Self::new(record.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_summary() {
        let summary = BenchmarkSummary::new(vec![1.0, 2.0, 3.0, 4.0]);

        assert!((summary.mean() - 2.5).abs() < f64::EPSILON);
        assert!((summary.median() - 2.5).abs() < f64::EPSILON);
        assert_eq!(summary.min(), 1.0);
        assert_eq!(summary.max(), 4.0);
        assert!((summary.percentile(0.5).unwrap() - 2.5).abs() < f64::EPSILON);
        assert_eq!(summary.len(), 4);
    }

    #[test]
    fn test_single_sample() {
        let summary = BenchmarkSummary::new(vec![5.0]);

        assert_eq!(summary.mean(), 5.0);
        assert_eq!(summary.median(), 5.0);
        assert_eq!(summary.min(), 5.0);
        assert_eq!(summary.max(), 5.0);
        assert_eq!(summary.std_dev(), 0.0);
        for p in [0.0, 0.01, 0.5, 0.99, 1.0] {
            assert_eq!(summary.percentile(p).unwrap(), 5.0);
        }
    }

    #[test]
    fn test_population_std_dev() {
        // Population variance of 2,4,4,4,5,5,7,9 is exactly 4.
        let summary = BenchmarkSummary::new(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((summary.std_dev() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_odd_median() {
        let summary = BenchmarkSummary::new(vec![9.0, 1.0, 5.0]);
        assert_eq!(summary.median(), 5.0);
    }

    #[test]
    fn test_even_median_matches_midpoint_percentile() {
        let summary = BenchmarkSummary::new(vec![1.0, 2.0, 10.0, 20.0, 30.0, 100.0]);
        assert_eq!(summary.median(), 15.0);
        assert!((summary.percentile(0.5).unwrap() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_samples() {
        let summary = BenchmarkSummary::new(Vec::new());

        assert!(summary.is_empty());
        assert!(summary.mean().is_nan());
        assert!(summary.std_dev().is_nan());
        assert!(summary.median().is_nan());
        assert!(summary.min().is_nan());
        assert!(summary.max().is_nan());
        assert!(summary.percentile(0.5).unwrap().is_nan());
        assert!(summary.percentile_99().is_nan());
        assert!(summary.percentile_01().is_nan());
    }

    #[test]
    fn test_out_of_range_on_empty_sample() {
        let summary = BenchmarkSummary::default();
        assert_eq!(summary.percentile(1.5), Err(StatsError::OutOfRange(1.5)));
        assert_eq!(summary.percentile(-0.5), Err(StatsError::OutOfRange(-0.5)));
    }

    #[test]
    fn test_sorts_owned_sample() {
        let summary = BenchmarkSummary::new(vec![3.0, 1.0, 2.0]);
        assert_eq!(summary.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_borrowed_sample_is_copied() {
        let original = [3.0, 1.0, 2.0];
        let summary = BenchmarkSummary::from(&original[..]);
        assert_eq!(original, [3.0, 1.0, 2.0]);
        assert_eq!(summary.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_serialized_shape() {
        let summary = BenchmarkSummary::new(vec![4.0, 2.0]);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["values"], serde_json::json!([2.0, 4.0]));
        assert_eq!(json["mean"], serde_json::json!(3.0));
        assert_eq!(json["max"], serde_json::json!(4.0));

        // Derived fields are recomputed, not trusted.
        let tampered = serde_json::json!({ "values": [9.0, 1.0], "mean": 100.0 });
        let restored: BenchmarkSummary = serde_json::from_value(tampered).unwrap();
        assert_eq!(restored.values(), &[1.0, 9.0]);
        assert_eq!(restored.mean(), 5.0);
    }

    #[test]
    fn test_nan_sample_reloads() {
        let summary = BenchmarkSummary::new(vec![f64::NAN, 1.0]);
        let json = serde_json::to_string(&summary).unwrap();
        let restored: BenchmarkSummary = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.values()[0], 1.0);
        assert!(restored.values()[1].is_nan());
        assert!(restored.mean().is_nan());
    }

    #[test]
    fn test_empty_sample_reloads() {
        let json = serde_json::to_value(BenchmarkSummary::default()).unwrap();
        assert_eq!(json["mean"], serde_json::json!("NaN"));

        let restored: BenchmarkSummary = serde_json::from_value(json).unwrap();
        assert!(restored.is_empty());
    }

    proptest! {
        #[test]
        fn percentile_endpoints_match_extremes(values in prop::collection::vec(-1e6f64..1e6, 1..200)) {
            let summary = BenchmarkSummary::new(values);
            prop_assert_eq!(summary.percentile(0.0).unwrap(), summary.min());
            prop_assert_eq!(summary.percentile(1.0).unwrap(), summary.max());
        }

        #[test]
        fn statistics_ignore_input_order(values in prop::collection::vec(-1e6f64..1e6, 0..200)) {
            let mut reversed = values.clone();
            reversed.reverse();
            let a = BenchmarkSummary::new(values);
            let b = BenchmarkSummary::new(reversed);

            prop_assert_eq!(a.values(), b.values());
            prop_assert_eq!(a.median().to_bits(), b.median().to_bits());
            prop_assert_eq!(a.min().to_bits(), b.min().to_bits());
            prop_assert_eq!(a.max().to_bits(), b.max().to_bits());
            prop_assert_eq!(a.mean().to_bits(), b.mean().to_bits());
            prop_assert_eq!(a.percentile_99().to_bits(), b.percentile_99().to_bits());
        }

        #[test]
        fn percentile_rejects_out_of_range(
            values in prop::collection::vec(-1e3f64..1e3, 0..20),
            p in prop_oneof![-1e3f64..-1e-9, (1.0f64 + 1e-9)..1e3],
        ) {
            let summary = BenchmarkSummary::new(values);
            prop_assert_eq!(summary.percentile(p), Err(StatsError::OutOfRange(p)));
        }

        #[test]
        fn percentile_stays_within_bounds(
            values in prop::collection::vec(-1e6f64..1e6, 1..100),
            p in 0.0f64..=1.0,
        ) {
            let summary = BenchmarkSummary::new(values);
            let value = summary.percentile(p).unwrap();
            prop_assert!(value >= summary.min() - 1e-6 && value <= summary.max() + 1e-6);
        }
    }
}

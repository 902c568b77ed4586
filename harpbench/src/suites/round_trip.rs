use crate::{BenchmarkSummary, Connector, NumericBenchmarkResult, Status, suite};
use anyhow::Context;
use std::sync::Arc;
use tracing::debug;

/// Benchmarks request/reply latency with back-to-back WhoAmI reads
pub struct RoundTripSuite {
    connector: Arc<dyn Connector>,
    samples: usize,
    max_delay_ms: f64,
}

impl RoundTripSuite {
    /// `samples` probes; the benchmark fails when two consecutive replies
    /// are more than `max_delay_ms` apart
    pub fn new(connector: Arc<dyn Connector>, samples: usize, max_delay_ms: f64) -> Self {
        Self {
            connector,
            samples,
            max_delay_ms,
        }
    }
}

#[suite(description = "A bunch of tests to benchmark round trip read/writes.")]
impl RoundTripSuite {
    #[harp_test(description = "Benchmarks the round trip time for a WhoAmI read command.")]
    async fn benchmark_round_trip(&self, port: &str) -> anyhow::Result<NumericBenchmarkResult> {
        let mut timestamps = Vec::with_capacity(self.samples);
        {
            let mut device = self.connector.open(port).await?;
            for i in 0..self.samples {
                let timestamp = device
                    .probe_round_trip()
                    .await
                    .with_context(|| format!("round trip probe {}", i))?;
                timestamps.push(timestamp);
            }
        }

        // Reply-to-reply intervals in milliseconds
        let intervals: Vec<f64> = timestamps
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) * 1e3)
            .collect();
        let summary = BenchmarkSummary::new(intervals);
        debug!(samples = summary.len(), max_ms = summary.max(), "round trip benchmark done");

        Ok(if summary.max() > self.max_delay_ms {
            NumericBenchmarkResult::from_summary(
                summary,
                Status::Failed,
                format!(
                    "Round trip WhoAmI read benchmark exceeded maximum allowed delay of {} ms.",
                    self.max_delay_ms
                ),
            )
        } else {
            NumericBenchmarkResult::from_summary(
                summary,
                Status::Passed,
                "Round trip WhoAmI read benchmark.",
            )
        })
    }
}

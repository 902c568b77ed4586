//! HarpBench Simulated Device
//!
//! Runs the built-in suites against an in-memory device so the whole
//! pipeline can be tried without hardware.
//!
//! Run with:
//!   cargo run --example simulated_device -- --port SIM0
//!   cargo run --example simulated_device -- --port SIM0 --verbose
//!   cargo run --example simulated_device -- --port SIM0 --format json --report report.json
//!   cargo run --example simulated_device -- --list
//!
//! Press Ctrl-C during the run to cancel after the current test.

use harpbench::internal::BoxFuture;
use harpbench::prelude::*;
use std::sync::Arc;
use std::time::Duration;

/// WhoAmI reported by the simulated board
const WHO_AM_I: u16 = 1216;

/// Nominal reply period of the simulated serial link, in seconds
const REPLY_PERIOD: f64 = 0.001;

struct SimulatedConnector;

impl Connector for SimulatedConnector {
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn Device>, DeviceError>> {
        Box::pin(async move {
            if endpoint.is_empty() {
                return Err(DeviceError::Open {
                    endpoint: endpoint.to_string(),
                    reason: "empty port name".to_string(),
                });
            }
            Ok(Box::new(SimulatedDevice::default()) as Box<dyn Device>)
        })
    }
}

#[derive(Default)]
struct SimulatedDevice {
    /// Device clock in seconds
    clock: f64,
    probes: u64,
}

impl SimulatedDevice {
    /// Deterministic jitter of up to half a reply period
    fn jitter(&self) -> f64 {
        (self.probes as f64 * 0.7).sin().abs() * REPLY_PERIOD * 0.5
    }
}

impl Device for SimulatedDevice {
    fn read_who_am_i(&mut self) -> BoxFuture<'_, Result<u16, DeviceError>> {
        Box::pin(async { Ok(WHO_AM_I) })
    }

    fn write_timestamp_seconds(&mut self, seconds: u32) -> BoxFuture<'_, Result<(), DeviceError>> {
        Box::pin(async move {
            self.clock = f64::from(seconds);
            Ok(())
        })
    }

    fn read_timestamp_seconds(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_micros(200)).await;
            self.clock += 0.0002;
            Ok(self.clock)
        })
    }

    fn probe_round_trip(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>> {
        Box::pin(async move {
            self.probes += 1;
            self.clock += REPLY_PERIOD + self.jitter();
            Ok(self.clock)
        })
    }
}

fn main() -> anyhow::Result<()> {
    harpbench::run(Arc::new(SimulatedConnector))
}

//! Built-in Device Suites
//!
//! Register and timing checks every Harp device is expected to pass. Each
//! suite opens its own device handle per test case through the shared
//! [`Connector`] and drops it when the case ends.

mod round_trip;
mod timestamp;
mod who_am_i;

pub use round_trip::RoundTripSuite;
pub use timestamp::TimestampSecondsSuite;
pub use who_am_i::WhoAmISuite;

use crate::{Connector, Runner, SuitesConfig};
use std::sync::Arc;

/// Runner with the built-in suites in their standard order:
/// WhoAmI, round trip, timestamp seconds.
pub fn default_runner(
    connector: Arc<dyn Connector>,
    config: &SuitesConfig,
) -> anyhow::Result<Runner> {
    let settle = config.timestamp.settle_duration()?;

    Ok(Runner::new()
        .with_suite(WhoAmISuite::new(Arc::clone(&connector)))
        .with_suite(RoundTripSuite::new(
            Arc::clone(&connector),
            config.round_trip.samples,
            config.round_trip.max_delay_ms,
        ))
        .with_suite(TimestampSecondsSuite::new(connector, config.timestamp.seconds, settle)))
}

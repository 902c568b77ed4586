use crate::{AssertionResult, Connector, suite};
use std::sync::Arc;
use std::time::Duration;

/// Checks that the device clock can be set
pub struct TimestampSecondsSuite {
    connector: Arc<dyn Connector>,
    seconds: u32,
    settle: Duration,
}

impl TimestampSecondsSuite {
    /// Write `seconds`, wait `settle`, then read the clock back
    pub fn new(connector: Arc<dyn Connector>, seconds: u32, settle: Duration) -> Self {
        Self {
            connector,
            seconds,
            settle,
        }
    }
}

#[suite(description = "Timestamp Seconds Register Tests")]
impl TimestampSecondsSuite {
    #[harp_test(description = "Validates that the Timestamp Seconds register is writable.")]
    async fn is_writable(&self, port: &str) -> anyhow::Result<AssertionResult> {
        let mut device = self.connector.open(port).await?;
        device.write_timestamp_seconds(self.seconds).await?;
        tokio::time::sleep(self.settle).await;
        let read = device.read_timestamp_seconds().await?;

        let expected = self.seconds;
        Ok(AssertionResult::assertion_with(
            read - f64::from(expected) < 1.0,
            |writable| {
                if writable {
                    "`TimestampSeconds` register is writable and updates as expected.".to_string()
                } else {
                    format!(
                        "`TimestampSeconds` register is not writable, Expected value: {}, read value: {}.",
                        expected, read
                    )
                }
            },
        ))
    }
}

use crate::{Connector, ValueResult, suite};
use anyhow::Context;
use std::sync::Arc;

/// Checks the WhoAmI register
pub struct WhoAmISuite {
    connector: Arc<dyn Connector>,
}

impl WhoAmISuite {
    /// Suite reaching the device through `connector`
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self { connector }
    }
}

#[suite(description = "WhoAmI Register Tests")]
impl WhoAmISuite {
    #[harp_test(description = "Validates that the WhoAmI register exists and contains a value.")]
    async fn check_who_am_i(&self, port: &str) -> anyhow::Result<ValueResult<u16>> {
        let mut device = self.connector.open(port).await?;
        let value = device.read_who_am_i().await.context("reading WhoAmI")?;

        Ok(ValueResult::evaluate_with(
            value,
            |v| *v > 0 && *v < 9999,
            |v, valid| {
                if valid {
                    format!("WhoAmI register contains valid value: {}.", v)
                } else {
                    format!("WhoAmI register contains invalid value: {}.", v)
                }
            },
        ))
    }
}

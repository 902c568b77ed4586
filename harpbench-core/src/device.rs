//! Device Collaborator
//!
//! The harness never speaks the device protocol itself. Test cases open a
//! handle through a [`Connector`] supplied by the embedding application, use
//! it for their round trips, and release it when the handle is dropped at the
//! end of the case. Handles are never shared between test cases.

use futures::future::BoxFuture;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a device handle
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum DeviceError {
    #[error("failed to open device on {endpoint}: {reason}")]
    Open { endpoint: String, reason: String },

    #[error("device disconnected")]
    Disconnected,

    #[error("device did not reply within {0:?}")]
    Timeout(Duration),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeviceError {
    /// Short type name used when the error is recorded as a test outcome
    pub fn kind(&self) -> &'static str {
        match self {
            DeviceError::Open { .. } => "OpenError",
            DeviceError::Disconnected => "Disconnected",
            DeviceError::Timeout(_) => "Timeout",
            DeviceError::Protocol(_) => "ProtocolError",
            DeviceError::Io(_) => "IoError",
        }
    }
}

/// Open connection to a device.
///
/// Every operation is a request/response exchange and may suspend.
pub trait Device: Send {
    /// Read the WhoAmI register
    fn read_who_am_i(&mut self) -> BoxFuture<'_, Result<u16, DeviceError>>;

    /// Write the TimestampSeconds register
    fn write_timestamp_seconds(&mut self, seconds: u32) -> BoxFuture<'_, Result<(), DeviceError>>;

    /// Read the device clock, in seconds, from a TimestampSeconds reply
    fn read_timestamp_seconds(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>>;

    /// Send a WhoAmI read probe and return the reply timestamp in seconds
    fn probe_round_trip(&mut self) -> BoxFuture<'_, Result<f64, DeviceError>>;
}

/// Opens device handles for an endpoint identifier such as a serial port name
pub trait Connector: Send + Sync {
    /// Open a fresh handle; dropping the handle releases the connection
    fn open<'a>(
        &'a self,
        endpoint: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn Device>, DeviceError>>;
}

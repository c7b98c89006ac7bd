//! BLE adapter error types.

use zonekit_domain::error::ZoneKitError;

/// Errors specific to the BLE adapter.
#[derive(Debug, thiserror::Error)]
pub enum BleError {
    /// No BLE adapter found on the host.
    #[error("no BLE adapter available")]
    NotAvailable,

    /// BLE scan or adapter operation failed.
    #[error("BLE scan error")]
    Scan(#[from] btleplug::Error),

    /// Failed to parse a BLE advertisement payload.
    #[error("failed to parse BLE payload")]
    PayloadParse(#[source] PayloadParseError),
}

/// Details about why an advertisement payload could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum PayloadParseError {
    /// The manufacturer id is not one we know how to parse.
    #[error("unsupported manufacturer id 0x{0:04X}")]
    UnsupportedManufacturer(u16),

    /// Apple manufacturer data that is not an iBeacon frame.
    #[error("manufacturer data is not an iBeacon frame")]
    NotIBeacon,

    /// An iBeacon frame with the wrong payload size.
    #[error("iBeacon payload must be {expected} bytes, got {actual}")]
    WrongLength {
        /// Expected byte count.
        expected: usize,
        /// Actual byte count.
        actual: usize,
    },
}

impl BleError {
    /// Convert into a [`ZoneKitError::Sensing`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> ZoneKitError {
        ZoneKitError::Sensing(Box::new(self))
    }
}

impl From<BleError> for ZoneKitError {
    fn from(err: BleError) -> Self {
        err.into_domain()
    }
}

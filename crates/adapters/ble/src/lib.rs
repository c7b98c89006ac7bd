//! # zonekit-adapter-ble
//!
//! Passive BLE adapter — scans for iBeacon advertisements and exposes them
//! as beacon proximity samples.
//!
//! ## How it works
//!
//! Proximity beacons broadcast their identity (uuid/major/minor) plus a
//! calibrated transmit power inside Apple manufacturer-data advertisements
//! (no connection needed). This adapter passively scans for those frames,
//! estimates a distance from the received signal strength, buckets it into
//! a proximity category, and feeds the result into the engine's sample
//! channel.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `zonekit-app` and `zonekit-domain`.

mod config;
mod error;
pub mod parser;
pub mod ranging;
mod scanner;

pub use config::BleConfig;
pub use error::{BleError, PayloadParseError};

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use zonekit_app::ports::{SensingSource, SensorKind, SensorSample};
use zonekit_domain::error::ZoneKitError;

/// Sensing source that ranges iBeacons via passive BLE scanning.
pub struct BleSource {
    config: BleConfig,
    scan_handle: Option<JoinHandle<()>>,
}

impl BleSource {
    /// Create a new BLE source with the given configuration.
    #[must_use]
    pub fn new(config: BleConfig) -> Self {
        Self {
            config,
            scan_handle: None,
        }
    }
}

impl SensingSource for BleSource {
    fn name(&self) -> &'static str {
        "ble"
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Beacon
    }

    fn start(
        &mut self,
        tx: mpsc::Sender<SensorSample>,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        let config = self.config.clone();
        async move {
            // Probe for an adapter up front so a machine without Bluetooth
            // reports the failure once instead of retrying forever.
            scanner::probe_adapter().await.map_err(BleError::into_domain)?;

            tracing::info!(
                scan_secs = config.scan_duration_secs,
                interval_secs = config.update_interval_secs,
                "BLE beacon scan loop started"
            );
            self.scan_handle = Some(tokio::spawn(scanner::scan_loop(config, tx)));
            Ok(())
        }
    }

    fn stop(&mut self) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        if let Some(handle) = self.scan_handle.take() {
            handle.abort();
            tracing::info!("BLE beacon scan loop stopped");
        }
        async { Ok(()) }
    }
}

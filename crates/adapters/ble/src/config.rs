//! BLE adapter configuration.

use serde::Deserialize;

/// Configuration for the passive iBeacon scanner.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// How long each scan pass listens for advertisements, in seconds.
    pub scan_duration_secs: u16,
    /// Pause between scan passes, in seconds.
    pub update_interval_secs: u16,
    /// Optional beacon uuid allowlist.
    ///
    /// When empty, all detected iBeacons are reported.
    pub uuid_filter: Vec<uuid::Uuid>,
    /// Path-loss exponent for distance estimation (2.0 = free space;
    /// indoor environments typically range 2.5–4.0).
    pub path_loss_exponent: f64,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            scan_duration_secs: 5,
            update_interval_secs: 2,
            uuid_filter: Vec::new(),
            path_loss_exponent: 2.0,
        }
    }
}

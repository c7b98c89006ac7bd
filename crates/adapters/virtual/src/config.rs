//! Virtual adapter configuration.

use serde::Deserialize;

/// Configuration for the simulated sensing sources.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VirtualConfig {
    /// Enable the simulated sources.
    pub enabled: bool,
    /// Seconds between scripted samples.
    pub interval_secs: f64,
    /// Scripted walk as `[latitude, longitude]` pairs.
    pub path: Vec<[f64; 2]>,
}

impl Default for VirtualConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 1.0,
            // A short stroll into and back out of a ~50 m zone at the origin.
            path: vec![
                [0.001, 0.0],
                [0.0005, 0.0],
                [0.0002, 0.0],
                [0.0002, 0.0],
                [0.0005, 0.0],
                [0.001, 0.0],
            ],
        }
    }
}

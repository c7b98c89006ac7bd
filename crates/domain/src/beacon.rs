//! Bluetooth beacon identity and proximity ranging model.

use serde::{Deserialize, Serialize};

use crate::time::Timestamp;

/// Identity of a proximity beacon: the advertised uuid/major/minor triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Beacon {
    pub uuid: uuid::Uuid,
    pub major: u16,
    pub minor: u16,
}

impl Beacon {
    #[must_use]
    pub fn new(uuid: uuid::Uuid, major: u16, minor: u16) -> Self {
        Self { uuid, major, minor }
    }
}

impl std::fmt::Display for Beacon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.uuid, self.major, self.minor)
    }
}

/// Discretized beacon closeness.
///
/// The variant order defines closeness: `Unknown < Far < Near < Immediate`,
/// so "at least as close as Near" is `proximity >= Proximity::Near`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Proximity {
    /// No usable ranging estimate.
    #[default]
    Unknown,
    Far,
    Near,
    /// Within arm's reach of the beacon.
    Immediate,
}

impl Proximity {
    /// Whether this ranged proximity is at least as close as `threshold`.
    ///
    /// `Unknown` is never "at least as close" as anything — an unknown
    /// estimate must not place the device inside a zone.
    #[must_use]
    pub fn at_least(self, threshold: Self) -> bool {
        self != Self::Unknown && self >= threshold
    }
}

impl std::fmt::Display for Proximity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Far => f.write_str("far"),
            Self::Near => f.write_str("near"),
            Self::Immediate => f.write_str("immediate"),
        }
    }
}

/// One ranging measurement for a beacon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximitySample {
    pub proximity: Proximity,
    /// Estimated distance to the beacon in meters; negative when the
    /// estimate is unusable.
    pub accuracy_m: f64,
    /// Received signal strength in dBm.
    pub rssi: i16,
    /// When the measurement was taken.
    pub at: Timestamp,
}

//! Sensing port — the sample feed from location / proximity collaborators.
//!
//! A sensing source bridges a platform capability (GPS, Bluetooth ranging,
//! an indoor-positioning system) into the engine. Sources push samples into
//! one shared channel; the binary drives a single consumer loop that hands
//! them to the manager, which keeps all zone mutation on one timeline.

use std::future::Future;

use tokio::sync::mpsc;

use zonekit_domain::beacon::{Beacon, Proximity};
use zonekit_domain::error::ZoneKitError;
use zonekit_domain::geo::Coordinate;
use zonekit_domain::id::ZoneUid;
use zonekit_domain::time::Timestamp;

/// Which platform capability a source represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Gps,
    Beacon,
    Indoor,
}

/// One measurement produced by a sensing source.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorSample {
    /// A GPS fix for the device.
    Location { coordinate: Coordinate, at: Timestamp },
    /// A ranging measurement for one beacon.
    BeaconProximity {
        beacon: Beacon,
        proximity: Proximity,
        /// Estimated distance in meters; negative when unusable.
        accuracy_m: f64,
        rssi: i16,
        at: Timestamp,
    },
    /// The beacon reported that it is physically in motion.
    BeaconMotion { beacon: Beacon, at: Timestamp },
    /// An indoor-positioning verdict for one zone.
    IndoorContainment {
        zone: ZoneUid,
        inside: bool,
        at: Timestamp,
    },
}

impl SensorSample {
    /// The capability that produced this sample.
    #[must_use]
    pub fn kind(&self) -> SensorKind {
        match self {
            Self::Location { .. } => SensorKind::Gps,
            Self::BeaconProximity { .. } | Self::BeaconMotion { .. } => SensorKind::Beacon,
            Self::IndoorContainment { .. } => SensorKind::Indoor,
        }
    }

    /// When the sample was taken.
    #[must_use]
    pub fn at(&self) -> Timestamp {
        match self {
            Self::Location { at, .. }
            | Self::BeaconProximity { at, .. }
            | Self::BeaconMotion { at, .. }
            | Self::IndoorContainment { at, .. } => *at,
        }
    }
}

/// A pluggable sensing collaborator.
///
/// The binary calls [`start`](Self::start) with a clone of the shared sample
/// sender; the source spawns whatever background work it needs and returns.
/// A source that cannot start (hardware absent, permission denied) returns
/// an error — that source stays down, the others keep feeding.
pub trait SensingSource {
    /// Unique name identifying this source (e.g. `"ble"`, `"virtual-gps"`).
    fn name(&self) -> &'static str;

    /// The capability this source feeds.
    fn kind(&self) -> SensorKind;

    /// Begin producing samples into `tx`.
    fn start(
        &mut self,
        tx: mpsc::Sender<SensorSample>,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send;

    /// Stop producing samples and release resources.
    fn stop(&mut self) -> impl Future<Output = Result<(), ZoneKitError>> + Send;
}

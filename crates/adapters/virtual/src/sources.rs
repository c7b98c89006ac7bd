//! Simulated sensing sources — play a scripted sample sequence.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use zonekit_app::ports::{SensingSource, SensorKind, SensorSample};
use zonekit_domain::beacon::{Beacon, Proximity};
use zonekit_domain::error::ZoneKitError;
use zonekit_domain::geo::Coordinate;
use zonekit_domain::time;

use crate::VirtualConfig;

/// A GPS source that emits a scripted walk, one fix per interval.
pub struct SimulatedLocationSource {
    script: Vec<Coordinate>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedLocationSource {
    #[must_use]
    pub fn new(script: Vec<Coordinate>, interval: Duration) -> Self {
        Self {
            script,
            interval,
            handle: None,
        }
    }

    /// Build a source from the adapter configuration.
    #[must_use]
    pub fn from_config(config: &VirtualConfig) -> Self {
        let script = config
            .path
            .iter()
            .map(|[latitude, longitude]| Coordinate::new(*latitude, *longitude))
            .collect();
        Self::new(script, Duration::from_secs_f64(config.interval_secs.max(0.01)))
    }
}

impl SensingSource for SimulatedLocationSource {
    fn name(&self) -> &'static str {
        "virtual-gps"
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Gps
    }

    fn start(
        &mut self,
        tx: mpsc::Sender<SensorSample>,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        let script = self.script.clone();
        let interval = self.interval;
        tracing::info!(fixes = script.len(), "virtual GPS walk started");
        let handle = tokio::spawn(async move {
            for coordinate in script {
                let sample = SensorSample::Location {
                    coordinate,
                    at: time::now(),
                };
                if tx.send(sample).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
            tracing::debug!("virtual GPS walk finished");
        });
        self.handle = Some(handle);
        async { Ok(()) }
    }

    fn stop(&mut self) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        async { Ok(()) }
    }
}

/// A beacon ranger that emits a scripted proximity sequence for one beacon.
pub struct SimulatedBeaconSource {
    beacon: Beacon,
    script: Vec<Proximity>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedBeaconSource {
    #[must_use]
    pub fn new(beacon: Beacon, script: Vec<Proximity>, interval: Duration) -> Self {
        Self {
            beacon,
            script,
            interval,
            handle: None,
        }
    }
}

/// Plausible ranging numbers for a scripted category.
fn synthesize_measurement(proximity: Proximity) -> (f64, i16) {
    match proximity {
        Proximity::Immediate => (0.3, -45),
        Proximity::Near => (2.0, -65),
        Proximity::Far => (10.0, -85),
        Proximity::Unknown => (-1.0, 0),
    }
}

impl SensingSource for SimulatedBeaconSource {
    fn name(&self) -> &'static str {
        "virtual-beacon"
    }

    fn kind(&self) -> SensorKind {
        SensorKind::Beacon
    }

    fn start(
        &mut self,
        tx: mpsc::Sender<SensorSample>,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        let beacon = self.beacon;
        let script = self.script.clone();
        let interval = self.interval;
        tracing::info!(%beacon, samples = script.len(), "virtual beacon ranging started");
        let handle = tokio::spawn(async move {
            for proximity in script {
                let (accuracy_m, rssi) = synthesize_measurement(proximity);
                let sample = SensorSample::BeaconProximity {
                    beacon,
                    proximity,
                    accuracy_m,
                    rssi,
                    at: time::now(),
                };
                if tx.send(sample).await.is_err() {
                    break;
                }
                tokio::time::sleep(interval).await;
            }
        });
        self.handle = Some(handle);
        async { Ok(()) }
    }

    fn stop(&mut self) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        async { Ok(()) }
    }
}

//! BLE scan loop — ranges iBeacons and feeds proximity samples.

use std::time::Duration;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::Manager;
use tokio::sync::mpsc;
use tokio_stream::StreamExt as _;

use zonekit_app::ports::SensorSample;
use zonekit_domain::time;

use crate::config::BleConfig;
use crate::error::BleError;
use crate::parser::{self, BeaconAdvertisement};
use crate::ranging;

/// Check that a BLE adapter exists on this host.
///
/// # Errors
///
/// Returns [`BleError::NotAvailable`] when no adapter is present, or
/// [`BleError::Scan`] when the platform Bluetooth stack cannot be reached.
pub(crate) async fn probe_adapter() -> Result<(), BleError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    if adapters.is_empty() {
        return Err(BleError::NotAvailable);
    }
    Ok(())
}

/// Continuous scan loop — runs a scan pass, rests for the interval, repeats.
/// Exits when the sample channel closes.
pub(crate) async fn scan_loop(config: BleConfig, tx: mpsc::Sender<SensorSample>) {
    let interval = Duration::from_secs(u64::from(config.update_interval_secs));
    loop {
        if let Err(err) = scan_pass(&config, &tx).await {
            tracing::warn!(%err, "BLE scan pass failed, retrying next interval");
        }
        if tx.is_closed() {
            break;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Run a single scan pass for the configured duration, sending one proximity
/// sample per received iBeacon advertisement.
async fn scan_pass(config: &BleConfig, tx: &mpsc::Sender<SensorSample>) -> Result<(), BleError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    let central = adapters.into_iter().next().ok_or(BleError::NotAvailable)?;

    let mut events = central.events().await?;
    central.start_scan(ScanFilter::default()).await?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(u64::from(config.scan_duration_secs));

    while tokio::time::Instant::now() < deadline {
        let remaining = deadline - tokio::time::Instant::now();
        match tokio::time::timeout(remaining, events.next()).await {
            Ok(Some(CentralEvent::ManufacturerDataAdvertisement {
                id,
                manufacturer_data,
            })) => {
                for (company_id, data) in &manufacturer_data {
                    let Ok(advertisement) = parser::parse_manufacturer_data(*company_id, data)
                    else {
                        continue;
                    };

                    if !passes_filter(config, &advertisement) {
                        tracing::debug!(
                            beacon = %advertisement.beacon,
                            "filtered out by uuid_filter"
                        );
                        continue;
                    }

                    let rssi = match central.peripheral(&id).await {
                        Ok(peripheral) => peripheral
                            .properties()
                            .await
                            .ok()
                            .flatten()
                            .and_then(|props| props.rssi),
                        Err(_) => None,
                    };

                    let sample = build_sample(&advertisement, rssi, config.path_loss_exponent);
                    tracing::trace!(beacon = %advertisement.beacon, ?rssi, "beacon ranged");
                    if tx.send(sample).await.is_err() {
                        central.stop_scan().await?;
                        return Ok(());
                    }
                }
            }
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => break,
        }
    }

    central.stop_scan().await?;
    Ok(())
}

fn passes_filter(config: &BleConfig, advertisement: &BeaconAdvertisement) -> bool {
    config.uuid_filter.is_empty() || config.uuid_filter.contains(&advertisement.beacon.uuid)
}

/// Turn a ranged advertisement into an engine sample.
pub(crate) fn build_sample(
    advertisement: &BeaconAdvertisement,
    rssi: Option<i16>,
    path_loss_exponent: f64,
) -> SensorSample {
    let rssi = rssi.unwrap_or(0);
    let accuracy_m =
        ranging::estimate_distance_m(rssi, advertisement.tx_power_dbm, path_loss_exponent);
    SensorSample::BeaconProximity {
        beacon: advertisement.beacon,
        proximity: ranging::proximity_for_distance(accuracy_m),
        accuracy_m,
        rssi,
        at: time::now(),
    }
}

//! # zonekitd — zonekit daemon
//!
//! Composition root that wires sensing sources, stores, and transports
//! around the trigger engine and drives the sample loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct port implementations (adapters)
//! - Construct the trigger manager, injecting adapters via port traits
//! - Load the zone set (remote + cache, or a local demo zone)
//! - Start sensing sources and consume their samples on a single loop
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use zonekit_adapter_ble::BleSource;
use zonekit_adapter_http::{HttpCallbackTransport, HttpZoneDirectory};
use zonekit_adapter_storage_json::FileZoneCache;
use zonekit_adapter_virtual::{LogNotifier, SimulatedLocationSource};
use zonekit_app::event_bus::InProcessEventBus;
use zonekit_app::manager::TriggerManager;
use zonekit_app::ports::{SensingSource, SensorSample};
use zonekit_app::services::zone_sync::ZoneSyncService;
use zonekit_domain::action::{Action, NotificationTemplate};
use zonekit_domain::error::ZoneKitError;
use zonekit_domain::event::ZoneEvent;
use zonekit_domain::geo::Coordinate;
use zonekit_domain::trigger::{Trigger, TriggerEvent};
use zonekit_domain::zone::{Zone, ZoneKind};

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Event bus + engine.
    let bus = Arc::new(InProcessEventBus::new(256));
    let transport = HttpCallbackTransport::new(&config.http)?;
    let mut manager = TriggerManager::new(Arc::clone(&bus), LogNotifier, transport);
    manager.set_error_handler(|err: &ZoneKitError| {
        tracing::error!(%err, "collaborator failure");
    });

    match (config.monitoring.gps, config.monitoring.beacon) {
        (true, true) => manager.start_monitoring_zones(),
        (true, false) => manager.start_monitoring_gps_zones(),
        (false, true) => manager.start_monitoring_beacon_zones(),
        (false, false) => tracing::warn!("all monitoring disabled by configuration"),
    }

    // Zone set: remote + cache when a URL is configured, demo zone otherwise.
    if let Some(url) = &config.zones.url {
        let directory = HttpZoneDirectory::new(&config.http, url.clone())?;
        let cache = FileZoneCache::new(&config.cache.path);
        let sync = ZoneSyncService::new(directory, cache).with_caching(config.cache.enabled);
        match sync.load_zones().await {
            Ok(definitions) => {
                manager.replace_zones(definitions);
            }
            Err(err) => {
                manager.report_error(&err);
                tracing::warn!("starting with an empty zone set");
            }
        }
    } else {
        manager.add_zone(demo_zone()?);
        tracing::info!("no zones.url configured, monitoring the built-in demo zone");
    }

    // Log state changes and firings as they happen.
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                ZoneEvent::StateChanged {
                    zone,
                    old_state,
                    new_state,
                    ..
                } => tracing::info!(%zone, %old_state, %new_state, "zone state"),
                ZoneEvent::TriggerFired { zone, trigger, .. } => {
                    tracing::info!(%zone, %trigger, "trigger fired");
                }
                ZoneEvent::TriggerWillFire { .. } => {}
            }
        }
    });

    // Sensing sources feed one shared channel; the loop below is the single
    // consumer that mutates zones.
    let (tx, mut rx) = mpsc::channel::<SensorSample>(64);

    let mut virtual_gps = None;
    if config.monitoring.gps && config.virtual_sources.enabled {
        let mut source = SimulatedLocationSource::from_config(&config.virtual_sources);
        match source.start(tx.clone()).await {
            Ok(()) => virtual_gps = Some(source),
            Err(err) => manager.report_error(&err),
        }
    }

    let mut ble = None;
    if config.monitoring.beacon && config.ble.enabled {
        let mut source = BleSource::new(config.ble.config.clone());
        match source.start(tx.clone()).await {
            Ok(()) => ble = Some(source),
            Err(err) => manager.report_error(&err),
        }
    }
    drop(tx);

    tracing::info!("zonekitd running, press ctrl-c to stop");

    loop {
        tokio::select! {
            sample = rx.recv() => match sample {
                Some(sample) => manager.handle_sample(sample).await,
                None => {
                    tracing::info!("all sensing sources finished");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    if let Some(mut source) = virtual_gps {
        source.stop().await?;
    }
    if let Some(mut source) = ble {
        source.stop().await?;
    }
    manager.stop_monitoring_zones();

    Ok(())
}

/// A small radius zone around the origin with notification triggers, matched
/// to the virtual adapter's default walk.
fn demo_zone() -> Result<Zone, ZoneKitError> {
    let mut zone = Zone::builder()
        .uid("demo-zone")
        .name("Demo zone")
        .kind(ZoneKind::Radius {
            center: Coordinate::new(0.0, 0.0),
            radius_m: 50.0,
        })
        .build()?;

    let mut enter = Trigger::builder()
        .uid("demo-enter")
        .name("demo enter")
        .event(TriggerEvent::Enter)
        .build()?;
    enter.add_action(Action::notification(NotificationTemplate::new(
        "Entered the demo zone",
    )));
    zone.add_trigger(enter);

    let mut exit = Trigger::builder()
        .uid("demo-exit")
        .name("demo exit")
        .event(TriggerEvent::Exit)
        .build()?;
    exit.add_action(Action::notification(NotificationTemplate::new(
        "Left the demo zone",
    )));
    zone.add_trigger(exit);

    Ok(zone)
}

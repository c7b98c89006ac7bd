//! # zonekit-app
//!
//! Application layer — the trigger engine and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SensingSource` — GPS / beacon ranging / indoor positioning feeds
//!   - `NotificationScheduler` — local notification delivery
//!   - `CallbackTransport` — outbound HTTP for URL callback actions
//!   - `ZoneDirectory` — remote zone-definition fetch
//!   - `ZoneCache` — offline zone-set storage
//!   - `EventPublisher` — zone/trigger event broadcast
//! - Provide the **TriggerManager**: the monitored zone set, sample routing,
//!   the two-phase fire protocol, and descriptor-based action attachment
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//! - Provide the **zone sync service** (fetch, cache write-through, offline
//!   fallback)
//!
//! ## Dependency rule
//! Depends on `zonekit-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod event_bus;
pub mod manager;
pub mod ports;
pub mod services;

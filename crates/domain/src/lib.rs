//! # zonekit-domain
//!
//! Pure domain model for the zonekit geofencing engine.
//!
//! ## Responsibilities
//! - Foundational types: typed uids, error conventions, timestamps
//! - Geometry primitives (great-circle distance, point-in-polygon)
//! - Define **Zones** (monitored physical areas with an occupancy state machine)
//! - Define **Triggers** (conditions bound to a zone, with debounce and
//!   fire-count limits)
//! - Define **Actions** (units of work executed on trigger firing)
//! - Define **Descriptors** (predicates used to select zones/triggers)
//! - Define **Events** (zone state-change and trigger fire records)
//! - Define **Definitions** (wire/cache DTOs for the zone set)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod beacon;
pub mod definition;
pub mod descriptor;
pub mod event;
pub mod geo;
pub mod trigger;
pub mod zone;

//! Zone — a monitored physical area with an occupancy state machine.
//!
//! A zone models an area the device may be inside or outside of, with a
//! list of triggers that fire on state transitions. Containment is derived
//! from the latest sensing input applied to the zone (a GPS fix for geo
//! zones, a ranging sample for beacon zones, an external containment flag
//! for indoor zones); `update` folds that input into the state machine and
//! reports which triggers qualified.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::beacon::{Beacon, Proximity, ProximitySample};
use crate::descriptor::{Describable, Descriptor};
use crate::error::{ValidationError, ZoneKitError};
use crate::geo::{self, Coordinate};
use crate::id::{TriggerUid, ZoneUid};
use crate::time::{self, Timestamp};
use crate::trigger::{FireContext, Trigger};

/// Sentinel for [`Zone::distance_away`] when no distance can be computed.
pub const DISTANCE_UNKNOWN: f64 = -1.0;

/// Ranging samples older than this no longer establish containment; the
/// zone holds its last known state until a fresh sample arrives.
pub const PROXIMITY_SAMPLE_TTL: Duration = Duration::from_secs(30);

/// The occupancy state of a zone.
///
/// Transitions follow `Outside → Entered → Dwelling → Exited → Outside`,
/// evaluated once per [`Zone::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    /// The device is outside of the zone.
    #[default]
    Outside,
    /// The device has just entered the zone.
    Entered,
    /// The device is currently dwelling inside the zone.
    Dwelling,
    /// The device has just exited the zone.
    Exited,
}

impl ZoneState {
    /// Whether this state counts as "inside" for transition purposes.
    #[must_use]
    pub fn is_inside(self) -> bool {
        matches!(self, Self::Entered | Self::Dwelling)
    }
}

impl std::fmt::Display for ZoneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outside => f.write_str("outside"),
            Self::Entered => f.write_str("entered"),
            Self::Dwelling => f.write_str("dwelling"),
            Self::Exited => f.write_str("exited"),
        }
    }
}

/// How a zone derives containment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneKind {
    /// Circular area: a geographical center plus a radius in meters.
    Radius {
        center: Coordinate,
        radius_m: f64,
    },
    /// Arbitrary polygon of geographical coordinates.
    Polygon { vertices: Vec<Coordinate> },
    /// Proximity to a Bluetooth beacon at or closer than a threshold.
    BeaconProximity {
        beacon: Beacon,
        threshold: Proximity,
        /// Whether the zone should keep being monitored in the background.
        #[serde(default)]
        background_ping: bool,
    },
    /// Containment decided by an external indoor-positioning collaborator.
    Indoor,
}

impl ZoneKind {
    /// Stable tag for descriptors and logs.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Radius { .. } => "radius",
            Self::Polygon { .. } => "polygon",
            Self::BeaconProximity { .. } => "beacon_proximity",
            Self::Indoor => "indoor",
        }
    }

    /// Whether this kind is driven by GPS location samples.
    #[must_use]
    pub fn is_geo(&self) -> bool {
        matches!(self, Self::Radius { .. } | Self::Polygon { .. })
    }

    /// Whether this kind is driven by beacon ranging samples.
    #[must_use]
    pub fn is_beacon(&self) -> bool {
        matches!(self, Self::BeaconProximity { .. })
    }
}

/// Result of one [`Zone::update`] pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneUpdate {
    /// `(old, new)` when the occupancy state changed.
    pub transition: Option<(ZoneState, ZoneState)>,
    /// Uids of owned triggers that qualified, in attachment order.
    pub firing: Vec<TriggerUid>,
}

/// A monitored physical area owning a set of triggers.
#[derive(Debug, Clone)]
pub struct Zone {
    uid: ZoneUid,
    pub name: String,
    kind: ZoneKind,
    state: ZoneState,
    dwell_time: Duration,
    distance_away: f64,
    triggers: Vec<Trigger>,
    user_location: Option<Coordinate>,
    proximity_sample: Option<ProximitySample>,
    indoor_inside: Option<bool>,
    motion_pending: bool,
    last_update_at: Option<Timestamp>,
}

impl Zone {
    /// Create a builder for constructing a [`Zone`].
    #[must_use]
    pub fn builder() -> ZoneBuilder {
        ZoneBuilder::default()
    }

    /// Construct a circular geo zone with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when `radius_m` is not positive.
    pub fn geo_radius(center: Coordinate, radius_m: f64) -> Result<Self, ZoneKitError> {
        Self::builder()
            .kind(ZoneKind::Radius { center, radius_m })
            .build()
    }

    /// Construct a polygonal geo zone with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] for fewer than three vertices.
    pub fn geo_polygon(vertices: Vec<Coordinate>) -> Result<Self, ZoneKitError> {
        Self::builder().kind(ZoneKind::Polygon { vertices }).build()
    }

    /// Construct a beacon proximity zone with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] only for builder-level invariants
    /// (none today); the `Result` keeps the constructor uniform.
    pub fn beacon(beacon: Beacon, threshold: Proximity) -> Result<Self, ZoneKitError> {
        Self::builder()
            .kind(ZoneKind::BeaconProximity {
                beacon,
                threshold,
                background_ping: false,
            })
            .build()
    }

    /// Construct an indoor zone with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] only for builder-level invariants
    /// (none today); the `Result` keeps the constructor uniform.
    pub fn indoor() -> Result<Self, ZoneKitError> {
        Self::builder().kind(ZoneKind::Indoor).build()
    }

    #[must_use]
    pub fn uid(&self) -> &ZoneUid {
        &self.uid
    }

    #[must_use]
    pub fn kind(&self) -> &ZoneKind {
        &self.kind
    }

    #[must_use]
    pub fn state(&self) -> ZoneState {
        self.state
    }

    /// How long the device has been dwelling inside the zone.
    #[must_use]
    pub fn dwell_time(&self) -> Duration {
        self.dwell_time
    }

    /// Distance in meters between the device and the zone;
    /// [`DISTANCE_UNKNOWN`] when it cannot be computed.
    #[must_use]
    pub fn distance_away(&self) -> f64 {
        self.distance_away
    }

    #[must_use]
    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    #[must_use]
    pub fn trigger(&self, uid: &TriggerUid) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.uid() == uid)
    }

    pub fn trigger_mut(&mut self, uid: &TriggerUid) -> Option<&mut Trigger> {
        self.triggers.iter_mut().find(|t| t.uid() == uid)
    }

    /// Add a trigger; a trigger with the same uid is replaced in place.
    pub fn add_trigger(&mut self, mut trigger: Trigger) {
        trigger.set_zone(&self.uid);
        if let Some(existing) = self.triggers.iter_mut().find(|t| t.uid() == trigger.uid()) {
            *existing = trigger;
        } else {
            self.triggers.push(trigger);
        }
    }

    /// Triggers matching the given descriptor, in attachment order.
    #[must_use]
    pub fn triggers_matching_descriptor(&self, descriptor: &Descriptor) -> Vec<&Trigger> {
        self.triggers
            .iter()
            .filter(|t| descriptor.evaluate(*t))
            .collect()
    }

    /// Latest GPS fix for geo zones. Apply before calling [`update`](Self::update).
    pub fn set_user_location(&mut self, location: Coordinate) {
        self.user_location = Some(location);
    }

    /// Latest ranging measurement for beacon zones.
    pub fn set_proximity_sample(&mut self, sample: ProximitySample) {
        self.proximity_sample = Some(sample);
    }

    /// Containment verdict from the indoor-positioning collaborator.
    pub fn set_indoor_containment(&mut self, inside: bool) {
        self.indoor_inside = Some(inside);
    }

    /// Note a beacon motion signal; consumed by the next [`update`](Self::update).
    /// Ignored for zones that are not beacon based.
    pub fn note_motion(&mut self) {
        if self.kind.is_beacon() {
            self.motion_pending = true;
        }
    }

    /// Adopt the internal state of a previous instance with the same uid so
    /// that a refreshed definition does not spuriously re-fire its triggers.
    /// Trigger bookkeeping is matched by trigger uid.
    pub fn set_internal_state_same_as(&mut self, other: &Self) {
        self.state = other.state;
        self.dwell_time = other.dwell_time;
        self.distance_away = other.distance_away;
        self.user_location = other.user_location;
        self.proximity_sample = other.proximity_sample;
        self.indoor_inside = other.indoor_inside;
        self.motion_pending = other.motion_pending;
        self.last_update_at = other.last_update_at;
        for trigger in &mut self.triggers {
            if let Some(previous) = other.trigger(trigger.uid()) {
                trigger.set_internal_state_to_same_as(previous);
            }
        }
    }

    /// Fold the latest input into the state machine.
    ///
    /// Recomputes distance, advances the occupancy state, accumulates dwell
    /// time, and evaluates every owned trigger in attachment order. When
    /// containment cannot be determined (no sample yet, or a stale ranging
    /// sample) the zone holds its last known state; motion triggers may
    /// still qualify.
    pub fn update(&mut self, now: Timestamp) -> ZoneUpdate {
        let old_state = self.state;
        let contained = self.containment(now);
        self.distance_away = self.compute_distance(contained);
        let motion = std::mem::take(&mut self.motion_pending);

        let Some(inside) = contained else {
            let ctx = FireContext {
                state: self.state,
                entered: false,
                exited: false,
                dwell_time: self.dwell_time,
                motion,
            };
            let firing = self.qualifying_triggers(&ctx, now);
            self.last_update_at = Some(now);
            return ZoneUpdate {
                transition: None,
                firing,
            };
        };

        let was_inside = old_state.is_inside();
        let new_state = match (was_inside, inside) {
            (false, true) => ZoneState::Entered,
            (true, true) => ZoneState::Dwelling,
            (true, false) => ZoneState::Exited,
            (false, false) => ZoneState::Outside,
        };

        match new_state {
            ZoneState::Entered => {
                self.dwell_time = Duration::ZERO;
                for trigger in &mut self.triggers {
                    trigger.begin_dwell_episode();
                }
            }
            ZoneState::Dwelling => {
                if let Some(last) = self.last_update_at {
                    self.dwell_time += time::elapsed(last, now);
                }
            }
            ZoneState::Exited | ZoneState::Outside => {
                self.dwell_time = Duration::ZERO;
            }
        }
        self.state = new_state;

        let ctx = FireContext {
            state: new_state,
            entered: new_state == ZoneState::Entered,
            exited: new_state == ZoneState::Exited,
            dwell_time: self.dwell_time,
            motion,
        };
        let firing = self.qualifying_triggers(&ctx, now);
        self.last_update_at = Some(now);

        ZoneUpdate {
            transition: (old_state != new_state).then_some((old_state, new_state)),
            firing,
        }
    }

    fn qualifying_triggers(&self, ctx: &FireContext, now: Timestamp) -> Vec<TriggerUid> {
        self.triggers
            .iter()
            .filter(|t| t.should_fire(ctx, now))
            .map(|t| t.uid().clone())
            .collect()
    }

    /// Whether the device is inside the zone, or `None` when the latest
    /// input does not allow a verdict.
    fn containment(&self, now: Timestamp) -> Option<bool> {
        match &self.kind {
            ZoneKind::Radius { center, radius_m } => self
                .user_location
                .map(|loc| geo::distance_meters(*center, loc) <= *radius_m),
            ZoneKind::Polygon { vertices } => self
                .user_location
                .map(|loc| geo::point_in_polygon(loc, vertices)),
            ZoneKind::BeaconProximity { threshold, .. } => match self.proximity_sample {
                Some(sample) if time::elapsed(sample.at, now) <= PROXIMITY_SAMPLE_TTL => {
                    Some(sample.proximity.at_least(*threshold))
                }
                _ => None,
            },
            ZoneKind::Indoor => self.indoor_inside,
        }
    }

    fn compute_distance(&self, contained: Option<bool>) -> f64 {
        match &self.kind {
            ZoneKind::Radius { center, radius_m } => self
                .user_location
                .map_or(DISTANCE_UNKNOWN, |loc| {
                    (geo::distance_meters(*center, loc) - radius_m).max(0.0)
                }),
            ZoneKind::Polygon { vertices } => match (self.user_location, contained) {
                (Some(_), Some(true)) => 0.0,
                // Outside distance is approximated by the nearest vertex.
                (Some(loc), _) => vertices
                    .iter()
                    .map(|v| geo::distance_meters(loc, *v))
                    .fold(f64::INFINITY, f64::min),
                (None, _) => DISTANCE_UNKNOWN,
            },
            ZoneKind::BeaconProximity { .. } => match (contained, self.proximity_sample) {
                (Some(_), Some(sample)) if sample.accuracy_m >= 0.0 => sample.accuracy_m,
                _ => DISTANCE_UNKNOWN,
            },
            ZoneKind::Indoor => {
                if contained == Some(true) {
                    0.0
                } else {
                    DISTANCE_UNKNOWN
                }
            }
        }
    }
}

impl Describable for Zone {
    fn uid(&self) -> &str {
        self.uid.as_str()
    }

    fn field(&self, key: &str) -> Option<serde_json::Value> {
        match key {
            "name" => Some(serde_json::Value::String(self.name.clone())),
            "kind" => Some(serde_json::Value::String(self.kind.tag().to_string())),
            "state" => Some(serde_json::Value::String(self.state.to_string())),
            "distance_away" => Some(serde_json::json!(self.distance_away)),
            "dwell_time_secs" => Some(serde_json::json!(self.dwell_time.as_secs_f64())),
            _ => None,
        }
    }
}

/// Step-by-step builder for [`Zone`].
#[derive(Debug, Default)]
pub struct ZoneBuilder {
    uid: Option<ZoneUid>,
    name: Option<String>,
    kind: Option<ZoneKind>,
    triggers: Vec<Trigger>,
}

impl ZoneBuilder {
    #[must_use]
    pub fn uid(mut self, uid: impl Into<ZoneUid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: ZoneKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// Consume the builder, validate, and return a [`Zone`].
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when the uid is empty, the kind
    /// is missing, a radius is not positive, or a polygon is degenerate.
    pub fn build(self) -> Result<Zone, ZoneKitError> {
        let uid = self.uid.unwrap_or_else(ZoneUid::random);
        if uid.as_str().is_empty() {
            return Err(ValidationError::EmptyUid.into());
        }
        let kind = self.kind.ok_or(ValidationError::MissingKind)?;
        match &kind {
            ZoneKind::Radius { radius_m, .. } if *radius_m <= 0.0 => {
                return Err(ValidationError::NonPositiveRadius.into());
            }
            ZoneKind::Polygon { vertices } if vertices.len() < 3 => {
                return Err(ValidationError::DegeneratePolygon.into());
            }
            _ => {}
        }
        let mut zone = Zone {
            uid,
            name: self.name.unwrap_or_default(),
            kind,
            state: ZoneState::Outside,
            dwell_time: Duration::ZERO,
            distance_away: DISTANCE_UNKNOWN,
            triggers: Vec::new(),
            user_location: None,
            proximity_sample: None,
            indoor_inside: None,
            motion_pending: false,
            last_update_at: None,
        };
        for trigger in self.triggers {
            zone.add_trigger(trigger);
        }
        Ok(zone)
    }
}

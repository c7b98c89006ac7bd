//! Trigger — a condition bound to a zone that fires actions when met.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::descriptor::Describable;
use crate::error::{ValidationError, ZoneKitError};
use crate::id::{TriggerUid, ZoneUid};
use crate::time::{self, Timestamp};
use crate::zone::ZoneState;

/// The kinds of zone events that can cause a trigger to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// Entering the parent zone.
    Enter,
    /// Exiting the parent zone.
    Exit,
    /// Remaining inside the parent zone for a configured duration.
    Dwell,
    /// The zone's beacon reported that it is in motion.
    Motion,
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enter => f.write_str("enter"),
            Self::Exit => f.write_str("exit"),
            Self::Dwell => f.write_str("dwell"),
            Self::Motion => f.write_str("motion"),
        }
    }
}

/// Snapshot of what just happened to the parent zone during one update,
/// handed to [`Trigger::should_fire`].
#[derive(Debug, Clone, Copy)]
pub struct FireContext {
    /// The zone's state after the transition.
    pub state: ZoneState,
    /// The zone was entered on this update.
    pub entered: bool,
    /// The zone was exited on this update.
    pub exited: bool,
    /// Accumulated dwell time after this update.
    pub dwell_time: Duration,
    /// A beacon motion signal was consumed by this update.
    pub motion: bool,
}

/// A condition owned by one zone that, when satisfied, executes its actions
/// subject to a minimum refire interval and a maximum fire count.
#[derive(Debug, Clone)]
pub struct Trigger {
    uid: TriggerUid,
    pub name: String,
    event: TriggerEvent,
    dwell_time: Duration,
    frequency: Duration,
    limit: u32,
    fire_count: u32,
    last_fired_at: Option<Timestamp>,
    dwell_satisfied: bool,
    actions: Vec<Action>,
    zone: Option<ZoneUid>,
}

impl Trigger {
    /// Create a builder for constructing a [`Trigger`].
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Construct an enter/exit/motion trigger with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] for [`TriggerEvent::Dwell`] —
    /// dwell triggers need a dwell time, use [`Trigger::on_dwell`].
    pub fn on_event(
        event: TriggerEvent,
        frequency: Duration,
        limit: u32,
    ) -> Result<Self, ZoneKitError> {
        Self::builder()
            .event(event)
            .frequency(frequency)
            .limit(limit)
            .build()
    }

    /// Construct a dwell trigger with a fresh random uid.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when `dwell_time` is zero.
    pub fn on_dwell(
        dwell_time: Duration,
        frequency: Duration,
        limit: u32,
    ) -> Result<Self, ZoneKitError> {
        Self::builder()
            .event(TriggerEvent::Dwell)
            .dwell_time(dwell_time)
            .frequency(frequency)
            .limit(limit)
            .build()
    }

    #[must_use]
    pub fn uid(&self) -> &TriggerUid {
        &self.uid
    }

    #[must_use]
    pub fn event(&self) -> TriggerEvent {
        self.event
    }

    /// Required continuous presence before a dwell trigger fires.
    /// Only meaningful when [`event`](Self::event) is [`TriggerEvent::Dwell`].
    #[must_use]
    pub fn dwell_time(&self) -> Duration {
        self.dwell_time
    }

    /// Minimum time that must pass before this trigger may fire again.
    #[must_use]
    pub fn frequency(&self) -> Duration {
        self.frequency
    }

    /// Maximum number of fires; zero means unlimited.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn fire_count(&self) -> u32 {
        self.fire_count
    }

    #[must_use]
    pub fn last_fired_at(&self) -> Option<Timestamp> {
        self.last_fired_at
    }

    /// The zone that owns this trigger, once added to one.
    #[must_use]
    pub fn zone(&self) -> Option<&ZoneUid> {
        self.zone.as_ref()
    }

    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Attach an action; its owning-trigger back-reference is set here.
    pub fn add_action(&mut self, mut action: Action) {
        action.attach_to(&self.uid);
        self.actions.push(action);
    }

    pub(crate) fn set_zone(&mut self, zone: &ZoneUid) {
        self.zone = Some(zone.clone());
    }

    /// Whether this trigger should fire for the transition described by `ctx`.
    ///
    /// Pure with respect to the parent zone's state and this trigger's own
    /// bookkeeping: checks exhaustion (`limit`), debounce (`frequency`), then
    /// matches the event kind against what just happened.
    #[must_use]
    pub fn should_fire(&self, ctx: &FireContext, now: Timestamp) -> bool {
        if self.limit > 0 && self.fire_count >= self.limit {
            return false;
        }
        if let Some(last) = self.last_fired_at {
            if time::elapsed(last, now) < self.frequency {
                return false;
            }
        }
        match self.event {
            TriggerEvent::Enter => ctx.entered,
            TriggerEvent::Exit => ctx.exited,
            TriggerEvent::Dwell => {
                ctx.state == ZoneState::Dwelling
                    && !self.dwell_satisfied
                    && ctx.dwell_time >= self.dwell_time
            }
            TriggerEvent::Motion => ctx.motion,
        }
    }

    /// Record a fire: increment the count and stamp the fire time.
    ///
    /// Dwell triggers also mark the current dwell episode as satisfied so
    /// they fire at most once per continuous stay. Callers are expected to
    /// have checked [`should_fire`](Self::should_fire) on this update.
    pub fn record_fire(&mut self, now: Timestamp) {
        self.fire_count += 1;
        self.last_fired_at = Some(now);
        if self.event == TriggerEvent::Dwell {
            self.dwell_satisfied = true;
        }
    }

    /// Reset per-episode bookkeeping; called when the parent zone is entered.
    pub(crate) fn begin_dwell_episode(&mut self) {
        self.dwell_satisfied = false;
    }

    /// Adopt the fire bookkeeping of a previous instance with the same uid,
    /// so a refreshed definition does not treat itself as never-fired.
    pub fn set_internal_state_to_same_as(&mut self, other: &Self) {
        self.fire_count = other.fire_count;
        self.last_fired_at = other.last_fired_at;
        self.dwell_satisfied = other.dwell_satisfied;
    }
}

impl Describable for Trigger {
    fn uid(&self) -> &str {
        self.uid.as_str()
    }

    fn field(&self, key: &str) -> Option<serde_json::Value> {
        match key {
            "name" => Some(serde_json::Value::String(self.name.clone())),
            "event" => Some(serde_json::Value::String(self.event.to_string())),
            "dwell_time_secs" => Some(serde_json::json!(self.dwell_time.as_secs_f64())),
            "frequency_secs" => Some(serde_json::json!(self.frequency.as_secs_f64())),
            "limit" => Some(serde_json::Value::from(self.limit)),
            "fire_count" => Some(serde_json::Value::from(self.fire_count)),
            _ => None,
        }
    }
}

/// Step-by-step builder for [`Trigger`].
#[derive(Debug, Default)]
pub struct TriggerBuilder {
    uid: Option<TriggerUid>,
    name: Option<String>,
    event: Option<TriggerEvent>,
    dwell_time: Option<Duration>,
    frequency: Option<Duration>,
    limit: Option<u32>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn uid(mut self, uid: impl Into<TriggerUid>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn event(mut self, event: TriggerEvent) -> Self {
        self.event = Some(event);
        self
    }

    #[must_use]
    pub fn dwell_time(mut self, dwell_time: Duration) -> Self {
        self.dwell_time = Some(dwell_time);
        self
    }

    #[must_use]
    pub fn frequency(mut self, frequency: Duration) -> Self {
        self.frequency = Some(frequency);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Consume the builder, validate, and return a [`Trigger`].
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when the uid is empty or a dwell
    /// trigger has no positive dwell time.
    pub fn build(self) -> Result<Trigger, ZoneKitError> {
        let uid = self.uid.unwrap_or_else(TriggerUid::random);
        if uid.as_str().is_empty() {
            return Err(ValidationError::EmptyUid.into());
        }
        let event = self.event.unwrap_or(TriggerEvent::Enter);
        let dwell_time = self.dwell_time.unwrap_or(Duration::ZERO);
        if event == TriggerEvent::Dwell && dwell_time.is_zero() {
            return Err(ValidationError::ZeroDwellTime.into());
        }
        Ok(Trigger {
            uid,
            name: self.name.unwrap_or_default(),
            event,
            dwell_time,
            frequency: self.frequency.unwrap_or(Duration::ZERO),
            limit: self.limit.unwrap_or(0),
            fire_count: 0,
            last_fired_at: None,
            dwell_satisfied: false,
            actions: Vec::new(),
            zone: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    fn entered_ctx() -> FireContext {
        FireContext {
            state: ZoneState::Entered,
            entered: true,
            exited: false,
            dwell_time: Duration::ZERO,
            motion: false,
        }
    }

    fn dwelling_ctx(dwell: Duration) -> FireContext {
        FireContext {
            state: ZoneState::Dwelling,
            entered: false,
            exited: false,
            dwell_time: dwell,
            motion: false,
        }
    }

    #[test]
    fn should_fire_enter_trigger_on_entered_transition() {
        let trigger = Trigger::on_event(TriggerEvent::Enter, Duration::ZERO, 0).unwrap();
        assert!(trigger.should_fire(&entered_ctx(), at(0)));
    }

    #[test]
    fn should_not_fire_enter_trigger_without_entered_transition() {
        let trigger = Trigger::on_event(TriggerEvent::Enter, Duration::ZERO, 0).unwrap();
        assert!(!trigger.should_fire(&dwelling_ctx(Duration::from_secs(5)), at(0)));
    }

    #[test]
    fn should_fire_exit_trigger_only_on_exited_transition() {
        let trigger = Trigger::on_event(TriggerEvent::Exit, Duration::ZERO, 0).unwrap();
        let exited = FireContext {
            state: ZoneState::Exited,
            entered: false,
            exited: true,
            dwell_time: Duration::ZERO,
            motion: false,
        };
        assert!(trigger.should_fire(&exited, at(0)));
        assert!(!trigger.should_fire(&entered_ctx(), at(0)));
    }

    #[test]
    fn should_stop_firing_when_limit_reached() {
        let mut trigger = Trigger::on_event(TriggerEvent::Enter, Duration::ZERO, 3).unwrap();
        for i in 0..3 {
            assert!(trigger.should_fire(&entered_ctx(), at(i)));
            trigger.record_fire(at(i));
        }
        assert_eq!(trigger.fire_count(), 3);
        assert!(!trigger.should_fire(&entered_ctx(), at(100)));
    }

    #[test]
    fn should_treat_zero_limit_as_unlimited() {
        let mut trigger = Trigger::on_event(TriggerEvent::Enter, Duration::ZERO, 0).unwrap();
        for i in 0..50 {
            assert!(trigger.should_fire(&entered_ctx(), at(i)));
            trigger.record_fire(at(i));
        }
        assert_eq!(trigger.fire_count(), 50);
    }

    #[test]
    fn should_debounce_by_frequency() {
        let mut trigger =
            Trigger::on_event(TriggerEvent::Enter, Duration::from_secs(300), 0).unwrap();
        assert!(trigger.should_fire(&entered_ctx(), at(0)));
        trigger.record_fire(at(0));

        assert!(!trigger.should_fire(&entered_ctx(), at(100)));
        assert!(trigger.should_fire(&entered_ctx(), at(301)));
    }

    #[test]
    fn should_fire_dwell_trigger_once_threshold_is_reached() {
        let trigger =
            Trigger::on_dwell(Duration::from_secs(60), Duration::ZERO, 0).unwrap();
        assert!(!trigger.should_fire(&dwelling_ctx(Duration::from_secs(59)), at(59)));
        assert!(trigger.should_fire(&dwelling_ctx(Duration::from_secs(60)), at(60)));
    }

    #[test]
    fn should_fire_dwell_trigger_once_per_episode() {
        let mut trigger =
            Trigger::on_dwell(Duration::from_secs(60), Duration::ZERO, 0).unwrap();

        assert!(trigger.should_fire(&dwelling_ctx(Duration::from_secs(60)), at(60)));
        trigger.record_fire(at(60));

        // Still dwelling, threshold still met — but already satisfied.
        for s in 61..300 {
            assert!(!trigger.should_fire(&dwelling_ctx(Duration::from_secs(s)), at(s as i64)));
        }

        // Re-entry starts a new episode.
        trigger.begin_dwell_episode();
        assert!(trigger.should_fire(&dwelling_ctx(Duration::from_secs(60)), at(400)));
    }

    #[test]
    fn should_fire_motion_trigger_on_motion_signal() {
        let trigger = Trigger::on_event(TriggerEvent::Motion, Duration::ZERO, 0).unwrap();
        let moving = FireContext {
            state: ZoneState::Outside,
            entered: false,
            exited: false,
            dwell_time: Duration::ZERO,
            motion: true,
        };
        assert!(trigger.should_fire(&moving, at(0)));
        let still = FireContext {
            motion: false,
            ..moving
        };
        assert!(!trigger.should_fire(&still, at(0)));
    }

    #[test]
    fn should_apply_frequency_and_limit_to_motion_triggers() {
        let mut trigger =
            Trigger::on_event(TriggerEvent::Motion, Duration::from_secs(10), 2).unwrap();
        let moving = FireContext {
            state: ZoneState::Outside,
            entered: false,
            exited: false,
            dwell_time: Duration::ZERO,
            motion: true,
        };
        assert!(trigger.should_fire(&moving, at(0)));
        trigger.record_fire(at(0));
        assert!(!trigger.should_fire(&moving, at(5)));
        assert!(trigger.should_fire(&moving, at(11)));
        trigger.record_fire(at(11));
        assert!(!trigger.should_fire(&moving, at(100)));
    }

    #[test]
    fn should_copy_bookkeeping_from_previous_instance() {
        let mut old = Trigger::builder()
            .uid("t1")
            .event(TriggerEvent::Enter)
            .frequency(Duration::from_secs(300))
            .build()
            .unwrap();
        old.record_fire(at(0));

        let mut fresh = Trigger::builder()
            .uid("t1")
            .event(TriggerEvent::Enter)
            .frequency(Duration::from_secs(300))
            .build()
            .unwrap();
        fresh.set_internal_state_to_same_as(&old);

        assert_eq!(fresh.fire_count(), 1);
        assert!(!fresh.should_fire(&entered_ctx(), at(100)));
        assert!(fresh.should_fire(&entered_ctx(), at(301)));
    }

    #[test]
    fn should_set_action_back_reference_on_add() {
        let mut trigger = Trigger::builder().uid("t1").build().unwrap();
        trigger.add_action(Action::callback(|| {}));
        assert_eq!(
            trigger.actions()[0].trigger(),
            Some(&TriggerUid::new("t1"))
        );
    }

    #[test]
    fn should_reject_dwell_trigger_without_dwell_time() {
        let result = Trigger::builder().event(TriggerEvent::Dwell).build();
        assert!(matches!(
            result,
            Err(ZoneKitError::Validation(ValidationError::ZeroDwellTime))
        ));
    }

    #[test]
    fn should_reject_empty_uid() {
        let result = Trigger::builder().uid("").build();
        assert!(matches!(
            result,
            Err(ZoneKitError::Validation(ValidationError::EmptyUid))
        ));
    }

    #[test]
    fn should_expose_fields_to_descriptors() {
        let trigger = Trigger::builder()
            .uid("t1")
            .name("front door")
            .event(TriggerEvent::Enter)
            .limit(3)
            .build()
            .unwrap();
        assert_eq!(Describable::uid(&trigger), "t1");
        assert_eq!(
            trigger.field("event"),
            Some(serde_json::Value::String("enter".to_string()))
        );
        assert_eq!(trigger.field("limit"), Some(serde_json::Value::from(3)));
        assert_eq!(trigger.field("bogus"), None);
    }
}

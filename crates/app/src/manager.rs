//! Trigger manager — owns the monitored zone set and drives trigger firing.
//!
//! Sensing samples come in through [`handle_sample`](TriggerManager::handle_sample);
//! the manager routes each one to the zones it concerns, folds it into their
//! state machines, and runs the two-phase fire protocol for every qualifying
//! trigger: announce, poll the fire observers for a veto, record the fire,
//! dispatch actions, announce again.
//!
//! All zone mutation happens on the caller's timeline — the binary drives a
//! single consumer loop over one sample channel, which serializes updates
//! and makes interleaved double-fires impossible.

use std::collections::BTreeMap;
use std::sync::Arc;

use zonekit_domain::action::{Action, ActionKind};
use zonekit_domain::definition::ZoneDefinition;
use zonekit_domain::descriptor::Descriptor;
use zonekit_domain::error::ZoneKitError;
use zonekit_domain::event::ZoneEvent;
use zonekit_domain::id::{TriggerUid, ZoneUid};
use zonekit_domain::time::Timestamp;
use zonekit_domain::zone::{Zone, ZoneKind, ZoneState};

use crate::ports::{
    CallbackRequest, CallbackTransport, EventPublisher, NotificationRequest,
    NotificationScheduler, SensorKind, SensorSample,
};

/// Error hook invoked for every collaborator failure. When unset, failures
/// are logged instead.
pub type ErrorHandler = Arc<dyn Fn(&ZoneKitError) + Send + Sync>;

/// Verdict returned by a fire observer's pre-fire pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    Proceed,
    Cancel,
}

/// What is about to fire (or just fired).
#[derive(Debug, Clone, PartialEq)]
pub struct FireNotice {
    pub zone: ZoneUid,
    pub trigger: TriggerUid,
    pub at: Timestamp,
}

/// Synchronous observer of trigger firings.
///
/// `before_fire` runs to completion before the manager decides whether to
/// proceed — returning [`FireDecision::Cancel`] vetoes this occurrence only:
/// the zone transition stands, but the trigger's bookkeeping is untouched
/// and none of its actions execute.
pub trait FireObserver: Send + Sync {
    fn before_fire(&self, _notice: &FireNotice) -> FireDecision {
        FireDecision::Proceed
    }

    fn after_fire(&self, _notice: &FireNotice) {}
}

impl<F> FireObserver for F
where
    F: Fn(&FireNotice) -> FireDecision + Send + Sync,
{
    fn before_fire(&self, notice: &FireNotice) -> FireDecision {
        self(notice)
    }
}

/// Which sensing capabilities currently feed the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitoringScope {
    pub gps: bool,
    pub beacon: bool,
}

impl MonitoringScope {
    #[must_use]
    pub fn any(self) -> bool {
        self.gps || self.beacon
    }

    fn admits(self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Gps => self.gps,
            SensorKind::Beacon => self.beacon,
            SensorKind::Indoor => self.any(),
        }
    }
}

/// Owns the monitored zone set and routes samples, firings, and actions.
pub struct TriggerManager<P, N, C> {
    zones: BTreeMap<ZoneUid, Zone>,
    scope: MonitoringScope,
    publisher: P,
    notifier: N,
    transport: Arc<C>,
    observers: Vec<Box<dyn FireObserver>>,
    error_handler: Option<ErrorHandler>,
}

impl<P, N, C> TriggerManager<P, N, C>
where
    P: EventPublisher,
    N: NotificationScheduler,
    C: CallbackTransport + Send + Sync + 'static,
{
    /// Create a manager with no monitored zones and monitoring stopped.
    pub fn new(publisher: P, notifier: N, transport: C) -> Self {
        Self {
            zones: BTreeMap::new(),
            scope: MonitoringScope::default(),
            publisher,
            notifier,
            transport: Arc::new(transport),
            observers: Vec::new(),
            error_handler: None,
        }
    }

    /// Start monitoring all zone kinds. Idempotent.
    pub fn start_monitoring_zones(&mut self) {
        self.scope = MonitoringScope {
            gps: true,
            beacon: true,
        };
        tracing::info!("monitoring all zones");
    }

    /// Start monitoring beacon zones only. Idempotent; combines with
    /// [`start_monitoring_gps_zones`](Self::start_monitoring_gps_zones).
    pub fn start_monitoring_beacon_zones(&mut self) {
        self.scope.beacon = true;
        tracing::info!("monitoring beacon zones");
    }

    /// Start monitoring GPS zones only. Idempotent; combines with
    /// [`start_monitoring_beacon_zones`](Self::start_monitoring_beacon_zones).
    pub fn start_monitoring_gps_zones(&mut self) {
        self.scope.gps = true;
        tracing::info!("monitoring GPS zones");
    }

    /// Stop all monitoring and clear the monitored zone set, regardless of
    /// which start variant was used.
    pub fn stop_monitoring_zones(&mut self) {
        self.scope = MonitoringScope::default();
        let dropped = self.zones.len();
        self.zones.clear();
        tracing::info!(dropped, "monitoring stopped");
    }

    /// The currently active monitoring scope.
    #[must_use]
    pub fn scope(&self) -> MonitoringScope {
        self.scope
    }

    /// Insert a zone into the monitored set.
    ///
    /// A uid collision overwrites the existing zone (last writer wins) —
    /// the previous zone's state and fire bookkeeping are lost. Use
    /// [`replace_zones`](Self::replace_zones) to refresh definitions while
    /// keeping state.
    pub fn add_zone(&mut self, zone: Zone) {
        let uid = zone.uid().clone();
        if let Some(previous) = self.zones.insert(uid.clone(), zone) {
            tracing::warn!(
                zone = %uid,
                previous = %previous.name,
                "zone overwritten by add_zone; its state and fire counts are lost"
            );
        }
    }

    /// The monitored zones, ordered by uid.
    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    #[must_use]
    pub fn zone(&self, uid: &ZoneUid) -> Option<&Zone> {
        self.zones.get(uid)
    }

    /// The zones the device is currently inside of (state is Dwelling).
    #[must_use]
    pub fn zones_inside(&self) -> Vec<&Zone> {
        self.zones
            .values()
            .filter(|z| z.state() == ZoneState::Dwelling)
            .collect()
    }

    /// The monitored zones matching `descriptor`.
    #[must_use]
    pub fn zones_matching_descriptor(&self, descriptor: &Descriptor) -> Vec<&Zone> {
        self.zones
            .values()
            .filter(|z| descriptor.evaluate(*z))
            .collect()
    }

    /// Attach a copy of `action` to every trigger matching
    /// `trigger_descriptor` inside every zone matching `zone_descriptor`.
    ///
    /// An action holds a single owning-trigger back-reference, so one
    /// logical action cannot be shared: each match receives a distinct
    /// clone. Returns the number of copies attached.
    pub fn add_action(
        &mut self,
        action: &Action,
        trigger_descriptor: &Descriptor,
        zone_descriptor: &Descriptor,
    ) -> usize {
        let mut attached = 0;
        for zone in self.zones.values_mut() {
            if !zone_descriptor.evaluate(&*zone) {
                continue;
            }
            let matching: Vec<TriggerUid> = zone
                .triggers_matching_descriptor(trigger_descriptor)
                .into_iter()
                .map(|t| t.uid().clone())
                .collect();
            for uid in matching {
                if let Some(trigger) = zone.trigger_mut(&uid) {
                    trigger.add_action(action.clone());
                    attached += 1;
                }
            }
        }
        tracing::debug!(attached, "action attached by descriptor");
        attached
    }

    /// Replace the monitored set with freshly fetched definitions.
    ///
    /// Zones that survive the refresh (same uid) adopt the internal state of
    /// their predecessor so they do not spuriously re-fire. Definitions that
    /// fail validation are skipped and reported. Returns the number of zones
    /// now monitored.
    pub fn replace_zones(&mut self, definitions: Vec<ZoneDefinition>) -> usize {
        let mut fresh = BTreeMap::new();
        for definition in definitions {
            let uid = definition.uid.clone();
            match definition.into_zone() {
                Ok(mut zone) => {
                    if let Some(previous) = self.zones.get(zone.uid()) {
                        zone.set_internal_state_same_as(previous);
                    }
                    fresh.insert(zone.uid().clone(), zone);
                }
                Err(err) => {
                    tracing::warn!(zone = %uid, %err, "skipping invalid zone definition");
                    self.report_error(&err);
                }
            }
        }
        self.zones = fresh;
        tracing::info!(zones = self.zones.len(), "zone set replaced");
        self.zones.len()
    }

    /// Register an observer for the two-phase fire protocol.
    pub fn add_fire_observer(&mut self, observer: impl FireObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Install the error hook invoked for collaborator failures.
    pub fn set_error_handler(&mut self, handler: impl Fn(&ZoneKitError) + Send + Sync + 'static) {
        self.error_handler = Some(Arc::new(handler));
    }

    /// Report a collaborator failure: through the hook when one is set,
    /// otherwise to the log. Never fatal to the engine.
    pub fn report_error(&self, error: &ZoneKitError) {
        report(self.error_handler.as_ref(), error);
    }

    /// Route one sensing sample to the zones it concerns and update them.
    ///
    /// Samples outside the active monitoring scope are dropped.
    pub async fn handle_sample(&mut self, sample: SensorSample) {
        if !self.scope.admits(sample.kind()) {
            tracing::trace!(?sample, "sample outside monitoring scope");
            return;
        }
        match sample {
            SensorSample::Location { coordinate, at } => {
                let uids = self.zone_uids(|z| z.kind().is_geo());
                for uid in uids {
                    if let Some(zone) = self.zones.get_mut(&uid) {
                        zone.set_user_location(coordinate);
                    }
                    self.update_zone(&uid, at).await;
                }
            }
            SensorSample::BeaconProximity {
                beacon,
                proximity,
                accuracy_m,
                rssi,
                at,
            } => {
                let sample = zonekit_domain::beacon::ProximitySample {
                    proximity,
                    accuracy_m,
                    rssi,
                    at,
                };
                let uids = self.zone_uids(|z| zone_ranges_beacon(z, beacon));
                for uid in uids {
                    if let Some(zone) = self.zones.get_mut(&uid) {
                        zone.set_proximity_sample(sample);
                    }
                    self.update_zone(&uid, at).await;
                }
            }
            SensorSample::BeaconMotion { beacon, at } => {
                let uids = self.zone_uids(|z| zone_ranges_beacon(z, beacon));
                for uid in uids {
                    if let Some(zone) = self.zones.get_mut(&uid) {
                        zone.note_motion();
                    }
                    self.update_zone(&uid, at).await;
                }
            }
            SensorSample::IndoorContainment { zone, inside, at } => {
                if let Some(z) = self.zones.get_mut(&zone) {
                    z.set_indoor_containment(inside);
                    self.update_zone(&zone, at).await;
                }
            }
        }
    }

    fn zone_uids(&self, predicate: impl Fn(&Zone) -> bool) -> Vec<ZoneUid> {
        self.zones
            .values()
            .filter(|z| predicate(z))
            .map(|z| z.uid().clone())
            .collect()
    }

    async fn update_zone(&mut self, uid: &ZoneUid, now: Timestamp) {
        let Some(zone) = self.zones.get_mut(uid) else {
            return;
        };
        let update = zone.update(now);

        if let Some((old_state, new_state)) = update.transition {
            tracing::debug!(zone = %uid, %old_state, %new_state, "zone state changed");
            let _ = self
                .publisher
                .publish(ZoneEvent::StateChanged {
                    zone: uid.clone(),
                    old_state,
                    new_state,
                    at: now,
                })
                .await;
        }

        for trigger_uid in update.firing {
            self.fire_trigger(uid, &trigger_uid, now).await;
        }
    }

    async fn fire_trigger(&mut self, zone_uid: &ZoneUid, trigger_uid: &TriggerUid, now: Timestamp) {
        let notice = FireNotice {
            zone: zone_uid.clone(),
            trigger: trigger_uid.clone(),
            at: now,
        };

        let _ = self
            .publisher
            .publish(ZoneEvent::TriggerWillFire {
                zone: zone_uid.clone(),
                trigger: trigger_uid.clone(),
                at: now,
            })
            .await;

        let vetoed = self
            .observers
            .iter()
            .any(|observer| observer.before_fire(&notice) == FireDecision::Cancel);
        if vetoed {
            tracing::debug!(zone = %zone_uid, trigger = %trigger_uid, "fire vetoed");
            return;
        }

        let actions: Vec<Action> = {
            let Some(trigger) = self
                .zones
                .get_mut(zone_uid)
                .and_then(|z| z.trigger_mut(trigger_uid))
            else {
                return;
            };
            trigger.record_fire(now);
            trigger.actions().to_vec()
        };

        tracing::info!(
            zone = %zone_uid,
            trigger = %trigger_uid,
            actions = actions.len(),
            "trigger fired"
        );

        for action in actions {
            self.dispatch_action(action, trigger_uid).await;
        }

        let _ = self
            .publisher
            .publish(ZoneEvent::TriggerFired {
                zone: zone_uid.clone(),
                trigger: trigger_uid.clone(),
                at: now,
            })
            .await;

        for observer in &self.observers {
            observer.after_fire(&notice);
        }
    }

    /// Execute one action. Failures are isolated: they are reported and do
    /// not affect sibling actions or the trigger's bookkeeping.
    async fn dispatch_action(&self, action: Action, trigger_uid: &TriggerUid) {
        match action.kind() {
            ActionKind::Callback(callback) => callback(),
            ActionKind::Notification(template) => {
                let request = NotificationRequest {
                    title: template.title.clone(),
                    body: template.body.clone(),
                    trigger: trigger_uid.clone(),
                    payload: template.payload.clone(),
                };
                if let Err(err) = self.notifier.schedule(request).await {
                    self.report_error(&err);
                }
            }
            ActionKind::UrlCallback {
                method,
                url,
                params,
            } => {
                let request = CallbackRequest {
                    method: *method,
                    url: url.clone(),
                    params: params.clone(),
                };
                // Hand off so a slow remote cannot stall the update loop;
                // the transport's own timeout governs hung requests.
                let transport = Arc::clone(&self.transport);
                let handler = self.error_handler.clone();
                tokio::spawn(async move {
                    if let Err(err) = transport.send(request).await {
                        report(handler.as_ref(), &err);
                    }
                });
            }
        }
    }
}

fn report(handler: Option<&ErrorHandler>, error: &ZoneKitError) {
    match handler {
        Some(handler) => handler(error),
        None => tracing::error!(%error, "engine error (no handler installed)"),
    }
}

fn zone_ranges_beacon(zone: &Zone, beacon: zonekit_domain::beacon::Beacon) -> bool {
    matches!(zone.kind(), ZoneKind::BeaconProximity { beacon: b, .. } if *b == beacon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use chrono::{TimeZone, Utc};
    use tokio::sync::mpsc;

    use zonekit_domain::action::{CallbackMethod, NotificationTemplate};
    use zonekit_domain::beacon::{Beacon, Proximity};
    use zonekit_domain::geo::Coordinate;
    use zonekit_domain::trigger::{Trigger, TriggerEvent};

    // ── In-memory port implementations ─────────────────────────────

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<ZoneEvent>>,
    }

    impl RecordingPublisher {
        fn events(&self) -> Vec<ZoneEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(
            &self,
            event: ZoneEvent,
        ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
            self.events.lock().unwrap().push(event);
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct CollectingNotifier {
        requests: Mutex<Vec<NotificationRequest>>,
    }

    impl NotificationScheduler for CollectingNotifier {
        fn schedule(
            &self,
            request: NotificationRequest,
        ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
            self.requests.lock().unwrap().push(request);
            async { Ok(()) }
        }
    }

    struct ChannelTransport {
        tx: mpsc::UnboundedSender<CallbackRequest>,
    }

    impl CallbackTransport for ChannelTransport {
        fn send(
            &self,
            request: CallbackRequest,
        ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
            let _ = self.tx.send(request);
            async { Ok(()) }
        }
    }

    struct NullTransport;

    impl CallbackTransport for NullTransport {
        fn send(
            &self,
            _request: CallbackRequest,
        ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_750_000_000 + secs, 0).unwrap()
    }

    fn north_of_origin(meters: f64) -> Coordinate {
        Coordinate::new(meters / 111_195.0, 0.0)
    }

    fn location(meters_north: f64, secs: i64) -> SensorSample {
        SensorSample::Location {
            coordinate: north_of_origin(meters_north),
            at: at(secs),
        }
    }

    fn radius_zone(uid: &str, radius_m: f64) -> Zone {
        Zone::builder()
            .uid(uid)
            .name(format!("zone {uid}"))
            .kind(ZoneKind::Radius {
                center: Coordinate::new(0.0, 0.0),
                radius_m,
            })
            .build()
            .unwrap()
    }

    fn enter_trigger(uid: &str) -> Trigger {
        Trigger::builder()
            .uid(uid)
            .event(TriggerEvent::Enter)
            .build()
            .unwrap()
    }

    type TestManager =
        TriggerManager<Arc<RecordingPublisher>, Arc<CollectingNotifier>, ChannelTransport>;

    fn manager() -> (
        TestManager,
        Arc<RecordingPublisher>,
        Arc<CollectingNotifier>,
        mpsc::UnboundedReceiver<CallbackRequest>,
    ) {
        let publisher = Arc::new(RecordingPublisher::default());
        let notifier = Arc::new(CollectingNotifier::default());
        let (tx, rx) = mpsc::unbounded_channel();
        let mut manager = TriggerManager::new(
            Arc::clone(&publisher),
            Arc::clone(&notifier),
            ChannelTransport { tx },
        );
        manager.start_monitoring_zones();
        (manager, publisher, notifier, rx)
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_walk_zone_through_full_cycle_and_publish_state_changes() {
        let (mut manager, publisher, _, _rx) = manager();
        manager.add_zone(radius_zone("z1", 50.0));

        manager.handle_sample(location(40.0, 0)).await;
        manager.handle_sample(location(40.0, 1)).await;
        manager.handle_sample(location(80.0, 2)).await;
        manager.handle_sample(location(80.0, 3)).await;

        let states: Vec<(ZoneState, ZoneState)> = publisher
            .events()
            .into_iter()
            .filter_map(|e| match e {
                ZoneEvent::StateChanged {
                    old_state,
                    new_state,
                    ..
                } => Some((old_state, new_state)),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                (ZoneState::Outside, ZoneState::Entered),
                (ZoneState::Entered, ZoneState::Dwelling),
                (ZoneState::Dwelling, ZoneState::Exited),
                (ZoneState::Exited, ZoneState::Outside),
            ]
        );
    }

    #[tokio::test]
    async fn should_fire_enter_trigger_and_publish_both_phases() {
        let (mut manager, publisher, _, _rx) = manager();
        let mut zone = radius_zone("z1", 50.0);
        zone.add_trigger(enter_trigger("t1"));
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;

        let events = publisher.events();
        assert!(events.iter().any(|e| matches!(
            e,
            ZoneEvent::TriggerWillFire { trigger, .. } if trigger.as_str() == "t1"
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            ZoneEvent::TriggerFired { trigger, .. } if trigger.as_str() == "t1"
        )));
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );
    }

    #[tokio::test]
    async fn should_run_callback_actions_synchronously() {
        let (mut manager, _, _, _rx) = manager();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);

        let mut zone = radius_zone("z1", 50.0);
        let mut trigger = enter_trigger("t1");
        trigger.add_action(Action::callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        zone.add_trigger(trigger);
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_schedule_notification_with_trigger_metadata() {
        let (mut manager, _, notifier, _rx) = manager();
        let mut zone = radius_zone("z1", 50.0);
        let mut trigger = enter_trigger("t1");
        trigger.add_action(Action::notification(NotificationTemplate::new("welcome")));
        zone.add_trigger(trigger);
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;

        let requests = notifier.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, "welcome");
        assert_eq!(requests[0].trigger, TriggerUid::new("t1"));
    }

    #[tokio::test]
    async fn should_deliver_url_callback_through_transport() {
        let (mut manager, _, _, mut rx) = manager();
        let mut zone = radius_zone("z1", 50.0);
        let mut trigger = enter_trigger("t1");
        trigger.add_action(Action::url_callback(
            CallbackMethod::Get,
            "https://example.com/fired",
            serde_json::Map::new(),
        ));
        zone.add_trigger(trigger);
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;

        let request = rx.recv().await.unwrap();
        assert_eq!(request.method, CallbackMethod::Get);
        assert_eq!(request.url, "https://example.com/fired");
    }

    #[tokio::test]
    async fn should_veto_fire_without_touching_bookkeeping() {
        let (mut manager, publisher, _, _rx) = manager();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);

        let mut zone = radius_zone("z1", 50.0);
        let mut trigger = enter_trigger("t1");
        trigger.add_action(Action::callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        zone.add_trigger(trigger);
        manager.add_zone(zone);

        let vetoes = Arc::new(AtomicU32::new(1));
        let remaining = Arc::clone(&vetoes);
        manager.add_fire_observer(move |_notice: &FireNotice| {
            if remaining.swap(0, Ordering::SeqCst) > 0 {
                FireDecision::Cancel
            } else {
                FireDecision::Proceed
            }
        });

        // First enter: vetoed — no count, no action, no fired event.
        manager.handle_sample(location(10.0, 0)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            0
        );
        assert!(
            !publisher
                .events()
                .iter()
                .any(|e| matches!(e, ZoneEvent::TriggerFired { .. }))
        );

        // Leave and re-enter: the veto was for that occurrence only.
        manager.handle_sample(location(500.0, 1)).await;
        manager.handle_sample(location(500.0, 2)).await;
        manager.handle_sample(location(10.0, 3)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );
    }

    #[tokio::test]
    async fn should_attach_distinct_action_copies_on_fan_out() {
        let (mut manager, _, notifier, _rx) = manager();

        // Two zones, both owning a trigger with uid "t1".
        let mut za = radius_zone("za", 50.0);
        za.add_trigger(enter_trigger("t1"));
        manager.add_zone(za);

        let mut zb = Zone::builder()
            .uid("zb")
            .kind(ZoneKind::Radius {
                center: Coordinate::new(1.0, 1.0),
                radius_m: 50.0,
            })
            .trigger(enter_trigger("t1"))
            .build()
            .unwrap();
        zb.name = "zone zb".to_string();
        manager.add_zone(zb);

        let attached = manager.add_action(
            &Action::notification(NotificationTemplate::new("fan-out")),
            &Descriptor::with_uid("t1"),
            &Descriptor::with_value(true),
        );
        assert_eq!(attached, 2);

        // Fire only zone "za": exactly one copy executes, and only za's
        // trigger advances its fire count.
        manager.handle_sample(location(10.0, 0)).await;
        assert_eq!(notifier.requests.lock().unwrap().len(), 1);
        assert_eq!(
            manager
                .zone(&ZoneUid::new("za"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );
        assert_eq!(
            manager
                .zone(&ZoneUid::new("zb"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            0
        );
    }

    #[tokio::test]
    async fn should_route_beacon_samples_to_matching_zones_only() {
        let (mut manager, _, _, _rx) = manager();
        let uuid = uuid::Uuid::new_v4();
        let ours = Beacon::new(uuid, 1, 1);
        let theirs = Beacon::new(uuid, 1, 2);

        let mut zone = Zone::builder()
            .uid("bz")
            .kind(ZoneKind::BeaconProximity {
                beacon: ours,
                threshold: Proximity::Near,
                background_ping: false,
            })
            .build()
            .unwrap();
        zone.add_trigger(enter_trigger("t1"));
        manager.add_zone(zone);

        manager
            .handle_sample(SensorSample::BeaconProximity {
                beacon: theirs,
                proximity: Proximity::Immediate,
                accuracy_m: 0.3,
                rssi: -40,
                at: at(0),
            })
            .await;
        assert_eq!(
            manager.zone(&ZoneUid::new("bz")).unwrap().state(),
            ZoneState::Outside
        );

        manager
            .handle_sample(SensorSample::BeaconProximity {
                beacon: ours,
                proximity: Proximity::Immediate,
                accuracy_m: 0.3,
                rssi: -40,
                at: at(1),
            })
            .await;
        assert_eq!(
            manager.zone(&ZoneUid::new("bz")).unwrap().state(),
            ZoneState::Entered
        );
    }

    #[tokio::test]
    async fn should_ignore_samples_outside_monitoring_scope() {
        let (mut manager, publisher, _, _rx) = manager();
        manager.stop_monitoring_zones();
        manager.start_monitoring_beacon_zones();
        manager.add_zone(radius_zone("z1", 50.0));

        manager.handle_sample(location(10.0, 0)).await;

        assert_eq!(
            manager.zone(&ZoneUid::new("z1")).unwrap().state(),
            ZoneState::Outside
        );
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn should_clear_zones_when_monitoring_stops() {
        let (mut manager, _, _, _rx) = manager();
        manager.add_zone(radius_zone("z1", 50.0));
        manager.add_zone(radius_zone("z2", 50.0));

        manager.stop_monitoring_zones();

        assert_eq!(manager.zones().count(), 0);
        assert!(!manager.scope().any());
    }

    #[tokio::test]
    async fn should_overwrite_zone_on_uid_collision() {
        let (mut manager, _, _, _rx) = manager();
        manager.add_zone(radius_zone("z1", 50.0));
        manager.add_zone(radius_zone("z1", 75.0));

        assert_eq!(manager.zones().count(), 1);
        let zone = manager.zone(&ZoneUid::new("z1")).unwrap();
        assert!(
            matches!(zone.kind(), ZoneKind::Radius { radius_m, .. } if (*radius_m - 75.0).abs() < f64::EPSILON)
        );
    }

    #[tokio::test]
    async fn should_report_zones_inside_while_dwelling() {
        let (mut manager, _, _, _rx) = manager();
        manager.add_zone(radius_zone("z1", 50.0));

        manager.handle_sample(location(10.0, 0)).await;
        assert!(manager.zones_inside().is_empty());

        manager.handle_sample(location(10.0, 1)).await;
        let inside = manager.zones_inside();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].uid(), &ZoneUid::new("z1"));
    }

    #[tokio::test]
    async fn should_match_zones_by_descriptor() {
        let (mut manager, _, _, _rx) = manager();
        manager.add_zone(radius_zone("z1", 50.0));
        manager.add_zone(radius_zone("z2", 50.0));

        let by_uid = manager.zones_matching_descriptor(&Descriptor::with_uid("z2"));
        assert_eq!(by_uid.len(), 1);
        assert_eq!(by_uid[0].uid(), &ZoneUid::new("z2"));

        let all = manager.zones_matching_descriptor(&Descriptor::with_value(true));
        assert_eq!(all.len(), 2);

        let none = manager.zones_matching_descriptor(&Descriptor::with_key("name", |v| {
            v.and_then(serde_json::Value::as_str) == Some("no such zone")
        }));
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn should_keep_fire_counts_across_zone_refresh() {
        let (mut manager, _, _, _rx) = manager();
        let mut zone = radius_zone("z1", 50.0);
        zone.add_trigger(enter_trigger("t1"));
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );

        // Refresh from definitions: same uid, state must carry over.
        let definition = ZoneDefinition::from_zone(manager.zone(&ZoneUid::new("z1")).unwrap());
        let count = manager.replace_zones(vec![definition]);
        assert_eq!(count, 1);
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );

        // Still inside: the refreshed zone must not re-fire its enter trigger.
        manager.handle_sample(location(10.0, 1)).await;
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );
    }

    #[tokio::test]
    async fn should_invoke_error_handler_for_reported_errors() {
        let (mut manager, _, _, _rx) = manager();
        let seen = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&seen);
        manager.set_error_handler(move |_err| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.report_error(&ZoneKitError::Sensing("bluetooth off".into()));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn should_isolate_notification_failures_from_sibling_actions() {
        struct FailingNotifier;
        impl NotificationScheduler for FailingNotifier {
            fn schedule(
                &self,
                _request: NotificationRequest,
            ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
                async { Err(ZoneKitError::Dispatch("scheduler unavailable".into())) }
            }
        }

        let publisher = Arc::new(RecordingPublisher::default());
        let mut manager =
            TriggerManager::new(Arc::clone(&publisher), FailingNotifier, NullTransport);
        manager.start_monitoring_zones();

        let errors = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&errors);
        manager.set_error_handler(move |_err| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let hits = Arc::new(AtomicU32::new(0));
        let callback_hits = Arc::clone(&hits);

        let mut zone = radius_zone("z1", 50.0);
        let mut trigger = enter_trigger("t1");
        trigger.add_action(Action::notification(NotificationTemplate::new("doomed")));
        trigger.add_action(Action::callback(move || {
            callback_hits.fetch_add(1, Ordering::SeqCst);
        }));
        zone.add_trigger(trigger);
        manager.add_zone(zone);

        manager.handle_sample(location(10.0, 0)).await;

        // The failure was reported, the sibling ran, the fire was recorded.
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            manager
                .zone(&ZoneUid::new("z1"))
                .unwrap()
                .trigger(&TriggerUid::new("t1"))
                .unwrap()
                .fire_count(),
            1
        );
    }
}

//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use zonekit_domain::error::ZoneKitError;
use zonekit_domain::event::ZoneEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<ZoneEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ZoneEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: ZoneEvent) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        // broadcast::send only errors with zero receivers; not a failure here.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_domain::id::ZoneUid;
    use zonekit_domain::time;
    use zonekit_domain::zone::ZoneState;

    fn state_changed(zone: &str) -> ZoneEvent {
        ZoneEvent::StateChanged {
            zone: ZoneUid::new(zone),
            old_state: ZoneState::Outside,
            new_state: ZoneState::Entered,
            at: time::now(),
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(state_changed("z1")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.zone(), &ZoneUid::new("z1"));
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(state_changed("z2")).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().zone(), &ZoneUid::new("z2"));
        assert_eq!(rx2.recv().await.unwrap().zone(), &ZoneUid::new("z2"));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let result = bus.publish(state_changed("z3")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);

        bus.publish(state_changed("early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(state_changed("late")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.zone(), &ZoneUid::new("late"));
    }
}

//! Event bus port — publish/subscribe for zone and trigger events.

use std::future::Future;

use zonekit_domain::error::ZoneKitError;
use zonekit_domain::event::ZoneEvent;

/// Publishes zone events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: ZoneEvent) -> impl Future<Output = Result<(), ZoneKitError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: ZoneEvent) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        (**self).publish(event)
    }
}

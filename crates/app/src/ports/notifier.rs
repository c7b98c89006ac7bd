//! Notification port — hands trigger-fired notifications to the platform
//! scheduling collaborator.

use std::future::Future;

use zonekit_domain::error::ZoneKitError;
use zonekit_domain::id::TriggerUid;

/// A notification ready to be scheduled.
///
/// Built by the engine from a notification action's template; `trigger`
/// carries the originating trigger uid so the presenting side can resolve
/// what fired.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub title: Option<String>,
    pub body: String,
    /// The trigger whose firing produced this notification.
    pub trigger: TriggerUid,
    /// Free-form payload from the action template.
    pub payload: serde_json::Value,
}

/// Schedules local notifications.
pub trait NotificationScheduler {
    /// Hand a notification to the platform scheduler.
    fn schedule(
        &self,
        request: NotificationRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send;
}

impl<T: NotificationScheduler + Send + Sync> NotificationScheduler for std::sync::Arc<T> {
    fn schedule(
        &self,
        request: NotificationRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        (**self).schedule(request)
    }
}

//! Log-only notification and callback collaborators.
//!
//! Stand-ins for the platform notification service and the HTTP transport:
//! every request is written to the log and otherwise dropped. Useful for the
//! daemon's demo mode and for wiring the engine where no real presentation
//! or network side exists.

use std::future::Future;

use zonekit_app::ports::{
    CallbackRequest, CallbackTransport, NotificationRequest, NotificationScheduler,
};
use zonekit_domain::error::ZoneKitError;

/// Notification scheduler that logs instead of presenting.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl NotificationScheduler for LogNotifier {
    fn schedule(
        &self,
        request: NotificationRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        tracing::info!(
            trigger = %request.trigger,
            title = request.title.as_deref().unwrap_or(""),
            body = %request.body,
            "notification"
        );
        async { Ok(()) }
    }
}

/// Callback transport that logs instead of sending.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransport;

impl CallbackTransport for LogTransport {
    fn send(
        &self,
        request: CallbackRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        tracing::info!(
            method = %request.method,
            url = %request.url,
            params = request.params.len(),
            "url callback"
        );
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonekit_domain::action::CallbackMethod;
    use zonekit_domain::id::TriggerUid;

    #[tokio::test]
    async fn should_accept_notifications() {
        let notifier = LogNotifier;
        let result = notifier
            .schedule(NotificationRequest {
                title: None,
                body: "hello".to_string(),
                trigger: TriggerUid::new("t1"),
                payload: serde_json::Value::Null,
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_accept_callbacks() {
        let transport = LogTransport;
        let result = transport
            .send(CallbackRequest {
                method: CallbackMethod::Get,
                url: "https://example.com".to_string(),
                params: serde_json::Map::new(),
            })
            .await;
        assert!(result.is_ok());
    }
}

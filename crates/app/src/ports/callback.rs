//! Callback transport port — outbound HTTP for URL callback actions.

use std::future::Future;

use zonekit_domain::action::CallbackMethod;
use zonekit_domain::error::ZoneKitError;

/// An HTTP request produced by a URL callback action.
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackRequest {
    pub method: CallbackMethod,
    pub url: String,
    /// Query parameters for GET, JSON body for POST.
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Delivers URL callback requests.
///
/// Implementations own their retry and timeout policy; the engine fires and
/// forgets, reporting failures through its error hook.
pub trait CallbackTransport {
    fn send(
        &self,
        request: CallbackRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send;
}

impl<T: CallbackTransport + Send + Sync> CallbackTransport for std::sync::Arc<T> {
    fn send(
        &self,
        request: CallbackRequest,
    ) -> impl Future<Output = Result<(), ZoneKitError>> + Send {
        (**self).send(request)
    }
}

//! Action — the unit of work executed when a trigger fires.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::id::TriggerUid;

/// In-process unit of work run synchronously when the owning trigger fires.
pub type CallbackFn = Arc<dyn Fn() + Send + Sync>;

/// HTTP method used by a URL callback action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallbackMethod {
    Get,
    Post,
}

impl std::fmt::Display for CallbackMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Content of a local notification scheduled when a trigger fires.
///
/// The engine adds the originating trigger uid as metadata at dispatch time;
/// the template only carries what the author wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    /// Free-form payload delivered alongside the notification.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl NotificationTemplate {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
            payload: serde_json::Value::Null,
        }
    }
}

/// What an action does when it fires.
#[derive(Clone)]
pub enum ActionKind {
    /// Run an in-process callback synchronously.
    Callback(CallbackFn),
    /// Hand a notification to the scheduling collaborator.
    Notification(NotificationTemplate),
    /// Issue an HTTP request through the callback transport collaborator.
    UrlCallback {
        method: CallbackMethod,
        url: String,
        params: serde_json::Map<String, serde_json::Value>,
    },
}

impl std::fmt::Debug for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Notification(template) => {
                f.debug_tuple("Notification").field(template).finish()
            }
            Self::UrlCallback {
                method,
                url,
                params,
            } => f
                .debug_struct("UrlCallback")
                .field("method", method)
                .field("url", url)
                .field("params", params)
                .finish(),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("callback"),
            Self::Notification(template) => write!(f, "notification({})", template.body),
            Self::UrlCallback { method, url, .. } => {
                write!(f, "url_callback({method} {url})")
            }
        }
    }
}

/// A unit of work attached to exactly one trigger.
///
/// Immutable after construction except for the owning-trigger back-reference,
/// which is set once when the action is attached. Attaching one logical
/// action to several triggers means attaching a distinct clone per trigger.
#[derive(Debug, Clone)]
pub struct Action {
    kind: ActionKind,
    trigger: Option<TriggerUid>,
}

impl Action {
    /// An action that runs an in-process callback.
    #[must_use]
    pub fn callback(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            kind: ActionKind::Callback(Arc::new(callback)),
            trigger: None,
        }
    }

    /// An action that schedules a local notification.
    #[must_use]
    pub fn notification(template: NotificationTemplate) -> Self {
        Self {
            kind: ActionKind::Notification(template),
            trigger: None,
        }
    }

    /// An action that issues an HTTP request to `url`.
    #[must_use]
    pub fn url_callback(
        method: CallbackMethod,
        url: impl Into<String>,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            kind: ActionKind::UrlCallback {
                method,
                url: url.into(),
                params,
            },
            trigger: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// The trigger this action is attached to, if any.
    #[must_use]
    pub fn trigger(&self) -> Option<&TriggerUid> {
        self.trigger.as_ref()
    }

    pub(crate) fn attach_to(&mut self, trigger: &TriggerUid) {
        self.trigger = Some(trigger.clone());
    }
}

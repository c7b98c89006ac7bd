//! Definition DTOs — the serialized shape of a zone set.
//!
//! Zone definitions arrive from the remote directory and round-trip through
//! the offline cache in this shape: zones with nested triggers with nested
//! actions. `into_zone` / `from_zone` convert between definitions and live
//! domain objects. In-process callback actions are programmatic-only and
//! are skipped on encode — they cannot be represented on the wire.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionKind, CallbackMethod, NotificationTemplate};
use crate::error::ZoneKitError;
use crate::trigger::{Trigger, TriggerEvent};
use crate::zone::{Zone, ZoneKind};

/// Serialized form of a [`Zone`] and everything it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: ZoneKind,
    #[serde(default)]
    pub triggers: Vec<TriggerDefinition>,
}

/// Serialized form of a [`Trigger`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    pub event: TriggerEvent,
    /// Required continuous presence in seconds; only meaningful for dwell.
    #[serde(default)]
    pub dwell_time_secs: f64,
    /// Minimum refire interval in seconds.
    #[serde(default)]
    pub frequency_secs: f64,
    /// Maximum fire count; zero means unlimited.
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub actions: Vec<ActionDefinition>,
}

/// Serialized form of an [`Action`]. Callback actions have no wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDefinition {
    Notification {
        #[serde(default)]
        title: Option<String>,
        body: String,
        #[serde(default)]
        payload: serde_json::Value,
    },
    UrlCallback {
        method: CallbackMethod,
        url: String,
        #[serde(default)]
        params: serde_json::Map<String, serde_json::Value>,
    },
}

/// Seconds to a [`Duration`], clamping negative and non-finite input to zero.
fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_finite() && secs > 0.0 {
        Duration::from_secs_f64(secs)
    } else {
        Duration::ZERO
    }
}

impl ActionDefinition {
    /// Build the live [`Action`] for this definition.
    #[must_use]
    pub fn into_action(self) -> Action {
        match self {
            Self::Notification {
                title,
                body,
                payload,
            } => Action::notification(NotificationTemplate {
                title,
                body,
                payload,
            }),
            Self::UrlCallback {
                method,
                url,
                params,
            } => Action::url_callback(method, url, params),
        }
    }

    /// The wire form of a live action, or `None` for callback actions.
    #[must_use]
    pub fn from_action(action: &Action) -> Option<Self> {
        match action.kind() {
            ActionKind::Callback(_) => None,
            ActionKind::Notification(template) => Some(Self::Notification {
                title: template.title.clone(),
                body: template.body.clone(),
                payload: template.payload.clone(),
            }),
            ActionKind::UrlCallback {
                method,
                url,
                params,
            } => Some(Self::UrlCallback {
                method: *method,
                url: url.clone(),
                params: params.clone(),
            }),
        }
    }
}

impl TriggerDefinition {
    /// Build the live [`Trigger`] for this definition.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when the definition violates
    /// trigger invariants (empty uid, dwell without a dwell time).
    pub fn into_trigger(self) -> Result<Trigger, ZoneKitError> {
        let mut trigger = Trigger::builder()
            .uid(self.uid)
            .name(self.name)
            .event(self.event)
            .dwell_time(duration_from_secs(self.dwell_time_secs))
            .frequency(duration_from_secs(self.frequency_secs))
            .limit(self.limit)
            .build()?;
        for action in self.actions {
            trigger.add_action(action.into_action());
        }
        Ok(trigger)
    }

    /// The wire form of a live trigger. Callback actions are skipped.
    #[must_use]
    pub fn from_trigger(trigger: &Trigger) -> Self {
        Self {
            uid: trigger.uid().to_string(),
            name: trigger.name.clone(),
            event: trigger.event(),
            dwell_time_secs: trigger.dwell_time().as_secs_f64(),
            frequency_secs: trigger.frequency().as_secs_f64(),
            limit: trigger.limit(),
            actions: trigger
                .actions()
                .iter()
                .filter_map(ActionDefinition::from_action)
                .collect(),
        }
    }
}

impl ZoneDefinition {
    /// Build the live [`Zone`] for this definition.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneKitError::Validation`] when the definition violates
    /// zone or trigger invariants.
    pub fn into_zone(self) -> Result<Zone, ZoneKitError> {
        let mut builder = Zone::builder()
            .uid(self.uid)
            .name(self.name)
            .kind(self.kind);
        for trigger in self.triggers {
            builder = builder.trigger(trigger.into_trigger()?);
        }
        builder.build()
    }

    /// The wire form of a live zone. Fire bookkeeping is not part of the
    /// definition; a decoded zone starts from scratch unless the caller
    /// transplants state from a previous instance.
    #[must_use]
    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            uid: zone.uid().to_string(),
            name: zone.name.clone(),
            kind: zone.kind().clone(),
            triggers: zone.triggers().iter().map(TriggerDefinition::from_trigger).collect(),
        }
    }
}

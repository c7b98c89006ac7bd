//! Events published by the engine while zones update and triggers fire.

use serde::{Deserialize, Serialize};

use crate::id::{TriggerUid, ZoneUid};
use crate::time::Timestamp;
use crate::zone::ZoneState;

/// A record of something observable that happened inside the engine.
///
/// `TriggerWillFire` is informational: the synchronous veto pass happens
/// through the manager's fire observers, not through this broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZoneEvent {
    /// A zone's occupancy state changed.
    StateChanged {
        zone: ZoneUid,
        old_state: ZoneState,
        new_state: ZoneState,
        at: Timestamp,
    },
    /// A trigger qualified and is about to execute its actions.
    TriggerWillFire {
        zone: ZoneUid,
        trigger: TriggerUid,
        at: Timestamp,
    },
    /// A trigger fired and its actions were dispatched.
    TriggerFired {
        zone: ZoneUid,
        trigger: TriggerUid,
        at: Timestamp,
    },
}

impl ZoneEvent {
    /// The zone this event concerns.
    #[must_use]
    pub fn zone(&self) -> &ZoneUid {
        match self {
            Self::StateChanged { zone, .. }
            | Self::TriggerWillFire { zone, .. }
            | Self::TriggerFired { zone, .. } => zone,
        }
    }
}

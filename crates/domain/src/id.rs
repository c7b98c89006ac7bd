//! Typed uid newtypes backed by strings.
//!
//! Zone and trigger uids come from the remote definition source as opaque
//! strings, so the newtypes wrap a `String` rather than a parsed UUID.
//! Programmatically created objects get a random v4 UUID string.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! define_uid {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing uid string.
            #[must_use]
            pub fn new(uid: impl Into<String>) -> Self {
                Self(uid.into())
            }

            /// Generate a fresh random uid (for programmatically created objects).
            #[must_use]
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            /// Access the inner string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(uid: &str) -> Self {
                Self(uid.to_string())
            }
        }

        impl From<String> for $name {
            fn from(uid: String) -> Self {
                Self(uid)
            }
        }
    };
}

define_uid!(
    /// Unique identifier for a [`Zone`](crate::zone::Zone).
    ZoneUid
);

define_uid!(
    /// Unique identifier for a [`Trigger`](crate::trigger::Trigger).
    TriggerUid
);

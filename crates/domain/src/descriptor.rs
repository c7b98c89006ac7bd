//! Descriptor — a composable predicate used to select zones and triggers.
//!
//! A descriptor describes an object rather than holding a reference to it:
//! construct one and hand it to the manager (or a zone) to retrieve the
//! matching instances. Descriptors are stateless and reusable; each
//! attachment call takes exactly one descriptor per axis — there are no
//! runtime and/or/not combinators.

use std::sync::Arc;

use serde_json::Value as JsonValue;

/// Test applied to a field extracted by key. Receives `None` when the object
/// has no such field.
pub type FieldTest = Arc<dyn Fn(Option<&JsonValue>) -> bool + Send + Sync>;

/// An object a [`Descriptor`] can evaluate: it has a uid and keyed fields.
pub trait Describable {
    /// The unique identifier used by uid descriptors.
    fn uid(&self) -> &str;

    /// Look up a named field for keyed descriptors.
    ///
    /// Unknown keys return `None`; they are passed to the field test rather
    /// than treated as an error.
    fn field(&self, key: &str) -> Option<JsonValue>;
}

/// Predicate over a [`Describable`] object.
#[derive(Clone)]
pub enum Descriptor {
    /// Matches iff the object's uid equals the given string.
    Uid(String),
    /// Extracts the field named `key` and applies `test` to it.
    Key { key: String, test: FieldTest },
    /// Always evaluates to the fixed boolean.
    Value(bool),
}

impl Descriptor {
    /// A descriptor matching the object with the given uid.
    #[must_use]
    pub fn with_uid(uid: impl Into<String>) -> Self {
        Self::Uid(uid.into())
    }

    /// A descriptor that tests the value identified by `key`.
    #[must_use]
    pub fn with_key(
        key: impl Into<String>,
        test: impl Fn(Option<&JsonValue>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Key {
            key: key.into(),
            test: Arc::new(test),
        }
    }

    /// A descriptor that always evaluates to `value`.
    #[must_use]
    pub fn with_value(value: bool) -> Self {
        Self::Value(value)
    }

    /// Whether `object` matches the conditions described by `self`.
    #[must_use]
    pub fn evaluate<T: Describable + ?Sized>(&self, object: &T) -> bool {
        match self {
            Self::Uid(uid) => object.uid() == uid,
            Self::Key { key, test } => test(object.field(key).as_ref()),
            Self::Value(value) => *value,
        }
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uid(uid) => f.debug_tuple("Uid").field(uid).finish(),
            Self::Key { key, .. } => f.debug_struct("Key").field("key", key).finish(),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

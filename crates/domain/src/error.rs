//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`ZoneKitError`]
//! at the port boundary via `#[from]` or the boxed collaborator variants.

/// Top-level error for the zonekit engine.
#[derive(Debug, thiserror::Error)]
pub enum ZoneKitError {
    /// A domain invariant was violated while constructing an object.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A zone or trigger lookup failed.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A sensing collaborator (GPS, beacon ranging, indoor positioning)
    /// failed or is unavailable.
    #[error("sensing source error")]
    Sensing(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Executing an action failed (notification scheduling, URL callback).
    #[error("action dispatch error")]
    Dispatch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Fetching zone definitions from the remote directory failed.
    #[error("zone directory error")]
    Directory(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading or writing the cached zone set failed.
    #[error("zone cache error")]
    Cache(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Violated construction invariants.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Uids are identity; an empty one would break set semantics.
    #[error("uid must not be empty")]
    EmptyUid,

    /// A radius zone needs a positive radius to have an interior.
    #[error("zone radius must be positive")]
    NonPositiveRadius,

    /// A polygon zone needs at least three vertices to enclose an area.
    #[error("polygon must have at least three vertices")]
    DegeneratePolygon,

    /// A dwell trigger without a dwell time would fire immediately on entry.
    #[error("dwell trigger must have a positive dwell time")]
    ZeroDwellTime,

    /// A zone cannot be built without choosing its kind.
    #[error("zone kind must be set")]
    MissingKind,
}

/// A lookup by uid failed.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    /// What was being looked up ("Zone", "Trigger").
    pub entity: &'static str,
    /// The uid that missed.
    pub id: String,
}

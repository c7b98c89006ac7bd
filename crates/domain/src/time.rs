//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for fire times, sample times, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Elapsed wall-clock time from `earlier` to `later`.
///
/// Returns [`Duration::ZERO`](std::time::Duration::ZERO) when `later` is not
/// after `earlier` (clock adjustments must never produce negative spans).
#[must_use]
pub fn elapsed(earlier: Timestamp, later: Timestamp) -> std::time::Duration {
    later
        .signed_duration_since(earlier)
        .to_std()
        .unwrap_or(std::time::Duration::ZERO)
}

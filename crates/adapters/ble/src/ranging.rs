//! RSSI → distance → proximity category estimation.
//!
//! Uses the log-distance path loss model: the advertisement carries the
//! calibrated received power at one meter (`tx_power_dbm`), and distance
//! follows from how far the measured RSSI has fallen below it.

use zonekit_domain::beacon::Proximity;

/// Category boundaries in meters.
const IMMEDIATE_MAX_M: f64 = 0.5;
const NEAR_MAX_M: f64 = 4.0;

/// Estimate the distance to a beacon in meters.
///
/// Returns a negative value when the measurement is unusable (an RSSI of
/// zero or above means the radio gave no real reading).
#[must_use]
pub fn estimate_distance_m(rssi: i16, tx_power_dbm: i8, path_loss_exponent: f64) -> f64 {
    if rssi >= 0 || path_loss_exponent <= 0.0 {
        return -1.0;
    }
    let ratio = (f64::from(tx_power_dbm) - f64::from(rssi)) / (10.0 * path_loss_exponent);
    10f64.powf(ratio)
}

/// Bucket an estimated distance into a proximity category.
///
/// Negative distances (no usable estimate) map to [`Proximity::Unknown`].
#[must_use]
pub fn proximity_for_distance(distance_m: f64) -> Proximity {
    if distance_m < 0.0 || !distance_m.is_finite() {
        Proximity::Unknown
    } else if distance_m < IMMEDIATE_MAX_M {
        Proximity::Immediate
    } else if distance_m < NEAR_MAX_M {
        Proximity::Near
    } else {
        Proximity::Far
    }
}

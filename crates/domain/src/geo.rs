//! Geometry primitives for geo zone containment tests.
//!
//! Pure functions over geographical coordinates — no failure modes.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A geographical coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two coordinates in meters (haversine).
#[must_use]
pub fn distance_meters(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Whether `point` lies inside the polygon described by `vertices`.
///
/// Ray-casting crossing test over the ordered vertex sequence; the closing
/// edge from the last vertex back to the first is implied. Points exactly on
/// an edge are classified as *outside* — callers must not rely on boundary
/// inclusion. Fewer than three vertices never contain anything.
#[must_use]
pub fn point_in_polygon(point: Coordinate, vertices: &[Coordinate]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        let crosses = (a.latitude > point.latitude) != (b.latitude > point.latitude)
            && point.longitude
                < (b.longitude - a.longitude) * (point.latitude - a.latitude)
                    / (b.latitude - a.latitude)
                    + a.longitude;
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

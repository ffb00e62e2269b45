//! Geographic primitives: coordinates, the two-point parametric form, and
//! Haversine distance.
//!
//! Positions are plain `(lat, lng)` degree pairs. The engine never projects
//! them; interpolation happens directly in degree space, which is what the
//! tracking view renders.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// `P(t) = a + (b - a) * t`. `t` outside `[0, 1]` extrapolates past an endpoint.
pub fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint {
        lat: a.lat + (b.lat - a.lat) * t,
        lng: a.lng + (b.lng - a.lng) * t,
    }
}

/// Great-circle distance between two points.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Total Haversine length of a polyline.
pub fn path_length_km(path: &[GeoPoint]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

/// Point at `fraction` of the way along `path`.
///
/// Walks by cumulative Haversine length; when every segment is degenerate
/// (total length zero) it falls back to the vertex-count fraction. `fraction`
/// is clamped to `[0, 1]`, and the end vertices are returned exactly at the
/// bounds. Returns `None` for an empty path.
pub fn point_along_path(path: &[GeoPoint], fraction: f64) -> Option<GeoPoint> {
    let first = *path.first()?;
    let last = *path.last()?;
    let fraction = fraction.clamp(0.0, 1.0);
    if path.len() == 1 || fraction <= 0.0 {
        return Some(first);
    }
    if fraction >= 1.0 {
        return Some(last);
    }

    let segment_lengths: Vec<f64> = path.windows(2).map(|w| haversine_km(w[0], w[1])).collect();
    let total: f64 = segment_lengths.iter().sum();

    if total <= 0.0 {
        let scaled = fraction * (path.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(path.len() - 2);
        return Some(lerp(path[idx], path[idx + 1], scaled - idx as f64));
    }

    let target = fraction * total;
    let mut walked = 0.0;
    for (idx, segment) in segment_lengths.iter().enumerate() {
        if *segment > 0.0 && walked + segment >= target {
            return Some(lerp(path[idx], path[idx + 1], (target - walked) / segment));
        }
        walked += segment;
    }
    Some(last)
}

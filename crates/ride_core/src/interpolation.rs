//! Driver position as a pure function of phase and progress.
//!
//! Nothing here reads a clock or mutates state, so the same inputs always
//! produce the same coordinate and the position can be re-evaluated at will.

use serde::{Deserialize, Serialize};

use crate::endpoints::TripEndpoints;
use crate::geo::{lerp, point_along_path, GeoPoint};
use crate::phase::Phase;

/// Extrapolation ratios applied along the destination → origin line.
///
/// Both are tuning constants; `lerp(destination, origin, ratio)` is evaluated
/// verbatim so existing displays keep their marker placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationParams {
    /// Parked position while searching and right after assignment.
    pub idle_ratio: f64,
    /// Where the approach during en route begins.
    pub approach_ratio: f64,
}

impl Default for ExtrapolationParams {
    fn default() -> Self {
        Self {
            idle_ratio: -0.4,
            approach_ratio: -0.3,
        }
    }
}

impl ExtrapolationParams {
    pub fn idle_point(&self, endpoints: &TripEndpoints) -> GeoPoint {
        lerp(endpoints.destination, endpoints.origin, self.idle_ratio)
    }

    pub fn approach_start(&self, endpoints: &TripEndpoints) -> GeoPoint {
        lerp(endpoints.destination, endpoints.origin, self.approach_ratio)
    }
}

/// Road geometry for the two moving phases.
///
/// A path with fewer than three points carries no shape beyond its endpoints,
/// so the straight two-point form is used instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePaths {
    /// Approach start → origin.
    pub approach: Vec<GeoPoint>,
    /// Origin → destination.
    pub trip: Vec<GeoPoint>,
}

impl RoutePaths {
    pub fn straight(endpoints: &TripEndpoints, params: &ExtrapolationParams) -> Self {
        Self {
            approach: vec![params.approach_start(endpoints), endpoints.origin],
            trip: vec![endpoints.origin, endpoints.destination],
        }
    }
}

fn walk(path: Option<&[GeoPoint]>, a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    match path {
        Some(points) if points.len() >= 3 => point_along_path(points, t).unwrap_or(a),
        _ => lerp(a, b, t),
    }
}

/// Driver coordinate for `phase` at `progress`.
pub fn position(
    phase: Phase,
    progress: f64,
    endpoints: &TripEndpoints,
    params: &ExtrapolationParams,
    paths: Option<&RoutePaths>,
) -> GeoPoint {
    match phase {
        Phase::Searching | Phase::DriverAssigned => params.idle_point(endpoints),
        Phase::EnRoute => {
            let t = (progress + 1.0).clamp(0.0, 1.0);
            if t >= 1.0 {
                return endpoints.origin;
            }
            walk(
                paths.map(|p| p.approach.as_slice()),
                params.approach_start(endpoints),
                endpoints.origin,
                t,
            )
        }
        Phase::Arrived => endpoints.origin,
        Phase::TripStarted => {
            let t = progress.clamp(0.0, 1.0);
            walk(
                paths.map(|p| p.trip.as_slice()),
                endpoints.origin,
                endpoints.destination,
                t,
            )
        }
        Phase::Completed => endpoints.destination,
    }
}

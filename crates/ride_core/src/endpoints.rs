//! Trip anchor coordinates supplied by the booking flow.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::geo::GeoPoint;

/// Pickup used when the booking flow hands over a missing or malformed value.
pub const DEFAULT_PICKUP: GeoPoint = GeoPoint::new(19.076, 72.8777);
/// Dropoff used when the booking flow hands over a missing or malformed value.
pub const DEFAULT_DROPOFF: GeoPoint = GeoPoint::new(19.0288, 72.8544);

/// Origin (pickup) and destination (dropoff) of one ride.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripEndpoints {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

impl Default for TripEndpoints {
    fn default() -> Self {
        Self {
            origin: DEFAULT_PICKUP,
            destination: DEFAULT_DROPOFF,
        }
    }
}

impl TripEndpoints {
    /// Non-finite points are replaced by the matching default.
    pub fn new(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin: sanitize(origin, DEFAULT_PICKUP, "pickup"),
            destination: sanitize(destination, DEFAULT_DROPOFF, "dropoff"),
        }
    }

    /// Build endpoints from the raw `plat`/`plon`/`dlat`/`dlon` strings the
    /// booking flow passes along. Each pair falls back to its default on its
    /// own when either half is missing or not a finite number.
    pub fn from_query(
        plat: Option<&str>,
        plon: Option<&str>,
        dlat: Option<&str>,
        dlon: Option<&str>,
    ) -> Self {
        Self {
            origin: parse_pair(plat, plon).unwrap_or_else(|| {
                warn!("pickup coordinates missing or malformed, using default pickup");
                DEFAULT_PICKUP
            }),
            destination: parse_pair(dlat, dlon).unwrap_or_else(|| {
                warn!("dropoff coordinates missing or malformed, using default dropoff");
                DEFAULT_DROPOFF
            }),
        }
    }
}

fn sanitize(point: GeoPoint, default: GeoPoint, which: &str) -> GeoPoint {
    if point.is_finite() {
        point
    } else {
        warn!(which, "non-finite coordinate replaced by default");
        default
    }
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_pair(lat: Option<&str>, lng: Option<&str>) -> Option<GeoPoint> {
    Some(GeoPoint::new(parse_coordinate(lat)?, parse_coordinate(lng)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_query_is_used_verbatim() {
        let endpoints = TripEndpoints::from_query(
            Some("17.3616"),
            Some("78.4747"),
            Some(" 17.4239 "),
            Some("78.4738"),
        );
        assert_eq!(endpoints.origin, GeoPoint::new(17.3616, 78.4747));
        assert_eq!(endpoints.destination, GeoPoint::new(17.4239, 78.4738));
    }

    #[test]
    fn each_malformed_pair_falls_back_independently() {
        let endpoints =
            TripEndpoints::from_query(Some("abc"), Some("78.4747"), Some("17.4"), Some("78.4"));
        assert_eq!(endpoints.origin, DEFAULT_PICKUP);
        assert_eq!(endpoints.destination, GeoPoint::new(17.4, 78.4));

        let endpoints = TripEndpoints::from_query(Some("17.4"), Some("78.4"), None, Some("NaN"));
        assert_eq!(endpoints.origin, GeoPoint::new(17.4, 78.4));
        assert_eq!(endpoints.destination, DEFAULT_DROPOFF);
    }

    #[test]
    fn nothing_supplied_gives_default_pair() {
        assert_eq!(
            TripEndpoints::from_query(None, None, None, None),
            TripEndpoints::default()
        );
    }

    #[test]
    fn new_replaces_non_finite_points() {
        let endpoints = TripEndpoints::new(
            GeoPoint::new(f64::INFINITY, 0.0),
            GeoPoint::new(1.0, 2.0),
        );
        assert_eq!(endpoints.origin, DEFAULT_PICKUP);
        assert_eq!(endpoints.destination, GeoPoint::new(1.0, 2.0));
    }
}

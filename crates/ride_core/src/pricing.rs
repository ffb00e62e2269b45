//! Simple pricing system for the booking-time fare estimate.

use serde::{Deserialize, Serialize};

use crate::driver::VehicleType;
use crate::geo::{haversine_km, GeoPoint};

/// Per-vehicle tariff.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareSchedule {
    /// Base fare in rupees.
    pub base_fare: f64,
    /// Per-kilometer rate in rupees.
    pub per_km_rate: f64,
    /// Average speed assumed for the travel time estimate.
    pub avg_speed_kmh: f64,
}

impl FareSchedule {
    pub fn for_vehicle(vehicle: VehicleType) -> Self {
        match vehicle {
            VehicleType::Car => Self {
                base_fare: 50.0,
                per_km_rate: 14.0,
                avg_speed_kmh: 35.0,
            },
            VehicleType::Bike => Self {
                base_fare: 25.0,
                per_km_rate: 8.0,
                avg_speed_kmh: 30.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    /// Straight-line distance.
    pub distance_km: f64,
    pub eta_minutes: u32,
    /// Rounded to whole rupees.
    pub fare: f64,
}

/// Estimate the fare between two points.
///
/// Formula: `fare = round(base_fare + distance_km * per_km_rate)`,
/// `eta = round(distance_km / avg_speed_kmh * 60)`.
pub fn estimate_fare(origin: GeoPoint, destination: GeoPoint, vehicle: VehicleType) -> FareEstimate {
    let schedule = FareSchedule::for_vehicle(vehicle);
    let distance_km = haversine_km(origin, destination);
    FareEstimate {
        distance_km,
        eta_minutes: (distance_km / schedule.avg_speed_kmh * 60.0).round() as u32,
        fare: (schedule.base_fare + distance_km * schedule.per_km_rate).round(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fare_includes_base_and_distance() {
        let origin = GeoPoint::new(19.076, 72.8777);
        let destination = GeoPoint::new(19.0288, 72.8544);
        let distance = haversine_km(origin, destination);

        let car = estimate_fare(origin, destination, VehicleType::Car);
        assert_eq!(car.fare, (50.0 + distance * 14.0).round());
        assert_eq!(car.eta_minutes, (distance / 35.0 * 60.0).round() as u32);

        let bike = estimate_fare(origin, destination, VehicleType::Bike);
        assert_eq!(bike.fare, (25.0 + distance * 8.0).round());
        assert!(bike.fare < car.fare, "bike should be cheaper than car");
    }

    #[test]
    fn zero_distance_costs_base_fare() {
        let p = GeoPoint::new(17.3616, 78.4747);
        let estimate = estimate_fare(p, p, VehicleType::Car);
        assert_eq!(estimate.distance_km, 0.0);
        assert_eq!(estimate.eta_minutes, 0);
        assert_eq!(estimate.fare, 50.0);
    }
}

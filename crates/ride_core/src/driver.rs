//! Stand-in driver assignment.
//!
//! There is no matching: a driver is drawn from a fixed roster with a seeded
//! RNG so the same seed always yields the same driver.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    #[default]
    Car,
    Bike,
}

/// Profile shown to the rider once a driver is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedDriver {
    pub name: String,
    pub rating: f32,
    pub vehicle: String,
    pub vehicle_type: VehicleType,
    pub plate: String,
}

pub fn default_roster() -> Vec<AssignedDriver> {
    vec![AssignedDriver {
        name: "Priya Sharma".to_string(),
        rating: 4.8,
        vehicle: "Maruti Swift".to_string(),
        vehicle_type: VehicleType::Car,
        plate: "MH 02 AB 1234".to_string(),
    }]
}

/// Pick a driver from `roster`. `None` only for an empty roster.
pub fn assign_driver(roster: &[AssignedDriver], seed: u64) -> Option<AssignedDriver> {
    let mut rng = StdRng::seed_from_u64(seed);
    roster.choose(&mut rng).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_always_yields_the_same_driver() {
        let roster = default_roster();
        for seed in [0, 1, 42] {
            let driver = assign_driver(&roster, seed).expect("driver");
            assert_eq!(driver.name, "Priya Sharma");
            assert_eq!(driver.plate, "MH 02 AB 1234");
        }
    }

    #[test]
    fn assignment_is_deterministic_per_seed() {
        let mut roster = default_roster();
        roster.push(AssignedDriver {
            name: "Arjun Rao".to_string(),
            rating: 4.6,
            vehicle: "Honda Activa".to_string(),
            vehicle_type: VehicleType::Bike,
            plate: "TS 09 CD 5678".to_string(),
        });
        assert_eq!(assign_driver(&roster, 7), assign_driver(&roster, 7));
        assert!(assign_driver(&[], 7).is_none());
    }
}

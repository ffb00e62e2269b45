//! Test helpers for common test setup and utilities.
//!
//! Shared between the unit tests, the integration tests and the benches.

use std::cell::RefCell;
use std::rc::Rc;

use crate::emergency::EmergencyAlert;
use crate::geo::GeoPoint;
use crate::phase::Phase;
use crate::routing::{RouteError, RouteProvider};
use crate::telemetry::TripUpdate;

/// Pickup used across tests (Mumbai).
pub const TEST_ORIGIN: GeoPoint = GeoPoint::new(19.076, 72.8777);
/// Dropoff used across tests (Mumbai).
pub const TEST_DESTINATION: GeoPoint = GeoPoint::new(19.0288, 72.8544);

/// Collects every update delivered to the observer it hands out.
#[derive(Debug, Clone, Default)]
pub struct UpdateRecorder {
    updates: Rc<RefCell<Vec<TripUpdate>>>,
}

impl UpdateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer closure that appends into this recorder.
    pub fn observer(&self) -> impl FnMut(&TripUpdate) + 'static {
        let updates = Rc::clone(&self.updates);
        move |update: &TripUpdate| updates.borrow_mut().push(*update)
    }

    pub fn updates(&self) -> Vec<TripUpdate> {
        self.updates.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.updates.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.borrow().is_empty()
    }

    pub fn last(&self) -> Option<TripUpdate> {
        self.updates.borrow().last().copied()
    }

    /// Distinct phases in the order they were observed.
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases: Vec<Phase> = Vec::new();
        for update in self.updates.borrow().iter() {
            if phases.last() != Some(&update.phase) {
                phases.push(update.phase);
            }
        }
        phases
    }

    /// Updates observed while in `phase`.
    pub fn in_phase(&self, phase: Phase) -> Vec<TripUpdate> {
        self.updates
            .borrow()
            .iter()
            .filter(|u| u.phase == phase)
            .copied()
            .collect()
    }

    /// First update at or after `timestamp_ms`.
    pub fn first_at_or_after(&self, timestamp_ms: u64) -> Option<TripUpdate> {
        self.updates
            .borrow()
            .iter()
            .find(|u| u.timestamp_ms >= timestamp_ms)
            .copied()
    }
}

/// Collects raised SOS alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertRecorder {
    alerts: Rc<RefCell<Vec<EmergencyAlert>>>,
}

impl AlertRecorder {
    pub fn sink(&self) -> impl FnMut(EmergencyAlert) + 'static {
        let alerts = Rc::clone(&self.alerts);
        move |alert| alerts.borrow_mut().push(alert)
    }

    pub fn alerts(&self) -> Vec<EmergencyAlert> {
        self.alerts.borrow().clone()
    }
}

/// A route provider whose every request fails.
#[derive(Debug, Default)]
pub struct FailingRouteProvider;

impl RouteProvider for FailingRouteProvider {
    fn fetch_route(&self, _from: GeoPoint, _to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
        Err(RouteError::NoRoute)
    }
}

/// A route provider that goes through a fixed waypoint between the two ends.
#[derive(Debug)]
pub struct WaypointRouteProvider {
    pub waypoint: GeoPoint,
}

impl RouteProvider for WaypointRouteProvider {
    fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
        Ok(vec![from, self.waypoint, to])
    }
}

/// Approximate equality for coordinates.
pub fn approx_eq(a: GeoPoint, b: GeoPoint, eps: f64) -> bool {
    (a.lat - b.lat).abs() <= eps && (a.lng - b.lng).abs() <= eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_deduplicates_consecutive_phases() {
        let recorder = UpdateRecorder::new();
        let mut observer = recorder.observer();
        for (ts, phase) in [(0, Phase::Searching), (1, Phase::Searching), (2, Phase::DriverAssigned)] {
            observer(&TripUpdate {
                timestamp_ms: ts,
                phase,
                progress: 0.0,
                position: TEST_ORIGIN,
                eta_minutes: None,
            });
        }
        assert_eq!(recorder.len(), 3);
        assert_eq!(recorder.phases(), vec![Phase::Searching, Phase::DriverAssigned]);
    }

    #[test]
    fn failing_provider_always_errors() {
        assert!(FailingRouteProvider
            .fetch_route(TEST_ORIGIN, TEST_DESTINATION)
            .is_err());
    }
}

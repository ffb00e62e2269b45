//! What the engine reports: per-update snapshots for consumers and a log of
//! phase transitions.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::phase::Phase;

/// One observation delivered to the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripUpdate {
    pub timestamp_ms: u64,
    pub phase: Phase,
    pub progress: f64,
    pub position: GeoPoint,
    /// Only reported while the trip is in progress.
    pub eta_minutes: Option<u32>,
}

/// Updates produced by the current schedule run, waiting to be handed to
/// observers by the session.
#[derive(Debug, Default, Resource)]
pub struct UpdateOutbox {
    pub updates: Vec<TripUpdate>,
}

impl UpdateOutbox {
    pub fn push(&mut self, update: TripUpdate) {
        self.updates.push(update);
    }

    pub fn drain(&mut self) -> Vec<TripUpdate> {
        std::mem::take(&mut self.updates)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    pub phase: Phase,
    pub at_ms: u64,
}

/// Every phase the session entered, in order, starting with the initial one.
#[derive(Debug, Default, Resource)]
pub struct PhaseLog {
    pub transitions: Vec<PhaseTransition>,
}

impl PhaseLog {
    pub fn record(&mut self, phase: Phase, at_ms: u64) {
        debug_assert!(
            self.transitions.last().map_or(true, |last| last.phase < phase),
            "phase order must be strictly increasing"
        );
        self.transitions.push(PhaseTransition { phase, at_ms });
    }

    /// When `phase` was entered, if it has been.
    pub fn entered_at(&self, phase: Phase) -> Option<u64> {
        self.transitions
            .iter()
            .find(|t| t.phase == phase)
            .map(|t| t.at_ms)
    }

    /// Time spent in `phase`; `None` until the phase has been left.
    pub fn time_in(&self, phase: Phase) -> Option<u64> {
        let idx = self.transitions.iter().position(|t| t.phase == phase)?;
        let next = self.transitions.get(idx + 1)?;
        Some(next.at_ms.saturating_sub(self.transitions[idx].at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_in_phase_uses_next_transition() {
        let mut log = PhaseLog::default();
        log.record(Phase::Searching, 0);
        log.record(Phase::DriverAssigned, 3000);
        assert_eq!(log.time_in(Phase::Searching), Some(3000));
        assert_eq!(log.time_in(Phase::DriverAssigned), None);
        assert_eq!(log.entered_at(Phase::DriverAssigned), Some(3000));
        assert_eq!(log.entered_at(Phase::Completed), None);
    }

    #[test]
    fn outbox_drains_in_order() {
        let mut outbox = UpdateOutbox::default();
        for ts in [1, 2] {
            outbox.push(TripUpdate {
                timestamp_ms: ts,
                phase: Phase::TripStarted,
                progress: 0.0,
                position: GeoPoint::new(0.0, 0.0),
                eta_minutes: Some(15),
            });
        }
        let drained = outbox.drain();
        assert_eq!(drained.iter().map(|u| u.timestamp_ms).collect::<Vec<_>>(), vec![1, 2]);
        assert!(outbox.updates.is_empty());
    }
}

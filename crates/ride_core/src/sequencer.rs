//! Status sequencer: walks the fixed phase order.
//!
//! The only way to change phase is [`advance`], which moves exactly one step
//! forward. Entering a phase tears down whatever the previous phase left on
//! the clock (hold timer, animation frame) before arming the new one.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::animation::FrameTask;
use crate::clock::{EventKind, SimulationClock};
use crate::ecs::{MotionState, PhaseState, TripPlan};
use crate::phase::Phase;

/// Dispatch messages that end a phase in [`crate::config::AdvanceMode::External`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripSignal {
    DriverFound,
    DriverArrived,
    TripEnded,
}

impl TripSignal {
    /// The phase this signal ends.
    pub fn ends(self) -> Phase {
        match self {
            TripSignal::DriverFound => Phase::Searching,
            TripSignal::DriverArrived => Phase::EnRoute,
            TripSignal::TripEnded => Phase::TripStarted,
        }
    }

    /// The signal that ends `phase`, if it is signal-driven.
    pub fn ending(phase: Phase) -> Option<TripSignal> {
        match phase {
            Phase::Searching => Some(TripSignal::DriverFound),
            Phase::EnRoute => Some(TripSignal::DriverArrived),
            Phase::TripStarted => Some(TripSignal::TripEnded),
            _ => None,
        }
    }
}

/// Arm the initial phase of a fresh session.
pub fn begin(clock: &mut SimulationClock, state: &mut PhaseState, plan: &TripPlan) {
    if let Some(hold) = plan.hold_ms(state.phase) {
        state.timer = Some(clock.schedule_in(hold, EventKind::PhaseTimeout));
    }
    info!(phase = %state.phase, at_ms = clock.now(), "trip started in phase");
}

/// Move one phase forward. Returns the phase entered, or `None` at the
/// terminal phase.
pub fn advance(
    clock: &mut SimulationClock,
    state: &mut PhaseState,
    motion: &mut MotionState,
    plan: &TripPlan,
) -> Option<Phase> {
    let next = state.phase.next()?;
    let now = clock.now();

    if let Some(timer) = state.timer.take() {
        clock.cancel(timer);
    }
    motion.stop(clock);

    state.phase = next;
    state.entered_at_ms = now;
    motion.progress = next.initial_progress();

    if next.is_moving() {
        // The hold timer of a moving phase is armed on its first frame.
        motion.frame = Some(FrameTask::start(clock, next, plan.frame_interval_ms));
    } else if let Some(hold) = plan.hold_ms(next) {
        state.timer = Some(clock.schedule_in(hold, EventKind::PhaseTimeout));
    }

    info!(phase = %next, at_ms = now, "phase entered");
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AdvanceMode, EngineConfig};
    use crate::endpoints::TripEndpoints;
    use crate::interpolation::RoutePaths;

    fn plan(mode: AdvanceMode) -> TripPlan {
        let config = EngineConfig::default().with_advance_mode(mode);
        TripPlan::new(TripEndpoints::default(), RoutePaths::default(), &config, None)
    }

    #[test]
    fn advance_replaces_timer_and_starts_frames_for_moving_phase() {
        let plan = plan(AdvanceMode::Timed);
        let mut clock = SimulationClock::default();
        let mut state = PhaseState::new(Phase::DriverAssigned, 0);
        let mut motion = MotionState::new(Phase::DriverAssigned);
        state.timer = Some(clock.schedule_in(2000, EventKind::PhaseTimeout));

        assert_eq!(
            advance(&mut clock, &mut state, &mut motion, &plan),
            Some(Phase::EnRoute)
        );
        assert!(state.timer.is_none());
        assert_eq!(motion.progress, -1.0);
        assert!(motion.is_animating());
        assert_eq!(clock.pending_count(), 1);
        assert_eq!(clock.next_event_time(), Some(16));
    }

    #[test]
    fn advance_stops_frames_when_leaving_moving_phase() {
        let plan = plan(AdvanceMode::Timed);
        let mut clock = SimulationClock::default();
        let mut state = PhaseState::new(Phase::EnRoute, 0);
        let mut motion = MotionState::new(Phase::EnRoute);
        motion.frame = Some(FrameTask::start(&mut clock, Phase::EnRoute, 16));

        assert_eq!(
            advance(&mut clock, &mut state, &mut motion, &plan),
            Some(Phase::Arrived)
        );
        assert!(!motion.is_animating());
        assert_eq!(motion.progress, 0.0);
        // Only the arrived hold timer is left.
        assert_eq!(clock.pending_count(), 1);
        assert_eq!(clock.next_event_time(), Some(3000));
    }

    #[test]
    fn terminal_phase_does_not_advance() {
        let plan = plan(AdvanceMode::Timed);
        let mut clock = SimulationClock::default();
        let mut state = PhaseState::new(Phase::Completed, 0);
        let mut motion = MotionState::new(Phase::Completed);
        assert_eq!(advance(&mut clock, &mut state, &mut motion, &plan), None);
        assert_eq!(state.phase, Phase::Completed);
        assert!(clock.is_empty());
    }

    #[test]
    fn external_mode_leaves_signal_phases_without_timer() {
        let plan = plan(AdvanceMode::External);
        let mut clock = SimulationClock::default();
        let mut state = PhaseState::new(Phase::Searching, 0);
        begin(&mut clock, &mut state, &plan);
        assert!(state.timer.is_none());
        assert!(clock.is_empty());

        let mut motion = MotionState::new(Phase::Searching);
        advance(&mut clock, &mut state, &mut motion, &plan);
        assert_eq!(state.phase, Phase::DriverAssigned);
        assert!(state.timer.is_some());
    }

    #[test]
    fn signals_map_to_the_phase_they_end() {
        for phase in Phase::ALL {
            if let Some(signal) = TripSignal::ending(phase) {
                assert_eq!(signal.ends(), phase);
            }
        }
    }
}

use bevy_ecs::prelude::{Res, ResMut};
use tracing::debug;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{MotionState, PhaseState, TripPlan};
use crate::sequencer::advance;
use crate::telemetry::{PhaseLog, UpdateOutbox};

/// A hold timer elapsed: move to the next phase.
pub fn phase_timeout_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut state: ResMut<PhaseState>,
    mut motion: ResMut<MotionState>,
    plan: Res<TripPlan>,
    mut outbox: ResMut<UpdateOutbox>,
    mut log: ResMut<PhaseLog>,
) {
    if event.0.kind != EventKind::PhaseTimeout {
        return;
    }
    if state.timer != Some(event.0.id) {
        debug!(phase = %state.phase, "stale phase timer ignored");
        return;
    }
    state.timer = None;

    if let Some(next) = advance(&mut clock, &mut state, &mut motion, &plan) {
        let now = clock.now();
        log.record(next, now);
        outbox.push(plan.update(now, next, motion.progress));
    }
}

use bevy_ecs::prelude::{Res, ResMut};
use tracing::warn;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{MotionState, PhaseState, TripPlan};
use crate::sequencer::advance;
use crate::telemetry::{PhaseLog, UpdateOutbox};

/// A dispatch message ended the current phase.
pub fn external_signal_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut state: ResMut<PhaseState>,
    mut motion: ResMut<MotionState>,
    plan: Res<TripPlan>,
    mut outbox: ResMut<UpdateOutbox>,
    mut log: ResMut<PhaseLog>,
) {
    if event.0.kind != EventKind::ExternalSignal {
        return;
    }
    let Some(signal) = event.0.signal else {
        return;
    };
    if signal.ends() != state.phase {
        warn!(?signal, phase = %state.phase, "signal does not apply to current phase");
        return;
    }

    if let Some(next) = advance(&mut clock, &mut state, &mut motion, &plan) {
        let now = clock.now();
        log.record(next, now);
        outbox.push(plan.update(now, next, motion.progress));
    }
}

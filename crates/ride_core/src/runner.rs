//! Runner: advances the clock and routes events into the ECS.
//!
//! Each step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. Only the system for that event's
//! kind runs.

use bevy_ecs::prelude::{Res, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::systems::{
    animation_frame::animation_frame_system, external_signal::external_signal_system,
    phase_timeout::phase_timeout_system,
};

fn is_animation_frame(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::AnimationFrame)
        .unwrap_or(false)
}

fn is_phase_timeout(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::PhaseTimeout)
        .unwrap_or(false)
}

fn is_external_signal(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ExternalSignal)
        .unwrap_or(false)
}

/// Builds the engine schedule: one system per event kind, gated on it.
pub fn engine_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        // AnimationFrame
        animation_frame_system.run_if(is_animation_frame),
        // PhaseTimeout
        phase_timeout_system.run_if(is_phase_timeout),
        // ExternalSignal
        external_signal_system.run_if(is_external_signal),
    ));
    schedule
}

/// Runs one step if the next event is due at or before `until_ms`.
/// Returns `true` if an event was processed.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule, until_ms: u64) -> bool {
    let due = world
        .resource::<SimulationClock>()
        .next_event_time()
        .is_some_and(|ts| ts <= until_ms);
    if !due {
        return false;
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Processes every event due at or before `until_ms` (at most `max_steps`),
/// then moves the clock to `until_ms`. Returns the number of steps executed.
pub fn run_until(
    world: &mut World,
    schedule: &mut Schedule,
    until_ms: u64,
    max_steps: usize,
) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule, until_ms) {
        steps += 1;
    }
    if steps < max_steps {
        world.resource_mut::<SimulationClock>().advance_to(until_ms);
    }
    steps
}

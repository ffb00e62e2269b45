use bevy_ecs::prelude::{Res, ResMut};
use tracing::{debug, trace};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{MotionState, PhaseState, TripPlan};
use crate::telemetry::UpdateOutbox;

/// Sample the running frame task and publish the new position.
///
/// The first sample of a moving phase also arms that phase's hold timer, so
/// the animation spans the whole hold.
pub fn animation_frame_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut state: ResMut<PhaseState>,
    mut motion: ResMut<MotionState>,
    plan: Res<TripPlan>,
    mut outbox: ResMut<UpdateOutbox>,
) {
    if event.0.kind != EventKind::AnimationFrame {
        return;
    }

    let phase = state.phase;
    let motion = &mut *motion;
    let Some(task) = motion.frame.as_mut().filter(|task| task.owns(event.0.id)) else {
        debug!(phase = %phase, "stale animation frame ignored");
        return;
    };
    if task.phase() != phase {
        debug!(phase = %phase, "frame task outlived its phase");
        return;
    }

    let sample = task.sample(&mut clock, plan.animation_ms(phase));
    motion.progress = sample.progress;

    if sample.first {
        if let Some(hold) = plan.hold_ms(phase) {
            state.timer = Some(clock.schedule_in(hold, EventKind::PhaseTimeout));
        }
    }

    trace!(phase = %phase, progress = sample.progress, "animation frame");
    outbox.push(plan.update(clock.now(), phase, motion.progress));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameTask;
    use crate::config::EngineConfig;
    use crate::endpoints::TripEndpoints;
    use crate::interpolation::RoutePaths;
    use crate::phase::Phase;
    use bevy_ecs::prelude::{Schedule, World};

    fn trip_started_world() -> World {
        let mut world = World::new();
        let mut clock = SimulationClock::default();
        let frame = FrameTask::start(&mut clock, Phase::TripStarted, 16);
        world.insert_resource(clock);
        world.insert_resource(PhaseState::new(Phase::TripStarted, 0));
        world.insert_resource(MotionState {
            progress: 0.0,
            frame: Some(frame),
        });
        world.insert_resource(TripPlan::new(
            TripEndpoints::default(),
            RoutePaths::default(),
            &EngineConfig::default(),
            None,
        ));
        world.insert_resource(UpdateOutbox::default());
        world
    }

    fn fire_next(world: &mut World, schedule: &mut Schedule) {
        let event = world
            .resource_mut::<SimulationClock>()
            .pop_next()
            .expect("pending event");
        world.insert_resource(CurrentEvent(event));
        schedule.run(world);
    }

    #[test]
    fn first_frame_arms_hold_timer_and_schedules_next_frame() {
        let mut world = trip_started_world();
        let mut schedule = Schedule::default();
        schedule.add_systems(animation_frame_system);

        fire_next(&mut world, &mut schedule);

        let timer = world.resource::<PhaseState>().timer.expect("hold timer");
        let clock = world.resource::<SimulationClock>();
        assert!(clock.is_pending(timer));
        assert_eq!(clock.pending_count(), 2);
        assert_eq!(clock.next_event_time(), Some(32));

        let updates = &world.resource::<UpdateOutbox>().updates;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].timestamp_ms, 16);
        assert_eq!(updates[0].progress, 0.0);
    }

    #[test]
    fn progress_tracks_elapsed_time() {
        let mut world = trip_started_world();
        let mut schedule = Schedule::default();
        schedule.add_systems(animation_frame_system);

        // Reference start at 16; 250 frames later is the midpoint of 8000 ms.
        for _ in 0..251 {
            fire_next(&mut world, &mut schedule);
        }
        let motion = world.resource::<MotionState>();
        assert_eq!(motion.progress, 0.5);
        let last = world.resource::<UpdateOutbox>().updates.last().copied().expect("update");
        assert_eq!(last.timestamp_ms, 16 + 4000);
        assert_eq!(last.eta_minutes, Some(8));
    }
}

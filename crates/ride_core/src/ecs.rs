//! Engine state held as resources of a per-session `World`.

use bevy_ecs::prelude::Resource;

use crate::animation::FrameTask;
use crate::clock::{SimulationClock, TimerId};
use crate::config::{AdvanceMode, EngineConfig, PhaseDurations};
use crate::driver::AssignedDriver;
use crate::endpoints::TripEndpoints;
use crate::eta::eta_minutes;
use crate::geo::GeoPoint;
use crate::interpolation::{position, ExtrapolationParams, RoutePaths};
use crate::phase::Phase;
use crate::sequencer::TripSignal;
use crate::telemetry::TripUpdate;

/// Current lifecycle phase and its pending hold timer.
#[derive(Debug, Clone, Resource)]
pub struct PhaseState {
    pub phase: Phase,
    pub entered_at_ms: u64,
    pub timer: Option<TimerId>,
}

impl PhaseState {
    pub fn new(phase: Phase, entered_at_ms: u64) -> Self {
        Self {
            phase,
            entered_at_ms,
            timer: None,
        }
    }
}

/// Progress of the current phase and the frame task that drives it.
#[derive(Debug, Clone, Resource)]
pub struct MotionState {
    pub progress: f64,
    pub frame: Option<FrameTask>,
}

impl MotionState {
    pub fn new(phase: Phase) -> Self {
        Self {
            progress: phase.initial_progress(),
            frame: None,
        }
    }

    pub fn stop(&mut self, clock: &mut SimulationClock) {
        if let Some(mut frame) = self.frame.take() {
            frame.stop(clock);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.frame.as_ref().is_some_and(FrameTask::is_running)
    }
}

/// Everything fixed for the lifetime of one trip.
#[derive(Debug, Clone, Resource)]
pub struct TripPlan {
    pub endpoints: TripEndpoints,
    pub paths: RoutePaths,
    pub extrapolation: ExtrapolationParams,
    pub durations: PhaseDurations,
    pub frame_interval_ms: u64,
    pub assumed_trip_minutes: u32,
    pub advance_mode: AdvanceMode,
    pub driver: Option<AssignedDriver>,
}

impl TripPlan {
    pub fn new(
        endpoints: TripEndpoints,
        paths: RoutePaths,
        config: &EngineConfig,
        driver: Option<AssignedDriver>,
    ) -> Self {
        Self {
            endpoints,
            paths,
            extrapolation: config.extrapolation,
            durations: config.durations,
            frame_interval_ms: config.frame_interval_ms.max(1),
            assumed_trip_minutes: config.assumed_trip_minutes,
            advance_mode: config.advance_mode,
            driver,
        }
    }

    /// How long `phase` is held before its timer fires; `None` when nothing
    /// but a signal (or nothing at all) ends it.
    pub fn hold_ms(&self, phase: Phase) -> Option<u64> {
        if self.advance_mode == AdvanceMode::External && TripSignal::ending(phase).is_some() {
            return None;
        }
        self.durations.get(phase)
    }

    /// Length of the animation of a moving phase.
    pub fn animation_ms(&self, phase: Phase) -> u64 {
        self.durations.get(phase).unwrap_or(0)
    }

    pub fn position(&self, phase: Phase, progress: f64) -> GeoPoint {
        position(
            phase,
            progress,
            &self.endpoints,
            &self.extrapolation,
            Some(&self.paths),
        )
    }

    pub fn update(&self, timestamp_ms: u64, phase: Phase, progress: f64) -> TripUpdate {
        TripUpdate {
            timestamp_ms,
            phase,
            progress,
            position: self.position(phase, progress),
            eta_minutes: (phase == Phase::TripStarted)
                .then(|| eta_minutes(progress, self.assumed_trip_minutes)),
        }
    }
}

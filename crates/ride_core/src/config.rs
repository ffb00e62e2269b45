//! Engine configuration: phase durations, frame cadence, and tuning knobs.
//!
//! Every field has a default matching the baseline trip, so a partial JSON
//! document only needs to name what it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::eta::DEFAULT_ASSUMED_TRIP_MINUTES;
use crate::interpolation::ExtrapolationParams;
use crate::phase::Phase;
use crate::routing::RouteProviderKind;

/// Default animation sampling interval: one 60 Hz display frame (rounded).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

/// How long each non-terminal phase is held before auto-advancing (ms).
///
/// The hold of a moving phase (en route, trip started) starts on its first
/// animation frame, so that phase lasts its duration plus one
/// `frame_interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseDurations {
    pub searching_ms: u64,
    pub driver_assigned_ms: u64,
    pub en_route_ms: u64,
    pub arrived_ms: u64,
    pub trip_started_ms: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            searching_ms: 3000,
            driver_assigned_ms: 2000,
            en_route_ms: 4000,
            arrived_ms: 3000,
            trip_started_ms: 8000,
        }
    }
}

impl PhaseDurations {
    /// Hold duration for `phase`; `None` for the terminal phase.
    pub fn get(&self, phase: Phase) -> Option<u64> {
        match phase {
            Phase::Searching => Some(self.searching_ms),
            Phase::DriverAssigned => Some(self.driver_assigned_ms),
            Phase::EnRoute => Some(self.en_route_ms),
            Phase::Arrived => Some(self.arrived_ms),
            Phase::TripStarted => Some(self.trip_started_ms),
            Phase::Completed => None,
        }
    }
}

/// What moves the sequencer forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceMode {
    /// Every phase advances on its own timer.
    #[default]
    Timed,
    /// Searching, en route and trip started wait for a
    /// [`crate::sequencer::TripSignal`]; the other phases keep their timers.
    External,
}

/// Parameters for one trip session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub durations: PhaseDurations,
    /// Interval between animation samples during moving phases (ms).
    pub frame_interval_ms: u64,
    pub extrapolation: ExtrapolationParams,
    /// Assumed length of the whole ride, used by the ETA estimator.
    pub assumed_trip_minutes: u32,
    pub advance_mode: AdvanceMode,
    pub route_provider: RouteProviderKind,
    /// Seed for the stand-in driver assignment.
    pub driver_seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            durations: PhaseDurations::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            extrapolation: ExtrapolationParams::default(),
            assumed_trip_minutes: DEFAULT_ASSUMED_TRIP_MINUTES,
            advance_mode: AdvanceMode::default(),
            route_provider: RouteProviderKind::default(),
            driver_seed: 0,
        }
    }
}

impl EngineConfig {
    pub fn with_durations(mut self, durations: PhaseDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_frame_interval_ms(mut self, interval_ms: u64) -> Self {
        self.frame_interval_ms = interval_ms;
        self
    }

    pub fn with_extrapolation(mut self, extrapolation: ExtrapolationParams) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    pub fn with_assumed_trip_minutes(mut self, minutes: u32) -> Self {
        self.assumed_trip_minutes = minutes;
        self
    }

    pub fn with_advance_mode(mut self, mode: AdvanceMode) -> Self {
        self.advance_mode = mode;
        self
    }

    pub fn with_route_provider(mut self, kind: RouteProviderKind) -> Self {
        self.route_provider = kind;
        self
    }

    pub fn with_driver_seed(mut self, seed: u64) -> Self {
        self.driver_seed = seed;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Reject values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be greater than zero".to_string(),
            ));
        }
        for phase in Phase::ALL.into_iter().filter(|p| p.is_moving()) {
            if self.durations.get(phase) == Some(0) {
                return Err(ConfigError::Invalid(format!(
                    "duration of moving phase {phase} must be greater than zero"
                )));
            }
        }
        if !self.extrapolation.idle_ratio.is_finite() || !self.extrapolation.approach_ratio.is_finite()
        {
            return Err(ConfigError::Invalid(
                "extrapolation ratios must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

//! Ride lifecycle phases.

use serde::{Deserialize, Serialize};

/// One stage of the ride lifecycle. The declaration order is the only order
/// the sequencer ever walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Searching,
    DriverAssigned,
    EnRoute,
    Arrived,
    TripStarted,
    Completed,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Searching,
        Phase::DriverAssigned,
        Phase::EnRoute,
        Phase::Arrived,
        Phase::TripStarted,
        Phase::Completed,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// The phase that follows this one, or `None` at the terminal phase.
    pub fn next(self) -> Option<Phase> {
        Phase::ALL.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Phase::Completed
    }

    /// Phases during which the animation driver samples progress.
    pub fn is_moving(self) -> bool {
        matches!(self, Phase::EnRoute | Phase::TripStarted)
    }

    /// Valid progress range for this phase.
    pub fn progress_domain(self) -> (f64, f64) {
        match self {
            Phase::EnRoute => (-1.0, 0.0),
            _ => (0.0, 1.0),
        }
    }

    /// Progress value the phase starts from.
    pub fn initial_progress(self) -> f64 {
        match self {
            Phase::EnRoute => -1.0,
            Phase::Completed => 1.0,
            _ => 0.0,
        }
    }

    /// Maps an animation fraction `t` in `[0, 1]` onto this phase's progress
    /// domain and clamps the result.
    pub fn progress_at(self, t: f64) -> f64 {
        let (lo, _) = self.progress_domain();
        self.clamp_progress(lo + t)
    }

    pub fn clamp_progress(self, progress: f64) -> f64 {
        let (lo, hi) = self.progress_domain();
        if progress.is_nan() {
            return self.initial_progress();
        }
        progress.clamp(lo, hi)
    }

    /// Human readable status line.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Searching => "Searching for driver…",
            Phase::DriverAssigned => "Driver assigned!",
            Phase::EnRoute => "Driver en route to you",
            Phase::Arrived => "Driver has arrived",
            Phase::TripStarted => "Trip in progress",
            Phase::Completed => "Trip completed!",
        }
    }

    /// Whether an SOS can be raised in this phase.
    pub fn allows_sos(self) -> bool {
        !matches!(self, Phase::Searching | Phase::Completed)
    }

    /// Each phase paired with its state relative to `current`.
    pub fn timeline(current: Phase) -> impl Iterator<Item = (Phase, TimelineStep)> {
        Phase::ALL.into_iter().map(move |phase| {
            let step = match phase.cmp(&current) {
                std::cmp::Ordering::Less => TimelineStep::Done,
                std::cmp::Ordering::Equal => TimelineStep::Active,
                std::cmp::Ordering::Greater => TimelineStep::Pending,
            };
            (phase, step)
        })
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Searching => "searching",
            Phase::DriverAssigned => "driver_assigned",
            Phase::EnRoute => "en_route",
            Phase::Arrived => "arrived",
            Phase::TripStarted => "trip_started",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStep {
    Done,
    Active,
    Pending,
}

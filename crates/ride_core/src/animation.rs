//! Animation driver: the per-frame sampling loop of a moving phase.
//!
//! A [`FrameTask`] is a cancellable repeating task. It keeps at most one
//! `AnimationFrame` event pending on the clock and re-arms itself after each
//! sample until the fraction reaches 1. [`FrameTask::stop`] withdraws the
//! pending event, so a stopped task can never sample again.

use tracing::debug;

use crate::clock::{EventKind, SimulationClock, TimerId};
use crate::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    pub progress: f64,
    /// Fraction of the phase duration elapsed, in `[0, 1]`.
    pub fraction: f64,
    /// This was the sample that fixed the reference start time.
    pub first: bool,
    /// No further frame was scheduled.
    pub finished: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameTask {
    phase: Phase,
    interval_ms: u64,
    started_at_ms: Option<u64>,
    pending: Option<TimerId>,
}

impl FrameTask {
    /// Schedule the first frame one interval from now.
    pub fn start(clock: &mut SimulationClock, phase: Phase, interval_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        let pending = clock.schedule_in(interval_ms, EventKind::AnimationFrame);
        Self {
            phase,
            interval_ms,
            started_at_ms: None,
            pending: Some(pending),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Whether `id` is the frame this task is waiting for.
    pub fn owns(&self, id: TimerId) -> bool {
        self.pending == Some(id)
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Withdraw the pending frame, if any.
    pub fn stop(&mut self, clock: &mut SimulationClock) {
        if let Some(id) = self.pending.take() {
            clock.cancel(id);
            debug!(phase = %self.phase, "animation frames stopped");
        }
    }

    /// Take one sample at the clock's current time and re-arm if unfinished.
    pub fn sample(&mut self, clock: &mut SimulationClock, duration_ms: u64) -> FrameSample {
        let now = clock.now();
        self.pending = None;
        let first = self.started_at_ms.is_none();
        let start = *self.started_at_ms.get_or_insert(now);
        let elapsed = now.saturating_sub(start);
        let fraction = if duration_ms == 0 {
            1.0
        } else {
            (elapsed as f64 / duration_ms as f64).min(1.0)
        };
        let finished = fraction >= 1.0;
        if !finished {
            self.pending = Some(clock.schedule_in(self.interval_ms, EventKind::AnimationFrame));
        }
        FrameSample {
            progress: self.phase.progress_at(fraction),
            fraction,
            first,
            finished,
        }
    }
}

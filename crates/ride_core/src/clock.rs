//! Event clock for one trip session.
//!
//! Pending timers live in a min-heap keyed by timestamp. Every scheduled event
//! gets a [`TimerId`] so its owner can withdraw it before it fires; a
//! withdrawn event is removed from the heap, not merely flagged.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::sequencer::TripSignal;

/// Kinds of events the engine reacts to. The declaration order breaks ties
/// between events sharing a timestamp: a final animation sample lands before
/// the phase timer that ends its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    AnimationFrame,
    PhaseTimeout,
    ExternalSignal,
}

/// Handle for a scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub id: TimerId,
    /// Set only on [`EventKind::ExternalSignal`].
    pub signal: Option<TripSignal>,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by timestamp; ids are
        // handed out monotonically so equal (timestamp, kind) pairs pop FIFO.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The event being processed by the current schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    next_id: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind) -> TimerId {
        self.push(timestamp, kind, None)
    }

    pub fn schedule_in(&mut self, delay_ms: u64, kind: EventKind) -> TimerId {
        self.push(self.now.saturating_add(delay_ms), kind, None)
    }

    /// Schedule an external signal to be handled at the current time.
    pub fn schedule_signal(&mut self, signal: TripSignal) -> TimerId {
        self.push(self.now, EventKind::ExternalSignal, Some(signal))
    }

    fn push(&mut self, timestamp: u64, kind: EventKind, signal: Option<TripSignal>) -> TimerId {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.events.push(Event {
            timestamp,
            kind,
            id,
            signal,
        });
        id
    }

    /// Remove a pending event. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    /// Drop every pending event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.events.iter().any(|event| event.id == id)
    }

    pub fn next_event_time(&self) -> Option<u64> {
        self.events.peek().map(|e| e.timestamp)
    }

    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    pub fn pending_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pops_events_in_time_order() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(10, EventKind::PhaseTimeout);
        clock.schedule_at(5, EventKind::PhaseTimeout);
        clock.schedule_at(20, EventKind::PhaseTimeout);

        let first = clock.pop_next().expect("first event");
        assert_eq!(first.timestamp, 5);
        assert_eq!(clock.now(), 5);

        let second = clock.pop_next().expect("second event");
        assert_eq!(second.timestamp, 10);
        assert_eq!(clock.now(), 10);

        let third = clock.pop_next().expect("third event");
        assert_eq!(third.timestamp, 20);
        assert_eq!(clock.now(), 20);

        assert!(clock.pop_next().is_none());
        assert!(clock.is_empty());
    }

    #[test]
    fn frame_sorts_before_timeout_at_same_timestamp() {
        let mut clock = SimulationClock::default();
        clock.schedule_at(100, EventKind::PhaseTimeout);
        clock.schedule_at(100, EventKind::AnimationFrame);

        assert_eq!(clock.pop_next().map(|e| e.kind), Some(EventKind::AnimationFrame));
        assert_eq!(clock.pop_next().map(|e| e.kind), Some(EventKind::PhaseTimeout));
    }

    #[test]
    fn cancel_removes_pending_event() {
        let mut clock = SimulationClock::default();
        let keep = clock.schedule_in(10, EventKind::PhaseTimeout);
        let drop = clock.schedule_in(5, EventKind::AnimationFrame);

        assert!(clock.cancel(drop));
        assert!(!clock.cancel(drop));
        assert!(!clock.is_pending(drop));
        assert!(clock.is_pending(keep));

        let event = clock.pop_next().expect("remaining event");
        assert_eq!(event.id, keep);
        assert!(clock.is_empty());
    }

    #[test]
    fn advance_to_never_rewinds() {
        let mut clock = SimulationClock::default();
        clock.advance_to(50);
        clock.advance_to(20);
        assert_eq!(clock.now(), 50);
        let id = clock.schedule_in(5, EventKind::PhaseTimeout);
        assert_eq!(clock.pop_next().map(|e| (e.id, e.timestamp)), Some((id, 55)));
    }
}

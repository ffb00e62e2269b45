//! Event-reacting systems. Each one handles a single [`crate::clock::EventKind`]
//! and is gated on it by the runner.

pub mod animation_frame;
pub mod external_signal;
pub mod phase_timeout;

use thiserror::Error;

use crate::phase::Phase;
use crate::sequencer::TripSignal;

/// Errors returned by [`crate::session::TripSession`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("session was cancelled")]
    Cancelled,

    #[error("external signals are disabled in timed mode")]
    SignalsDisabled,

    #[error("signal {signal:?} does not apply to phase {phase}")]
    UnexpectedSignal { signal: TripSignal, phase: Phase },
}

/// Errors raised while loading or validating an [`crate::config::EngineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

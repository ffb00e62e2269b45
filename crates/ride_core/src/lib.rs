pub mod geo;
pub mod phase;
pub mod clock;
pub mod config;
pub mod ecs;
pub mod runner;
pub mod sequencer;
pub mod animation;
pub mod interpolation;
pub mod eta;
pub mod endpoints;
pub mod routing;
pub mod pricing;
pub mod driver;
pub mod emergency;
pub mod error;
pub mod session;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#![allow(dead_code)]

use ride_core::config::{AdvanceMode, EngineConfig};
use ride_core::endpoints::TripEndpoints;
use ride_core::routing::{RouteProvider, StraightLineRouteProvider};
use ride_core::session::TripSession;
use ride_core::test_helpers::{UpdateRecorder, TEST_DESTINATION, TEST_ORIGIN};

/// Mumbai pickup and dropoff.
pub fn test_endpoints() -> TripEndpoints {
    TripEndpoints::new(TEST_ORIGIN, TEST_DESTINATION)
}

/// A session with default timings and straight-line routes, plus a recorder
/// already subscribed to it.
pub fn recorded_session(config: EngineConfig) -> (TripSession, UpdateRecorder) {
    recorded_session_with(config, &StraightLineRouteProvider)
}

pub fn recorded_session_with(
    config: EngineConfig,
    routes: &dyn RouteProvider,
) -> (TripSession, UpdateRecorder) {
    let mut session = TripSession::open(test_endpoints(), config, routes);
    let recorder = UpdateRecorder::new();
    session.subscribe(recorder.observer());
    (session, recorder)
}

pub fn external_session() -> (TripSession, UpdateRecorder) {
    recorded_session(EngineConfig::default().with_advance_mode(AdvanceMode::External))
}

/// Advance in display-sized steps, the way a host render loop would.
pub fn drive_in_steps(session: &mut TripSession, until_ms: u64, step_ms: u64) {
    let mut now = session.now_ms();
    while now < until_ms {
        now = (now + step_ms).min(until_ms);
        session.advance_to(now);
    }
}

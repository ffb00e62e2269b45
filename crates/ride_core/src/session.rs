//! Trip session: the single owning handle of one trip view.
//!
//! A session owns its `World` (phase, progress, frame task, plan), the event
//! clock, the schedule, the observers and the SOS sink. Nothing is shared
//! between sessions. [`TripSession::cancel`] empties the clock and detaches
//! the observers in one call; dropping the session does the same.

use bevy_ecs::prelude::{Schedule, World};
use tracing::{debug, info};

use crate::clock::SimulationClock;
use crate::config::{AdvanceMode, EngineConfig};
use crate::driver::{assign_driver, default_roster, AssignedDriver, VehicleType};
use crate::ecs::{MotionState, PhaseState, TripPlan};
use crate::emergency::{EmergencyAlert, EmergencySink, LogEmergencySink, SosStatus};
use crate::endpoints::TripEndpoints;
use crate::error::EngineError;
use crate::geo::GeoPoint;
use crate::interpolation::RoutePaths;
use crate::phase::Phase;
use crate::pricing::{estimate_fare, FareEstimate};
use crate::routing::{route_or_straight_line, RouteProvider};
use crate::runner::{engine_schedule, run_until};
use crate::sequencer::{self, TripSignal};
use crate::telemetry::{PhaseLog, PhaseTransition, TripUpdate, UpdateOutbox};

/// Render/consumer surface. Called with every update, in order.
pub trait TripObserver {
    fn on_update(&mut self, update: &TripUpdate);
}

impl<F> TripObserver for F
where
    F: FnMut(&TripUpdate),
{
    fn on_update(&mut self, update: &TripUpdate) {
        self(update)
    }
}

pub struct TripSession {
    world: World,
    schedule: Schedule,
    config: EngineConfig,
    observers: Vec<Box<dyn TripObserver>>,
    emergency: Box<dyn EmergencySink>,
    sos_sent: bool,
    cancelled: bool,
}

impl TripSession {
    /// Open a trip with a driver from the default roster.
    pub fn open(endpoints: TripEndpoints, config: EngineConfig, routes: &dyn RouteProvider) -> Self {
        Self::open_with_roster(endpoints, config, routes, &default_roster())
    }

    /// Open a trip: fetch both route paths, pick the stand-in driver and arm
    /// the searching timer at time zero.
    pub fn open_with_roster(
        endpoints: TripEndpoints,
        config: EngineConfig,
        routes: &dyn RouteProvider,
        roster: &[AssignedDriver],
    ) -> Self {
        let approach_start = config.extrapolation.approach_start(&endpoints);
        let paths = RoutePaths {
            approach: route_or_straight_line(routes, approach_start, endpoints.origin),
            trip: route_or_straight_line(routes, endpoints.origin, endpoints.destination),
        };
        let driver = assign_driver(roster, config.driver_seed);
        let plan = TripPlan::new(endpoints, paths, &config, driver);

        let mut clock = SimulationClock::default();
        let mut state = PhaseState::new(Phase::Searching, 0);
        sequencer::begin(&mut clock, &mut state, &plan);
        let mut log = PhaseLog::default();
        log.record(Phase::Searching, 0);

        let mut world = World::new();
        world.insert_resource(clock);
        world.insert_resource(state);
        world.insert_resource(MotionState::new(Phase::Searching));
        world.insert_resource(plan);
        world.insert_resource(UpdateOutbox::default());
        world.insert_resource(log);

        info!(
            origin = ?endpoints.origin,
            destination = ?endpoints.destination,
            mode = ?config.advance_mode,
            "trip session opened"
        );

        Self {
            world,
            schedule: engine_schedule(),
            config,
            observers: Vec::new(),
            emergency: Box::new(LogEmergencySink),
            sos_sent: false,
            cancelled: false,
        }
    }

    /// Attach an observer. It immediately receives the current state, then
    /// every later update.
    pub fn subscribe(&mut self, mut observer: impl TripObserver + 'static) {
        if self.cancelled {
            return;
        }
        observer.on_update(&self.snapshot());
        self.observers.push(Box::new(observer));
    }

    pub fn set_emergency_sink(&mut self, sink: impl EmergencySink + 'static) {
        self.emergency = Box::new(sink);
    }

    /// Process everything due up to `now_ms` (session time) and deliver the
    /// resulting updates. Returns how many updates were delivered; a
    /// cancelled session always returns 0.
    pub fn advance_to(&mut self, now_ms: u64) -> usize {
        if self.cancelled {
            return 0;
        }
        if now_ms < self.now_ms() {
            debug!(now_ms, clock_ms = self.now_ms(), "ignoring request to rewind");
            return 0;
        }
        run_until(&mut self.world, &mut self.schedule, now_ms, usize::MAX);
        self.flush()
    }

    /// Deliver a dispatch message. Only accepted in external mode and only for
    /// the phase the signal ends.
    pub fn signal(&mut self, signal: TripSignal) -> Result<(), EngineError> {
        if self.cancelled {
            return Err(EngineError::Cancelled);
        }
        if self.config.advance_mode != AdvanceMode::External {
            return Err(EngineError::SignalsDisabled);
        }
        let phase = self.phase();
        if signal.ends() != phase {
            return Err(EngineError::UnexpectedSignal { signal, phase });
        }

        let now = {
            let mut clock = self.world.resource_mut::<SimulationClock>();
            clock.schedule_signal(signal);
            clock.now()
        };
        run_until(&mut self.world, &mut self.schedule, now, usize::MAX);
        self.flush();
        Ok(())
    }

    /// Raise an SOS through the installed sink. Fire-and-forget.
    pub fn trigger_sos(&mut self, location: Option<GeoPoint>) -> Result<SosStatus, EngineError> {
        if self.cancelled {
            return Err(EngineError::Cancelled);
        }
        if !self.phase().allows_sos() {
            return Ok(SosStatus::Unavailable);
        }
        if self.sos_sent {
            return Ok(SosStatus::AlreadySent);
        }
        self.sos_sent = true;
        let alert = EmergencyAlert {
            location,
            triggered_at_ms: self.now_ms(),
        };
        info!(phase = %self.phase(), at_ms = alert.triggered_at_ms, "SOS triggered");
        self.emergency.raise(alert);
        Ok(SosStatus::Sent)
    }

    /// Stop both timelines and detach every observer. Idempotent.
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.world.resource_scope(|world, mut clock: bevy_ecs::world::Mut<SimulationClock>| {
            world.resource_mut::<MotionState>().stop(&mut clock);
            world.resource_mut::<PhaseState>().timer = None;
            clock.clear();
        });
        self.world.resource_mut::<UpdateOutbox>().drain();
        self.observers.clear();
        info!(phase = %self.phase(), at_ms = self.now_ms(), "trip session cancelled");
    }

    /// Tear this trip down and open a new one for `endpoints` with the same
    /// configuration. Observers are not carried over.
    pub fn restart_with(mut self, endpoints: TripEndpoints, routes: &dyn RouteProvider) -> Self {
        self.cancel();
        let config = self.config.clone();
        TripSession::open(endpoints, config, routes)
    }

    fn flush(&mut self) -> usize {
        let updates = self.world.resource_mut::<UpdateOutbox>().drain();
        for update in &updates {
            for observer in &mut self.observers {
                observer.on_update(update);
            }
        }
        updates.len()
    }

    /// Current state as an update, computed on demand.
    pub fn snapshot(&self) -> TripUpdate {
        self.plan().update(self.now_ms(), self.phase(), self.progress())
    }

    fn plan(&self) -> &TripPlan {
        self.world.resource::<TripPlan>()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.world.resource::<SimulationClock>().now()
    }

    pub fn phase(&self) -> Phase {
        self.world.resource::<PhaseState>().phase
    }

    pub fn progress(&self) -> f64 {
        self.world.resource::<MotionState>().progress
    }

    pub fn position(&self) -> GeoPoint {
        self.plan().position(self.phase(), self.progress())
    }

    /// Minutes remaining; only while the trip is in progress.
    pub fn eta_minutes(&self) -> Option<u32> {
        self.snapshot().eta_minutes
    }

    pub fn endpoints(&self) -> TripEndpoints {
        self.plan().endpoints
    }

    pub fn route_paths(&self) -> &RoutePaths {
        &self.plan().paths
    }

    /// The stand-in driver, once the search is over.
    pub fn assigned_driver(&self) -> Option<&AssignedDriver> {
        if self.phase() == Phase::Searching {
            return None;
        }
        self.plan().driver.as_ref()
    }

    /// Booking-time fare estimate for this trip's endpoints and vehicle.
    pub fn fare_estimate(&self) -> FareEstimate {
        let plan = self.plan();
        let vehicle = plan
            .driver
            .as_ref()
            .map(|d| d.vehicle_type)
            .unwrap_or(VehicleType::Car);
        estimate_fare(plan.endpoints.origin, plan.endpoints.destination, vehicle)
    }

    pub fn phase_log(&self) -> &[PhaseTransition] {
        &self.world.resource::<PhaseLog>().transitions
    }

    /// Events still waiting on the clock (hold timer and/or animation frame).
    pub fn pending_events(&self) -> usize {
        self.world.resource::<SimulationClock>().pending_count()
    }

    pub fn is_animating(&self) -> bool {
        self.world.resource::<MotionState>().is_animating()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn is_completed(&self) -> bool {
        self.phase().is_terminal()
    }
}

impl Drop for TripSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::StraightLineRouteProvider;

    #[test]
    fn new_session_starts_searching_with_one_timer() {
        let session = TripSession::open(
            TripEndpoints::default(),
            EngineConfig::default(),
            &StraightLineRouteProvider,
        );
        assert_eq!(session.phase(), Phase::Searching);
        assert_eq!(session.now_ms(), 0);
        assert_eq!(session.pending_events(), 1);
        assert!(session.assigned_driver().is_none());
        assert!(session.eta_minutes().is_none());
    }

    #[test]
    fn driver_is_revealed_after_search() {
        let mut session = TripSession::open(
            TripEndpoints::default(),
            EngineConfig::default(),
            &StraightLineRouteProvider,
        );
        session.advance_to(3000);
        assert_eq!(session.phase(), Phase::DriverAssigned);
        let driver = session.assigned_driver().expect("driver");
        assert_eq!(driver.name, "Priya Sharma");
    }

    #[test]
    fn rewinding_is_ignored() {
        let mut session = TripSession::open(
            TripEndpoints::default(),
            EngineConfig::default(),
            &StraightLineRouteProvider,
        );
        session.advance_to(4000);
        assert_eq!(session.advance_to(1000), 0);
        assert_eq!(session.now_ms(), 4000);
        assert_eq!(session.phase(), Phase::DriverAssigned);
    }
}

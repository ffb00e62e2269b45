use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use ride_core::config::{AdvanceMode, EngineConfig};
use ride_core::driver::VehicleType;
use ride_core::emergency::SosStatus;
use ride_core::endpoints::TripEndpoints;
use ride_core::geo::GeoPoint;
use ride_core::phase::{Phase, TimelineStep};
use ride_core::pricing::estimate_fare;
use ride_core::routing::build_route_provider;
use ride_core::sequencer::TripSignal;
use ride_core::session::TripSession;
use ride_core::telemetry::TripUpdate;
use tracing::{info, warn};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ride",
    about = "Simulated ride progress for a single trip",
    long_about = "Plays back the lifecycle of one ride (searching, driver assigned,\n\
                  en route, arrived, trip started, completed) between a pickup and a\n\
                  dropoff, printing the driver position as it moves."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Pickup and dropoff, passed through as raw strings like a booking query.
#[derive(clap::Args)]
struct EndpointArgs {
    /// Pickup latitude
    #[arg(long, allow_hyphen_values = true)]
    plat: Option<String>,
    /// Pickup longitude
    #[arg(long, allow_hyphen_values = true)]
    plon: Option<String>,
    /// Dropoff latitude
    #[arg(long, allow_hyphen_values = true)]
    dlat: Option<String>,
    /// Dropoff longitude
    #[arg(long, allow_hyphen_values = true)]
    dlon: Option<String>,
}

impl EndpointArgs {
    fn endpoints(&self) -> TripEndpoints {
        TripEndpoints::from_query(
            self.plat.as_deref(),
            self.plon.as_deref(),
            self.dlat.as_deref(),
            self.dlon.as_deref(),
        )
    }
}

/// Dispatch messages for `advance_mode: external`, by session time.
#[derive(clap::Args)]
struct SignalArgs {
    /// Send `driver_found` at this session time (ms)
    #[arg(long)]
    driver_found_at_ms: Option<u64>,
    /// Send `driver_arrived` at this session time (ms)
    #[arg(long)]
    driver_arrived_at_ms: Option<u64>,
    /// Send `trip_ended` at this session time (ms)
    #[arg(long)]
    trip_ended_at_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one trip from booking to completion
    Run {
        #[command(flatten)]
        endpoints: EndpointArgs,
        #[command(flatten)]
        signals: SignalArgs,
        /// JSON engine config (durations, frame interval, advance mode, ...)
        #[arg(long, env = "RIDE_CONFIG")]
        config: Option<PathBuf>,
        /// Follow the wall clock so the trip plays back in real time
        #[arg(long)]
        realtime: bool,
        /// Print every update as a JSON line instead of a summary
        #[arg(long)]
        json: bool,
        /// Press SOS at this session time (ms)
        #[arg(long)]
        sos_at_ms: Option<u64>,
        /// Device latitude sent with the SOS alert
        #[arg(long, allow_hyphen_values = true, requires = "sos_lon")]
        sos_lat: Option<f64>,
        /// Device longitude sent with the SOS alert
        #[arg(long, allow_hyphen_values = true, requires = "sos_lat")]
        sos_lon: Option<f64>,
        /// Minimum spacing of printed position lines (ms)
        #[arg(long, default_value_t = 1000)]
        print_interval_ms: u64,
        /// Give up after this much session time (ms)
        #[arg(long, default_value_t = 120_000)]
        max_ms: u64,
    },
    /// Show the booking-time fare estimate
    Fare {
        #[command(flatten)]
        endpoints: EndpointArgs,
        /// Vehicle class
        #[arg(value_enum, long, default_value_t = Vehicle::Car)]
        vehicle: Vehicle,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Vehicle {
    Car,
    Bike,
}

impl From<Vehicle> for VehicleType {
    fn from(vehicle: Vehicle) -> Self {
        match vehicle {
            Vehicle::Car => VehicleType::Car,
            Vehicle::Bike => VehicleType::Bike,
        }
    }
}

// ── Signal plan ────────────────────────────────────────────────────

/// Signals waiting for their send time, in send-time order.
#[derive(Debug, Default)]
struct SignalPlan {
    pending: Vec<(u64, TripSignal)>,
}

impl SignalPlan {
    fn new(args: &SignalArgs) -> Self {
        let mut pending: Vec<(u64, TripSignal)> = [
            (args.driver_found_at_ms, TripSignal::DriverFound),
            (args.driver_arrived_at_ms, TripSignal::DriverArrived),
            (args.trip_ended_at_ms, TripSignal::TripEnded),
        ]
        .into_iter()
        .filter_map(|(at, signal)| at.map(|at| (at, signal)))
        .collect();
        pending.sort_by_key(|(at, _)| *at);
        Self { pending }
    }

    fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn has(&self, signal: TripSignal) -> bool {
        self.pending.iter().any(|(_, s)| *s == signal)
    }

    /// Take a signal that is due and ends `phase`. A due signal for a later
    /// phase stays queued until the trip gets there.
    fn take_ready(&mut self, now_ms: u64, phase: Phase) -> Option<TripSignal> {
        let idx = self
            .pending
            .iter()
            .position(|(at, signal)| *at <= now_ms && signal.ends() == phase)?;
        Some(self.pending.remove(idx).1)
    }
}

/// External mode needs every signal, timed mode takes none.
fn check_signal_plan(mode: AdvanceMode, plan: &SignalPlan) -> anyhow::Result<()> {
    match mode {
        AdvanceMode::External => {
            let missing: Vec<&str> = [
                (TripSignal::DriverFound, "--driver-found-at-ms"),
                (TripSignal::DriverArrived, "--driver-arrived-at-ms"),
                (TripSignal::TripEnded, "--trip-ended-at-ms"),
            ]
            .into_iter()
            .filter(|(signal, _)| !plan.has(*signal))
            .map(|(_, flag)| flag)
            .collect();
            if !missing.is_empty() {
                bail!(
                    "advance_mode is external but no time was given for {}",
                    missing.join(", ")
                );
            }
        }
        AdvanceMode::Timed => {
            if !plan.is_empty() {
                bail!("signal flags need \"advance_mode\": \"external\" in the config");
            }
        }
    }
    Ok(())
}

// ── Helpers ────────────────────────────────────────────────────────

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_json_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

/// Location for the SOS alert: only what the user supplied.
fn sos_location(lat: Option<f64>, lon: Option<f64>) -> Option<GeoPoint> {
    let point = GeoPoint::new(lat?, lon?);
    point.is_finite().then_some(point)
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// First multiple of `step_ms` strictly after `elapsed_ms`.
fn next_frame_boundary(elapsed_ms: u64, step_ms: u64) -> u64 {
    let step_ms = step_ms.max(1);
    (elapsed_ms / step_ms + 1).saturating_mul(step_ms)
}

fn timeline_line(current: Phase) -> String {
    Phase::timeline(current)
        .map(|(phase, step)| match step {
            TimelineStep::Done => format!("[x] {phase}"),
            TimelineStep::Active => format!("[>] {phase}"),
            TimelineStep::Pending => format!("[ ] {phase}"),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

/// Observer printing a human-readable log of the trip.
fn text_printer(print_interval_ms: u64) -> impl FnMut(&TripUpdate) + 'static {
    let mut last_phase: Option<Phase> = None;
    let mut last_printed_ms: Option<u64> = None;
    move |update: &TripUpdate| {
        if last_phase != Some(update.phase) {
            last_phase = Some(update.phase);
            last_printed_ms = Some(update.timestamp_ms);
            println!(
                "{:>7} ms  {}\n           {}",
                update.timestamp_ms,
                update.phase.label(),
                timeline_line(update.phase)
            );
            return;
        }
        let due = last_printed_ms
            .map_or(true, |t| update.timestamp_ms >= t.saturating_add(print_interval_ms));
        if !due {
            return;
        }
        last_printed_ms = Some(update.timestamp_ms);
        let eta = update
            .eta_minutes
            .map(|m| format!("  eta {m} min"))
            .unwrap_or_default();
        println!(
            "{:>7} ms  progress {:>6.3}  at ({:.5}, {:.5}){eta}",
            update.timestamp_ms, update.progress, update.position.lat, update.position.lng
        );
    }
}

fn json_printer() -> impl FnMut(&TripUpdate) + 'static {
    |update: &TripUpdate| match serde_json::to_string(update) {
        Ok(line) => println!("{line}"),
        Err(err) => warn!(error = %err, "failed to serialize update"),
    }
}

// ── Playback ───────────────────────────────────────────────────────

/// Drives one session until it completes or `max_ms` of session time passes.
struct Playback {
    step_ms: u64,
    max_ms: u64,
    realtime: bool,
    show_driver: bool,
    sos_at_ms: Option<u64>,
    sos_location: Option<GeoPoint>,
    signals: SignalPlan,
}

impl Playback {
    fn play(mut self, session: &mut TripSession) -> anyhow::Result<()> {
        let start = self.realtime.then(Instant::now);
        let mut driver_shown = false;
        let mut now = 0;

        while !session.is_completed() && now < self.max_ms {
            now = match start {
                // Session time is wall time since open.
                Some(start) => millis(start.elapsed()).clamp(now, self.max_ms),
                None => (now + self.step_ms).min(self.max_ms),
            };
            session.advance_to(now);

            while let Some(signal) = self.signals.take_ready(now, session.phase()) {
                session.signal(signal)?;
                info!(?signal, at_ms = now, "signal sent");
            }

            if self.show_driver && !driver_shown {
                if let Some(driver) = session.assigned_driver() {
                    driver_shown = true;
                    println!(
                        "           {} ({:.1}) - {} - {}",
                        driver.name, driver.rating, driver.vehicle, driver.plate
                    );
                }
            }

            self.press_sos_if_due(session, now)?;

            if let Some(start) = start {
                let elapsed = start.elapsed();
                let next = Duration::from_millis(next_frame_boundary(millis(elapsed), self.step_ms));
                thread::sleep(next.saturating_sub(elapsed));
            }
        }

        if !session.is_completed() {
            warn!(
                phase = %session.phase(),
                max_ms = self.max_ms,
                "trip did not complete in the allotted time"
            );
        }
        Ok(())
    }

    fn press_sos_if_due(&mut self, session: &mut TripSession, now: u64) -> anyhow::Result<()> {
        let Some(at) = self.sos_at_ms.filter(|at| now >= *at) else {
            return Ok(());
        };
        match session.trigger_sos(self.sos_location)? {
            SosStatus::Sent => {
                info!(at_ms = now, "SOS sent");
                self.sos_at_ms = None;
            }
            SosStatus::AlreadySent => self.sos_at_ms = None,
            SosStatus::Unavailable => {
                info!(requested_at_ms = at, phase = %session.phase(), "SOS not available yet");
            }
        }
        Ok(())
    }
}

// ── Commands ───────────────────────────────────────────────────────

fn cmd_run(
    endpoints: TripEndpoints,
    config: EngineConfig,
    json: bool,
    print_interval_ms: u64,
    playback: Playback,
) -> anyhow::Result<()> {
    check_signal_plan(config.advance_mode, &playback.signals)?;

    let routes = build_route_provider(&config.route_provider);
    let mut session = TripSession::open(endpoints, config, routes.as_ref());

    if json {
        session.subscribe(json_printer());
    } else {
        let fare = session.fare_estimate();
        println!(
            "Trip {:.4},{:.4} -> {:.4},{:.4}: {:.1} km, about {} min, fare Rs {:.0}",
            endpoints.origin.lat,
            endpoints.origin.lng,
            endpoints.destination.lat,
            endpoints.destination.lng,
            fare.distance_km,
            fare.eta_minutes,
            fare.fare
        );
        session.subscribe(text_printer(print_interval_ms));
    }

    playback.play(&mut session)?;
    info!(
        phase = %session.phase(),
        elapsed_ms = session.now_ms(),
        "simulation finished"
    );
    Ok(())
}

fn cmd_fare(endpoints: TripEndpoints, vehicle: Vehicle) {
    let estimate = estimate_fare(endpoints.origin, endpoints.destination, vehicle.into());
    println!("Distance: {:.2} km", estimate.distance_km);
    println!("ETA:      {} min", estimate.eta_minutes);
    println!("Fare:     Rs {:.0}", estimate.fare);
}

// ── Entry point ────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ride_cli=info,ride_core=info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            endpoints,
            signals,
            config,
            realtime,
            json,
            sos_at_ms,
            sos_lat,
            sos_lon,
            print_interval_ms,
            max_ms,
        } => {
            let config = load_config(config.as_ref())?;
            let playback = Playback {
                step_ms: config.frame_interval_ms,
                max_ms,
                realtime,
                show_driver: !json,
                sos_at_ms,
                sos_location: sos_location(sos_lat, sos_lon),
                signals: SignalPlan::new(&signals),
            };
            cmd_run(endpoints.endpoints(), config, json, print_interval_ms, playback)
        }
        Commands::Fare { endpoints, vehicle } => {
            cmd_fare(endpoints.endpoints(), vehicle);
            Ok(())
        }
    }
}

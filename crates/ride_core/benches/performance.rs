//! Performance benchmarks for ride_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ride_core::config::EngineConfig;
use ride_core::endpoints::TripEndpoints;
use ride_core::geo::{point_along_path, GeoPoint};
use ride_core::interpolation::{position, ExtrapolationParams, RoutePaths};
use ride_core::phase::Phase;
use ride_core::routing::StraightLineRouteProvider;
use ride_core::session::TripSession;

fn bench_full_trip(c: &mut Criterion) {
    let frame_intervals = vec![("60hz", 16), ("30hz", 33), ("10hz", 100)];

    let mut group = c.benchmark_group("full_trip");
    for (name, interval) in frame_intervals {
        group.bench_with_input(BenchmarkId::from_parameter(name), &interval, |b, &interval| {
            b.iter(|| {
                let config = EngineConfig::default().with_frame_interval_ms(interval);
                let mut session =
                    TripSession::open(TripEndpoints::default(), config, &StraightLineRouteProvider);
                black_box(session.advance_to(30_000));
            });
        });
    }
    group.finish();
}

fn bench_position(c: &mut Criterion) {
    let endpoints = TripEndpoints::default();
    let params = ExtrapolationParams::default();
    let straight = RoutePaths::straight(&endpoints, &params);

    let mut road = RoutePaths::straight(&endpoints, &params);
    road.trip = (0..=200)
        .map(|i| {
            let t = i as f64 / 200.0;
            GeoPoint::new(
                endpoints.origin.lat + (endpoints.destination.lat - endpoints.origin.lat) * t,
                endpoints.origin.lng + 0.01 * (t * std::f64::consts::PI).sin(),
            )
        })
        .collect();

    let mut group = c.benchmark_group("position");
    group.bench_function("straight", |b| {
        b.iter(|| {
            position(
                Phase::TripStarted,
                black_box(0.37),
                &endpoints,
                &params,
                Some(&straight),
            )
        });
    });
    group.bench_function("road_path_200", |b| {
        b.iter(|| point_along_path(&road.trip, black_box(0.37)));
    });
    group.finish();
}

criterion_group!(benches, bench_full_trip, bench_position);
criterion_main!(benches);

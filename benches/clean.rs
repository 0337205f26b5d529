//! Benchmarks for the cleaning pipeline over synthetic tracker data.
//!
//! Run with: `cargo bench --bench clean`

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use tripclean::synthetic::SyntheticScenario;
use tripclean::{clean, normalize, segment, CleanConfig};

fn bench_clean(c: &mut Criterion) {
    let config = CleanConfig::default();
    let mut group = c.benchmark_group("clean");

    for trip_count in [10, 100, 500] {
        let scenario = SyntheticScenario {
            trip_count,
            points_per_trip: 60,
            ..SyntheticScenario::default()
        };
        let batches = scenario.generate();

        group.bench_with_input(
            BenchmarkId::new("trips", trip_count),
            &batches,
            |b, batches| {
                b.iter(|| clean(batches, &config, None));
            },
        );
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let config = CleanConfig::default();
    let batches = SyntheticScenario {
        trip_count: 100,
        points_per_trip: 60,
        ..SyntheticScenario::default()
    }
    .generate();

    let mut group = c.benchmark_group("stages");

    group.bench_function("normalize", |b| {
        b.iter(|| normalize(&batches, &config));
    });

    let pings = normalize(&batches, &config).expect("synthetic batches normalize");
    group.bench_function("segment", |b| {
        b.iter(|| segment(pings.clone(), config.tracks_delta));
    });

    group.finish();
}

criterion_group!(benches, bench_clean, bench_stages);
criterion_main!(benches);

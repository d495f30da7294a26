//! Store scenario benchmarks using Criterion.
//!
//! These benchmarks measure a realistic per-frame workload:
//! - Arena (spatially indexed movement, cached velocities, projectile churn)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use strata_bench::scenarios::{ArenaConfig, ArenaScenario, Scenario};

// =============================================================================
// Arena Benchmarks
// =============================================================================

fn bench_arena(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario/arena");

    let configs = [
        (
            "small",
            ArenaConfig {
                npc_count: 1_000,
                projectile_count: 100,
                ..Default::default()
            },
        ),
        ("default", ArenaConfig::default()),
        (
            "dense",
            ArenaConfig {
                npc_count: 20_000,
                projectile_count: 2_000,
                cell_size: 10.0,
                ..Default::default()
            },
        ),
    ];

    for (name, config) in configs {
        let mut scenario = ArenaScenario::with_config(config);
        group.throughput(Throughput::Elements(scenario.entity_count() as u64));
        scenario.setup();

        group.bench_function(BenchmarkId::new("frame", name), |b| {
            b.iter(|| {
                scenario.update();
            });
        });

        scenario.teardown();
    }

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_arena);

criterion_main!(benches);

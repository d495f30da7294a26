//! Store microbenchmarks using Criterion.
//!
//! These benchmarks measure individual store operations in isolation:
//! - Write/read/destroy on each base store
//! - Cache hit patterns (hot working set vs. cold scans)
//! - Composite intersection over stores of very different sizes
//! - Strict vs. safe bulk traversal
//! - Spatial index upkeep

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use strata::{
    Entity, slice,
    entity::Registry,
    store::{CacheStore, Cell, Composite, MapStore, SetStore, SpatialIndexStore, Store},
};
use strata_bench::components::{Enemy, Position, Velocity};

fn entities(n: usize) -> Vec<Entity> {
    Registry::new().create_many(n)
}

fn positions(entities: &[Entity]) -> MapStore<Position> {
    let mut store = MapStore::new();
    for (i, &e) in entities.iter().enumerate() {
        store.write(
            e,
            Position {
                x: i as f32,
                y: 0.0,
            },
        );
    }
    store
}

// =============================================================================
// Base Store Benchmarks
// =============================================================================

fn bench_base_stores(c: &mut Criterion) {
    let mut group = c.benchmark_group("base");

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));
        let all = entities(count);

        group.bench_with_input(BenchmarkId::new("map_write", count), &all, |b, all| {
            b.iter(|| black_box(positions(all)));
        });

        group.bench_with_input(BenchmarkId::new("map_read", count), &all, |b, all| {
            let store = positions(all);
            b.iter(|| {
                for &e in all {
                    black_box(store.read(e));
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("set_write", count), &all, |b, all| {
            b.iter(|| {
                let mut store = SetStore::<Enemy>::new();
                for &e in all {
                    store.write(e, Enemy);
                }
                black_box(store)
            });
        });

        group.bench_with_input(BenchmarkId::new("map_destroy", count), &all, |b, all| {
            b.iter_batched(
                || positions(all),
                |mut store| {
                    for &e in all {
                        store.destroy(e);
                    }
                    store
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// Cache Benchmarks
// =============================================================================

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");
    let count = 100_000;
    let all = entities(count);
    let mut rng = ChaCha8Rng::seed_from_u64(12345);

    // 90% of accesses hit a hot set of 256 entities, the rest are spread over everyone.
    let hot: Vec<Entity> = all.choose_multiple(&mut rng, 256).copied().collect();
    let accesses: Vec<Entity> = (0..count)
        .map(|_| {
            if rng.gen_bool(0.9) {
                hot[rng.gen_range(0..hot.len())]
            } else {
                all[rng.gen_range(0..all.len())]
            }
        })
        .collect();
    group.throughput(Throughput::Elements(accesses.len() as u64));

    group.bench_function("uncached_hot_writes", |b| {
        let mut store = positions(&all);
        b.iter(|| {
            for &e in &accesses {
                store.write(e, Position::default());
            }
        });
    });

    group.bench_function("cached_hot_writes", |b| {
        let mut store = CacheStore::<_, 1024>::new(positions(&all));
        b.iter(|| {
            for &e in &accesses {
                store.write(e, Position::default());
            }
        });
    });

    group.bench_function("cached_hot_reads", |b| {
        let mut store = CacheStore::<_, 1024>::new(positions(&all));
        for &e in &hot {
            store.write(e, Position::default());
        }
        b.iter(|| {
            for &e in &accesses {
                black_box(store.read(e));
            }
        });
    });

    // A one-off scan over everyone must not evict the hot set.
    group.bench_function("cold_scan_after_hot_writes", |b| {
        let mut store = CacheStore::<_, 1024>::new(positions(&all));
        for &e in &hot {
            store.write(e, Position::default());
        }
        b.iter(|| {
            for &e in &all {
                black_box(store.read(e));
            }
        });
    });

    group.finish();
}

// =============================================================================
// Composite Benchmarks
// =============================================================================

fn bench_composite(c: &mut Criterion) {
    let mut group = c.benchmark_group("composite");

    for rare in [10, 1_000, 10_000] {
        let all = entities(100_000);
        let mut rng = ChaCha8Rng::seed_from_u64(54321);

        let common = positions(&all);
        let mut scarce = MapStore::new();
        for &e in all.choose_multiple(&mut rng, rare) {
            scarce.write(e, Velocity { x: 1.0, y: 0.0 });
        }
        let composite = Composite::new((common, scarce));
        group.throughput(Throughput::Elements(rare as u64));

        // Shortest-domain owners: cost follows the rare store.
        group.bench_with_input(BenchmarkId::new("owners", rare), &composite, |b, composite| {
            b.iter(|| black_box(composite.owners()));
        });

        group.bench_with_input(BenchmarkId::new("read", rare), &composite, |b, composite| {
            let owners = composite.owners();
            b.iter(|| {
                for &e in &owners {
                    black_box(composite.read(e));
                }
            });
        });
    }

    group.finish();
}

// =============================================================================
// Slice Traversal Benchmarks
// =============================================================================

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    for count in [1_000, 10_000, 100_000] {
        group.throughput(Throughput::Elements(count as u64));
        let all = entities(count);

        group.bench_with_input(BenchmarkId::new("map_strict", count), &all, |b, all| {
            let mut store = positions(all);
            let domain = slice::owners(&store);
            b.iter(|| {
                slice::map_strict(&domain, &mut store, |p| Position { x: p.x + 1.0, ..p });
            });
        });

        group.bench_with_input(BenchmarkId::new("map_safe", count), &all, |b, all| {
            let mut store = positions(all);
            let domain = slice::owners(&store);
            b.iter(|| {
                slice::map_safe(&domain, &mut store, |_, p| {
                    p.map(|p| Position { x: p.x + 1.0, ..p })
                });
            });
        });

        group.bench_with_input(BenchmarkId::new("composite_map", count), &all, |b, all| {
            let mut velocities = MapStore::new();
            for &e in all {
                velocities.write(e, Velocity { x: 1.0, y: 0.5 });
            }
            let mut movers = Composite::new((positions(all), velocities));
            let domain = slice::owners(&movers);
            b.iter(|| {
                slice::map_strict(&domain, &mut movers, |(p, v)| {
                    (
                        Position {
                            x: p.x + v.x,
                            y: p.y + v.y,
                        },
                        v,
                    )
                });
            });
        });
    }

    group.finish();
}

// =============================================================================
// Spatial Index Benchmarks
// =============================================================================

fn bench_spatial(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial");
    let count = 10_000;
    let all = entities(count);
    let mut rng = ChaCha8Rng::seed_from_u64(99999);
    let targets: Vec<Position> = (0..count)
        .map(|_| Position {
            x: rng.gen_range(-500.0..500.0),
            y: rng.gen_range(-500.0..500.0),
        })
        .collect();
    group.throughput(Throughput::Elements(count as u64));

    group.bench_function("write_moving", |b| {
        let mut store = SpatialIndexStore::with_cell_size(MapStore::new(), 25.0);
        b.iter(|| {
            for (&e, &p) in all.iter().zip(&targets) {
                store.write(e, p);
            }
            for (&e, &p) in all.iter().zip(targets.iter().rev()) {
                store.write(e, p);
            }
        });
    });

    group.bench_function("entities_around", |b| {
        let mut store = SpatialIndexStore::with_cell_size(MapStore::new(), 25.0);
        for (&e, &p) in all.iter().zip(&targets) {
            store.write(e, p);
        }
        b.iter(|| {
            for y in -20..20 {
                for x in -20..20 {
                    black_box(store.entities_around(Cell::new(x, y), 1));
                }
            }
        });
    });

    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(
    benches,
    bench_base_stores,
    bench_cache,
    bench_composite,
    bench_traversal,
    bench_spatial,
);

criterion_main!(benches);

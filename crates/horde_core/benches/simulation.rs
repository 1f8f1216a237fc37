//! Scene benchmarks for horde_core.
//!
//! Run with: `cargo bench -p horde_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use horde_test_utils::fixtures::{crowd_scene, sample_arena};

/// Tick cost of a crowd closing in on the player (O(n²) collision pass).
pub fn crowd_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("crowd_tick");
    for mobs in [16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(mobs), &mobs, |b, &mobs| {
            let scene = crowd_scene(mobs, 300.0, 1);
            b.iter_batched(
                || scene.clone(),
                |mut scene| {
                    for _ in 0..10 {
                        black_box(scene.on_tick(16));
                    }
                    scene
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

/// One minute of the sample arena with its spawner.
pub fn arena_benchmark(c: &mut Criterion) {
    c.bench_function("sample_arena_60s", |b| {
        b.iter(|| {
            let mut scene = sample_arena(black_box(7));
            for _ in 0..3750 {
                scene.on_tick(16);
            }
            black_box(scene.state_hash())
        });
    });
}

criterion_group!(benches, crowd_benchmark, arena_benchmark);
criterion_main!(benches);

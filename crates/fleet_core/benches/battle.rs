//! Battle benchmarks for fleet_core.
//!
//! Run with: `cargo bench -p fleet_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use fleet_core::combat::compute_damage;
use fleet_test_utils::fixtures::{quiet_skirmish, FRAME_MS};

/// Ticks the stock skirmish and resolves single attacks.
pub fn battle_benchmark(c: &mut Criterion) {
    c.bench_function("skirmish_600_frames", |b| {
        b.iter_batched(
            quiet_skirmish,
            |mut battle| {
                for _ in 0..600 {
                    battle.tick(black_box(FRAME_MS));
                }
                battle.state_hash()
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("skirmish_to_outcome", |b| {
        b.iter_batched(
            quiet_skirmish,
            |mut battle| {
                battle.set_time_scale(10);
                while !battle.is_over() && battle.tick_count() < 20_000 {
                    battle.tick(FRAME_MS);
                }
                battle.outcome()
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("compute_damage", |b| {
        b.iter(|| compute_damage(black_box(308), black_box(0.75), black_box(80), black_box(2.1)));
    });
}

criterion_group!(benches, battle_benchmark);
criterion_main!(benches);

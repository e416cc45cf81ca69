//! Criterion benchmarks for the reduction and selection steps.
//! Sizes are raw sample counts drawn by `synth::draw_samples` (default geometry).
//! Results: by default under target/criterion.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use groi::prelude::*;
use groi::{aggregate, reduce, select_index};

fn samples(core: usize, seed: u64) -> Vec<Coordinate> {
    let cfg = SynthCfg {
        core,
        outliers: core / 20,
        ..SynthCfg::default()
    };
    draw_samples(cfg, seed)
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    group.sample_size(10);
    for &n in &[250usize, 1000, 4000] {
        group.bench_with_input(BenchmarkId::new("aggregate", n), &n, |b, &n| {
            let pts = samples(n, 41);
            b.iter(|| aggregate(&pts, 0, 8.0, 2))
        });

        group.bench_with_input(BenchmarkId::new("reduce", n), &n, |b, &n| {
            b.iter_batched(
                || aggregate(&samples(n, 42), 0, 8.0, 2),
                |locs| {
                    let _seq = reduce(&locs);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("select", n), &n, |b, &n| {
            let seq = reduce_and_sequence_with(&samples(n, 43), ReductionCfg::default());
            b.iter(|| select_index(&seq, 0.27))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce);
criterion_main!(benches);

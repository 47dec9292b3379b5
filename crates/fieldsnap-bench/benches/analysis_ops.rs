//! Criterion benchmarks for decomposition and figure building.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fieldsnap_analysis::{analyze, analyze_exchange, decompose_collector, AnalysisConfig};
use fieldsnap_bench::{reference_profile, short_profile};

/// Benchmark: SVD of a 200 × 256 snapshot matrix.
fn bench_decompose_short(c: &mut Criterion) {
    let (_acc, collector) = short_profile();
    let config = AnalysisConfig::default();
    c.bench_function("decompose_200x256", |b| {
        b.iter(|| black_box(decompose_collector(&collector, &config).unwrap()));
    });
}

/// Benchmark: the full analysis of the 2001-step reference run.
fn bench_analyze_reference(c: &mut Criterion) {
    let (_acc, collector) = reference_profile();
    let config = AnalysisConfig::default();
    let mut group = c.benchmark_group("reference_analysis");
    group.sample_size(10);
    group.bench_function("analyze_2001x256", |b| {
        b.iter(|| black_box(analyze(&collector, &config).unwrap()));
    });
    group.finish();
}

/// Benchmark: zero-copy export plus the row-0 arithmetic check.
fn bench_exchange(c: &mut Criterion) {
    let (_acc, collector) = reference_profile();
    c.bench_function("analyze_exchange_reference", |b| {
        b.iter(|| black_box(analyze_exchange(&collector).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_decompose_short,
    bench_analyze_reference,
    bench_exchange
);
criterion_main!(benches);

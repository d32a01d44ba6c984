//! Serial vs pooled parallel higher-order operations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parfn::prelude::*;

// a transform heavy enough that fan-out can pay for itself
fn busy_square(x: i64) -> i64 {
    let mut acc = x;
    for _ in 0..512 {
        acc = black_box(acc.wrapping_mul(acc) ^ x);
    }
    acc
}

fn bench_map(c: &mut Criterion) {
    let pool = WorkerPool::new(Config::default()).unwrap();
    let mut group = c.benchmark_group("map");

    for size in [1_000i64, 100_000] {
        group.bench_with_input(BenchmarkId::new("serial", size), &size, |b, &n| {
            b.iter(|| map(0..n, busy_square));
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |b, &n| {
            b.iter(|| map_parallel_with(&pool, 0..n, busy_square).unwrap());
        });
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let pool = WorkerPool::new(Config::default()).unwrap();
    let mut group = c.benchmark_group("reduce");

    for size in [1_000i64, 100_000] {
        group.bench_with_input(BenchmarkId::new("serial", size), &size, |b, &n| {
            b.iter(|| reduce(0..n, |a, b| black_box(a + b)));
        });
        group.bench_with_input(BenchmarkId::new("parallel", size), &size, |b, &n| {
            b.iter(|| reduce_parallel_with(&pool, 0..n, |a, b| black_box(a + b)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_map, bench_reduce);
criterion_main!(benches);

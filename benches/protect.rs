use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use restack::{protect, Recursive};

/// The hot path: a protected call that never switches. This is what every
/// non-deep call site pays, so it is the number that matters.
fn bench_no_switch(c: &mut Criterion) {
    let mut group = c.benchmark_group("no_switch");
    group.bench_function("protect_trivial", |b| {
        b.iter(|| protect(|| black_box(21) * 2));
    });
    group.bench_function("bare_call_baseline", |b| {
        b.iter(|| black_box(21) * 2);
    });
    group.finish();
}

/// Recursion deep enough to force stack switches, amortizing segment
/// allocation over the frames that run on each segment.
fn bench_switching_recursion(c: &mut Criterion) {
    fn depth(n: u64) -> u64 {
        protect(|| if n == 0 { 0 } else { 1 + depth(n - 1) })
    }

    let mut group = c.benchmark_group("switching");
    group.sample_size(10);
    group.bench_function("depth_200k", |b| {
        b.iter(|| depth(black_box(200_000)));
    });
    group.finish();
}

/// Protected bulk operations over a wrapped structure of moderate depth.
fn bench_wrapper_ops(c: &mut Criterion) {
    enum List {
        Cons(Recursive<Box<List>>),
        Nil,
    }

    impl Clone for List {
        fn clone(&self) -> List {
            match self {
                List::Cons(rest) => List::Cons(rest.clone()),
                List::Nil => List::Nil,
            }
        }
    }

    let mut list = List::Nil;
    for _ in 0..10_000 {
        list = List::Cons(Recursive::new(Box::new(list)));
    }

    let mut group = c.benchmark_group("wrapper");
    group.sample_size(20);
    group.bench_function("clone_10k", |b| {
        b.iter(|| black_box(&list).clone());
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_no_switch,
    bench_switching_recursion,
    bench_wrapper_ops
);
criterion_main!(benches);

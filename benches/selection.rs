//! Benchmarks for scheduler selection in both sorting modes

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sjf_emu::prelude::*;
use sjf_emu::process::{ProcessFactory, ProcessIdAllocator, RandomBurstTimeGenerator};
use std::sync::Arc;

fn filled_queue(len: usize) -> ReadyQueue {
    let mut factory = ProcessFactory::new(
        Arc::new(ProcessIdAllocator::new()),
        Box::new(RandomBurstTimeGenerator::seeded(17)),
        ProcessConfig::default(),
    )
    .unwrap();

    let mut queue = ReadyQueue::new();
    for _ in 0..len {
        queue.add(factory.generate_item());
    }
    queue
}

fn bench_burst_time_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_burst_time");

    for len in [10usize, 100, 1_000] {
        group.bench_function(format!("{len}"), |b| {
            b.iter_batched(
                || filled_queue(len),
                |mut queue| {
                    let mut scheduler = Scheduler::new(u64::MAX);
                    black_box(scheduler.select_process(&mut queue))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_age_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("select_age");

    for len in [10usize, 100, 1_000] {
        group.bench_function(format!("{len}"), |b| {
            b.iter_batched(
                || filled_queue(len),
                |mut queue| {
                    let mut scheduler = Scheduler::new(0);
                    black_box(scheduler.select_process(&mut queue))
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_drain(c: &mut Criterion) {
    c.bench_function("drain_100_threshold_5", |b| {
        b.iter_batched(
            || filled_queue(100),
            |mut queue| {
                let mut scheduler = Scheduler::new(5);
                while let Some(item) = scheduler.select_process(&mut queue) {
                    black_box(item);
                }
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_burst_time_selection,
    bench_age_selection,
    bench_drain
);
criterion_main!(benches);

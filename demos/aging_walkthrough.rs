//! Step-by-step selection on a hand-built queue, showing when aging kicks in

use sjf_emu::executor::{Cpu, Dispatcher, PanicHandler};
use sjf_emu::prelude::*;
use sjf_emu::process::{ProcessFactory, ProcessIdAllocator, RandomBurstTimeGenerator};
use std::sync::Arc;
use std::time::Duration;

fn print_queue(ready: &ReadyQueue) {
    for item in ready {
        println!(
            "    {:<5} age={:<2} avg_bt={:.2} bt_sum={:.2}",
            item.process().id(),
            item.age(),
            item.process().avg_bt(),
            item.process().bt_sum()
        );
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::WARN).init();

    println!("=== Aging Walkthrough ===\n");

    let short = ProcessConfig::new(ThreadCount::UpTo(4)).max_long_thread_chance(0);
    let long = ProcessConfig::new(ThreadCount::Fixed(2))
        .max_long_thread_chance(1)
        .long_thread_bt_multiplier(10);

    let mut factory = ProcessFactory::new(
        Arc::new(ProcessIdAllocator::new()),
        Box::new(RandomBurstTimeGenerator::seeded(5)),
        short,
    )?;

    let mut ready = ReadyQueue::new();
    for _ in 0..6 {
        ready.add(factory.generate_item());
    }
    ready.add(factory.generate_item_with(&long)?);

    let workload = Arc::new(SleepWorkload::new(Duration::from_millis(5)));
    let dispatcher = Dispatcher::new(Cpu::new(workload, Arc::new(PanicHandler::default())));
    let mut scheduler = Scheduler::new(3);
    let mut completed = CompletedQueue::new();

    println!("age_threshold = {}\n", scheduler.age_threshold());
    let mut step = 1;
    while !ready.is_empty() {
        println!("  step {step}, queue before selection:");
        print_queue(&ready);

        if let Some(id) = dispatcher.dispatch(&mut scheduler, &mut ready, &mut completed) {
            println!("  -> dispatched {id} ({} mode)\n", scheduler.sorting_style());
        }
        step += 1;
    }

    let summary = completed.summary();
    println!(
        "Completed {} processes, mean ttc {:.1}ms, mean waiting {:.1}ms",
        summary.count,
        summary.mean_ttc_secs * 1_000.0,
        summary.mean_waiting_secs * 1_000.0
    );

    Ok(())
}

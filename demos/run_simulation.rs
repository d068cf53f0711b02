//! Runs the generator and dispatcher loops for a few seconds and reports
//!
//! `RUST_LOG=sjf_emu=debug cargo run --example run_simulation` shows every
//! selection and dispatch.

use sjf_emu::prelude::*;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    println!("=== SJF Emulation ===\n");

    let config = SimulationConfig::builder()
        .age_threshold(6)
        .time_scale(Duration::from_millis(50))
        .process(
            ProcessConfig::new(ThreadCount::UpTo(5))
                .max_long_thread_chance(5)
                .long_thread_bt_multiplier(10),
        )
        .build()?;

    let sim = Simulation::new(config)?;
    sim.setup(Setup::new().start_processes(10).keep_ready(8))?;
    sim.start();

    for _ in 0..10 {
        thread::sleep(Duration::from_millis(500));
        let s = sim.snapshot();
        println!(
            "ready={:>2} running={:<5} completed={:>3} mode={}",
            s.ready,
            s.running.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            s.completed,
            s.sorting_style
        );
    }

    sim.pause();
    println!("\nPaused, next in line:");
    sim.with_ready_queue(|ready| {
        for item in ready.first_n(5) {
            println!(
                "  {:<5} age={:<2} avg_bt={:.2} bt_sum={:.2}",
                item.process().id(),
                item.age(),
                item.process().avg_bt(),
                item.process().bt_sum()
            );
        }
    });

    sim.shutdown();

    println!("\nLast completed:");
    sim.with_completed_queue(|done| {
        for item in done.last_n(5) {
            let p = item.process();
            println!(
                "  {:<5} subtasks={} avg_bt={:.2} ttc={:?}{}",
                p.id(),
                p.subtasks().len(),
                p.avg_bt(),
                p.ttc().unwrap_or_default(),
                if p.elongated_subtask().is_some() { " (elongated)" } else { "" }
            );
        }
    });

    println!();
    let report = sim.report();
    ConsoleExporter::new(true).export(&report)?;

    #[cfg(feature = "telemetry")]
    {
        let path = std::env::temp_dir().join("sjf_report.json");
        JsonExporter::new(&path).export(&report)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

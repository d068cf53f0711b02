//! SJF-EMU - Shortest Job First emulation with aging
//!
//! Synthetic multi-threaded processes are generated into a ready queue, picked
//! by a non-preemptive shortest-job-first scheduler with an aging escape valve,
//! and executed on an emulated CPU that runs every subtask of a process on its
//! own thread before joining them.
//!
//! # Quick Start
//!
//! ```no_run
//! use sjf_emu::prelude::*;
//! use std::time::Duration;
//!
//! let config = SimulationConfig::builder()
//!     .age_threshold(5)
//!     .time_scale(Duration::from_millis(20))
//!     .build()
//!     .unwrap();
//!
//! let sim = Simulation::new(config).unwrap();
//! sim.setup(Setup::new().start_processes(10).keep_ready(10)).unwrap();
//! sim.start();
//!
//! std::thread::sleep(Duration::from_secs(3));
//! sim.shutdown();
//!
//! sim.with_completed_queue(|done| {
//!     for item in done.last_n(5) {
//!         println!("{} avg_bt={:.2}", item.process().id(), item.process().avg_bt());
//!     }
//! });
//! ```
//!
//! # Features
//!
//! - **SJF with aging**: shortest mean burst time first, oldest and heaviest
//!   first once anything has waited `age_threshold` dispatch cycles
//! - **Parallel subtasks**: one thread per subtask with a join barrier
//! - **Lock-step loops**: generator and dispatcher alternate through a pair
//!   of binary semaphores, never polling
//! - **Fault isolation**: failing or panicking subtasks mark their process
//!   faulted without stopping the run
//! - **Telemetry**: counters, a time-to-complete histogram and JSON reports
//!   (feature `telemetry`)

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod process;
pub mod queue;
pub mod scheduler;
pub mod simulation;
pub mod sync;
pub mod telemetry;

pub use config::{BurstRange, ConfigBuilder, ProcessConfig, SimulationConfig, ThreadCount};
pub use error::{Error, Result};
pub use simulation::{Setup, Simulation, SimulationSnapshot};

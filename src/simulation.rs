//! The running emulation: a generator loop and a dispatcher loop taking
//! strict turns on a shared ready queue.
//!
//! ```no_run
//! use sjf_emu::prelude::*;
//! use std::time::Duration;
//!
//! let config = SimulationConfig::builder()
//!     .time_scale(Duration::from_millis(10))
//!     .build()?;
//! let sim = Simulation::new(config)?;
//!
//! sim.setup(Setup::new().start_processes(5).keep_ready(10))?;
//! sim.start();
//! std::thread::sleep(Duration::from_secs(2));
//! sim.shutdown();
//!
//! println!("{} processes completed", sim.snapshot().completed);
//! # Ok::<(), sjf_emu::Error>(())
//! ```

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::executor::{Cpu, Dispatcher, PanicHandler, PanicSite, SleepWorkload, Workload};
use crate::process::{
    BurstTimeSource, ProcessFactory, ProcessId, ProcessIdAllocator, RandomBurstTimeGenerator,
};
use crate::queue::{CompletedQueue, QueueItem, ReadyQueue};
use crate::scheduler::{Scheduler, SortingStyle};
use crate::sync::{Lifecycle, Rendezvous, RunState, Side};
use crate::telemetry::{Metrics, SimulationReport};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// Callback invoked once per loop iteration.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Per-run options handed to [`Simulation::setup`].
#[derive(Clone)]
pub struct Setup {
    start_processes: usize,
    keep_ready: usize,
    on_dispatch: Option<Hook>,
    on_generate: Option<Hook>,
}

impl Setup {
    pub fn new() -> Self {
        Self {
            start_processes: 0,
            keep_ready: 10,
            on_dispatch: None,
            on_generate: None,
        }
    }

    /// Processes placed in the ready queue before the loops start.
    pub fn start_processes(mut self, n: usize) -> Self {
        self.start_processes = n;
        self
    }

    /// The generator tops the ready queue up to this many items each turn.
    pub fn keep_ready(mut self, n: usize) -> Self {
        self.keep_ready = n;
        self
    }

    pub fn on_dispatch<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_dispatch = Some(Arc::new(hook));
        self
    }

    pub fn on_generate<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_generate = Some(Arc::new(hook));
        self
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Setup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Setup")
            .field("start_processes", &self.start_processes)
            .field("keep_ready", &self.keep_ready)
            .field("on_dispatch", &self.on_dispatch.is_some())
            .field("on_generate", &self.on_generate.is_some())
            .finish()
    }
}

/// Consistent counts taken under every queue lock at once.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SimulationSnapshot {
    pub state: RunState,
    pub ready: usize,
    /// Selected by the scheduler but not yet in the completed queue.
    pub running: Option<ProcessId>,
    pub completed: usize,
    pub generated: u64,
    pub age_threshold: u64,
    pub sorting_style: SortingStyle,
}

impl SimulationSnapshot {
    /// Items currently held somewhere in the system.
    pub fn accounted(&self) -> u64 {
        (self.ready + usize::from(self.running.is_some()) + self.completed) as u64
    }
}

// Lock order: ready, scheduler, in_flight, completed. The factory is only
// ever locked while holding ready.
struct Shared {
    ready: Mutex<ReadyQueue>,
    scheduler: Mutex<Scheduler>,
    in_flight: Mutex<Option<ProcessId>>,
    completed: Mutex<CompletedQueue>,
    factory: Mutex<ProcessFactory>,
    ids: Arc<ProcessIdAllocator>,
    dispatcher: Dispatcher,
    lifecycle: Lifecycle,
    metrics: Arc<Metrics>,
}

impl Shared {
    fn refill(&self, keep_ready: usize) -> usize {
        let mut ready = self.ready.lock();
        let missing = keep_ready.saturating_sub(ready.len());
        if missing == 0 {
            return 0;
        }

        let mut factory = self.factory.lock();
        for _ in 0..missing {
            ready.add(factory.generate_item());
        }
        self.metrics.record_generated(missing as u64);
        missing
    }

    fn select(&self) -> Option<QueueItem> {
        let mut ready = self.ready.lock();
        let mut scheduler = self.scheduler.lock();
        let item = self.dispatcher.select(&mut scheduler, &mut ready)?;
        *self.in_flight.lock() = Some(item.process().id());
        Some(item)
    }

    fn complete(&self, item: QueueItem) -> ProcessId {
        let mut in_flight = self.in_flight.lock();
        let mut completed = self.completed.lock();
        let id = self.dispatcher.complete(&mut completed, item);
        *in_flight = None;
        id
    }

    /// Run one dispatch without holding any queue lock while the process runs.
    fn dispatch_one(&self) -> Option<ProcessId> {
        let item = self.select()?;
        let item = self.dispatcher.execute(item);
        Some(self.complete(item))
    }

    fn call_hook(&self, hook: &Hook, name: &'static str) {
        let handler = self.dispatcher.cpu().panic_handler();
        if let Err(caught) = handler.execute(PanicSite::Hook(name), || hook()) {
            tracing::warn!(hook = name, reason = %caught.message, "hook panicked");
        }
    }

    fn snapshot(&self) -> SimulationSnapshot {
        let ready = self.ready.lock();
        let scheduler = self.scheduler.lock();
        let in_flight = self.in_flight.lock();
        let completed = self.completed.lock();

        SimulationSnapshot {
            state: self.lifecycle.state(),
            ready: ready.len(),
            running: *in_flight,
            completed: completed.len(),
            generated: self.ids.issued(),
            age_threshold: scheduler.age_threshold(),
            sorting_style: scheduler.sorting_style(),
        }
    }
}

/// SJF emulation with a generator loop and a dispatcher loop.
///
/// Lifecycle: [`setup`](Self::setup) prepares fresh queues,
/// [`start`](Self::start) spawns both loops, [`pause`](Self::pause) and
/// [`resume`](Self::resume) toggle work, and [`stop`](Self::stop) plus
/// [`join`](Self::join) wind the run down. Dropping the simulation shuts it
/// down.
pub struct Simulation {
    config: SimulationConfig,
    shared: Arc<Shared>,
    prepared: Mutex<Option<Setup>>,
    loops: Mutex<Vec<JoinHandle<()>>>,
}

impl Simulation {
    /// Random burst times and sleeping subtasks, both scaled by `config`.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let source = RandomBurstTimeGenerator::new(config.burst_range, config.seed)?;
        let workload = SleepWorkload::new(config.time_scale);
        Self::from_parts(config, Box::new(source), Arc::new(workload))
    }

    /// Build with an explicit burst-time source and subtask workload.
    pub fn from_parts(
        config: SimulationConfig,
        source: Box<dyn BurstTimeSource>,
        workload: Arc<dyn Workload>,
    ) -> Result<Self> {
        config.validate()?;

        let ids = Arc::new(ProcessIdAllocator::new());
        let factory = ProcessFactory::new(ids.clone(), source, config.process)?;
        let metrics = Arc::new(Metrics::new());

        let panic_handler = Arc::new(PanicHandler::new(config.panic_strategy));
        let cpu = Cpu::new(workload, panic_handler)
            .with_thread_name_prefix(config.thread_name_prefix.clone());
        let dispatcher = Dispatcher::new(cpu).with_metrics(metrics.clone());

        let epoch = Instant::now();
        let shared = Shared {
            ready: Mutex::new(ReadyQueue::with_epoch(epoch)),
            scheduler: Mutex::new(Scheduler::new(config.age_threshold)),
            in_flight: Mutex::new(None),
            completed: Mutex::new(CompletedQueue::with_epoch(epoch)),
            factory: Mutex::new(factory),
            ids,
            dispatcher,
            lifecycle: Lifecycle::new(),
            metrics,
        };

        Ok(Self {
            config,
            shared: Arc::new(shared),
            prepared: Mutex::new(None),
            loops: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Prepare a run: fresh queues, ids from 1, and `start_processes` items
    /// already waiting.
    pub fn setup(&self, setup: Setup) -> Result<()> {
        let loops = self.loops.lock();
        if !loops.is_empty() || self.shared.lifecycle.state() != RunState::Idle {
            return Err(Error::AlreadyStarted);
        }

        let epoch = Instant::now();
        {
            let mut ready = self.shared.ready.lock();
            let mut scheduler = self.shared.scheduler.lock();
            let mut in_flight = self.shared.in_flight.lock();
            let mut completed = self.shared.completed.lock();

            self.shared.ids.reset();
            self.shared.metrics.reset();

            let threshold = scheduler.age_threshold();
            *ready = ReadyQueue::with_epoch(epoch);
            *scheduler = Scheduler::new(threshold);
            *in_flight = None;
            *completed = CompletedQueue::with_epoch(epoch);

            let mut factory = self.shared.factory.lock();
            for _ in 0..setup.start_processes {
                ready.add(factory.generate_item());
            }
            self.shared
                .metrics
                .record_generated(setup.start_processes as u64);
        }

        tracing::info!(
            start_processes = setup.start_processes,
            keep_ready = setup.keep_ready,
            "simulation set up"
        );
        *self.prepared.lock() = Some(setup);
        Ok(())
    }

    /// Spawn both loops.
    ///
    /// Returns `false` without doing anything when the simulation has not
    /// been set up or is already running.
    pub fn start(&self) -> bool {
        match self.try_start() {
            Ok(()) => true,
            Err(Error::NotSetUp) | Err(Error::AlreadyStarted) => false,
            Err(e) => {
                tracing::error!(error = %e, "simulation failed to start");
                false
            }
        }
    }

    /// Like [`start`](Self::start), but reports why nothing happened.
    pub fn try_start(&self) -> Result<()> {
        let mut loops = self.loops.lock();
        if !loops.is_empty() {
            return Err(Error::AlreadyStarted);
        }

        let mut prepared = self.prepared.lock();
        let setup = prepared.clone().ok_or(Error::NotSetUp)?;

        if !self.shared.lifecycle.start() {
            return Err(Error::AlreadyStarted);
        }

        // Arrival and completion offsets count from the start of the run.
        {
            let epoch = Instant::now();
            let mut ready = self.shared.ready.lock();
            let mut completed = self.shared.completed.lock();
            ready.rebase(epoch);
            completed.rebase(epoch);
        }

        let rendezvous = Arc::new(Rendezvous::new());
        let prefix = &self.config.thread_name_prefix;

        let generator = {
            let shared = self.shared.clone();
            let rendezvous = rendezvous.clone();
            let setup = setup.clone();
            thread::Builder::new()
                .name(format!("{}-generator", prefix))
                .spawn(move || generator_loop(&shared, &rendezvous, &setup))
        };
        match generator {
            Ok(handle) => loops.push(handle),
            Err(e) => {
                self.shared.lifecycle.stop();
                self.shared.lifecycle.reset();
                return Err(Error::spawn(format!("generator loop: {}", e)));
            }
        }

        let dispatcher = {
            let shared = self.shared.clone();
            let rendezvous = rendezvous.clone();
            thread::Builder::new()
                .name(format!("{}-dispatcher", prefix))
                .spawn(move || dispatcher_loop(&shared, &rendezvous, &setup))
        };
        match dispatcher {
            Ok(handle) => loops.push(handle),
            Err(e) => {
                // Take the missing dispatcher's turn once so the generator
                // reaches its stop check.
                self.shared.lifecycle.stop();
                drop(rendezvous.enter(Side::Dispatcher));
                for handle in loops.drain(..) {
                    let _ = handle.join();
                }
                self.shared.lifecycle.reset();
                return Err(Error::spawn(format!("dispatcher loop: {}", e)));
            }
        }

        *prepared = None;
        tracing::info!("simulation started");
        Ok(())
    }

    pub fn pause(&self) -> bool {
        let paused = self.shared.lifecycle.pause();
        if paused {
            tracing::info!("simulation paused");
        }
        paused
    }

    pub fn resume(&self) -> bool {
        let resumed = self.shared.lifecycle.resume();
        if resumed {
            tracing::info!("simulation resumed");
        }
        resumed
    }

    /// Ask both loops to exit at their next turn. Does not wait for them;
    /// a process already on the CPU runs to completion first.
    pub fn stop(&self) -> bool {
        let stopped = self.shared.lifecycle.stop();
        if stopped {
            tracing::info!("simulation stopping");
        }
        stopped
    }

    /// Wait for both loops to exit. Blocks until someone calls
    /// [`stop`](Self::stop) if the simulation is still running.
    ///
    /// Called from one of the loops (a hook, or dropping the last handle
    /// there) it returns at once: the loops are left to exit on their own and
    /// a later `join` from another thread reaps them.
    pub fn join(&self) {
        let handles: Vec<_> = {
            let mut loops = self.loops.lock();
            let current = thread::current().id();
            if loops.iter().any(|handle| handle.thread().id() == current) {
                tracing::warn!("join called from a simulation loop, not waiting");
                return;
            }
            loops.drain(..).collect()
        };
        if handles.is_empty() {
            return;
        }

        for handle in handles {
            let name = handle.thread().name().unwrap_or("loop").to_string();
            if handle.join().is_err() {
                tracing::error!(thread = %name, "simulation loop panicked");
            }
        }

        self.shared.lifecycle.reset();
        tracing::info!("simulation stopped");
    }

    /// [`stop`](Self::stop) followed by [`join`](Self::join).
    pub fn shutdown(&self) {
        self.stop();
        self.join();
    }

    pub fn state(&self) -> RunState {
        self.shared.lifecycle.state()
    }

    pub fn is_running(&self) -> bool {
        self.shared.lifecycle.is_running()
    }

    pub fn age_threshold(&self) -> u64 {
        self.shared.scheduler.lock().age_threshold()
    }

    /// Takes effect from the next selection.
    pub fn set_age_threshold(&self, threshold: u64) {
        self.shared.scheduler.lock().set_age_threshold(threshold);
        tracing::info!(age_threshold = threshold, "age threshold changed");
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.shared.metrics
    }

    /// Read the ready queue under its lock.
    pub fn with_ready_queue<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ReadyQueue) -> R,
    {
        f(&self.shared.ready.lock())
    }

    /// Read the completed queue under its lock.
    pub fn with_completed_queue<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CompletedQueue) -> R,
    {
        f(&self.shared.completed.lock())
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        self.shared.snapshot()
    }

    pub fn report(&self) -> SimulationReport {
        let snapshot = self.snapshot();
        let summary = self.with_completed_queue(CompletedQueue::summary);
        SimulationReport::new(
            &self.shared.metrics.snapshot(),
            summary,
            snapshot.ready,
            snapshot.running.is_some(),
            snapshot.sorting_style,
        )
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("loops", &self.loops.lock().len())
            .finish()
    }
}

fn generator_loop(shared: &Shared, rendezvous: &Rendezvous, setup: &Setup) {
    loop {
        let _turn = rendezvous.enter(Side::Generator);
        if shared.lifecycle.wait_while_paused() != RunState::Running {
            break;
        }

        let added = shared.refill(setup.keep_ready);
        if added > 0 {
            tracing::debug!(added, "topped up ready queue");
        }

        if let Some(hook) = &setup.on_generate {
            shared.call_hook(hook, "on_generate");
        }
    }
    tracing::debug!("generator loop exited");
}

fn dispatcher_loop(shared: &Shared, rendezvous: &Rendezvous, setup: &Setup) {
    loop {
        let _turn = rendezvous.enter(Side::Dispatcher);
        if shared.lifecycle.wait_while_paused() != RunState::Running {
            break;
        }

        let dispatched = shared.dispatch_one();
        if let Some(id) = dispatched {
            tracing::debug!(process = %id, "dispatched");
        }

        if let Some(hook) = &setup.on_dispatch {
            shared.call_hook(hook, "on_dispatch");
        }

        // Nothing left and nothing coming: park until the run is stopped.
        if dispatched.is_none() && setup.keep_ready == 0 {
            tracing::info!("ready queue drained");
            shared
                .lifecycle
                .wait_until(|state| state == RunState::Stopped);
            break;
        }
    }
    tracing::debug!("dispatcher loop exited");
}

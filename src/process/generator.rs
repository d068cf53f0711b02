//! Synthetic burst times, process ids and process construction.

use super::pcb::{Process, ProcessId};
use crate::config::{BurstRange, ProcessConfig, ThreadCount};
use crate::error::Result;
use crate::queue::QueueItem;
use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use std::sync::Arc;

/// Source of the random decisions made while building a process.
pub trait BurstTimeSource: Send {
    /// One subtask burst time.
    fn burst_time(&mut self) -> f64;

    /// Uniform integer in `[low, high]`, both inclusive.
    fn pick(&mut self, low: usize, high: usize) -> usize;
}

/// Uniform burst times drawn from a [`BurstRange`] with a PCG generator.
#[derive(Debug)]
pub struct RandomBurstTimeGenerator {
    rng: Pcg64,
    range: BurstRange,
}

impl RandomBurstTimeGenerator {
    pub fn new(range: BurstRange, seed: Option<u64>) -> Result<Self> {
        range.validate()?;
        let rng = match seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };
        Ok(Self { rng, range })
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
            range: BurstRange::default(),
        }
    }

    pub fn range(&self) -> BurstRange {
        self.range
    }
}

impl BurstTimeSource for RandomBurstTimeGenerator {
    fn burst_time(&mut self) -> f64 {
        let raw = self.rng.gen_range(self.range.min..=self.range.max);
        raw as f64 / self.range.divisor as f64
    }

    fn pick(&mut self, low: usize, high: usize) -> usize {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Hands out monotonically increasing process ids, starting at 1.
#[derive(Debug, Default)]
pub struct ProcessIdAllocator {
    last: Mutex<u64>,
}

impl ProcessIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> ProcessId {
        let mut last = self.last.lock();
        *last += 1;
        ProcessId(*last)
    }

    /// Number of ids handed out since the last reset.
    pub fn issued(&self) -> u64 {
        *self.last.lock()
    }

    pub fn reset(&self) {
        *self.last.lock() = 0;
    }
}

/// Builds processes from a [`ProcessConfig`], drawing randomness from a
/// [`BurstTimeSource`] and ids from a shared [`ProcessIdAllocator`].
pub struct ProcessFactory {
    ids: Arc<ProcessIdAllocator>,
    source: Box<dyn BurstTimeSource>,
    defaults: ProcessConfig,
}

impl ProcessFactory {
    pub fn new(
        ids: Arc<ProcessIdAllocator>,
        source: Box<dyn BurstTimeSource>,
        defaults: ProcessConfig,
    ) -> Result<Self> {
        defaults.validate()?;
        Ok(Self {
            ids,
            source,
            defaults,
        })
    }

    pub fn ids(&self) -> &Arc<ProcessIdAllocator> {
        &self.ids
    }

    pub fn defaults(&self) -> &ProcessConfig {
        &self.defaults
    }

    /// Generate a process with the factory defaults.
    pub fn generate(&mut self) -> Process {
        let config = self.defaults;
        self.build(&config)
    }

    /// Generate a process with explicit parameters.
    pub fn generate_with(&mut self, config: &ProcessConfig) -> Result<Process> {
        config.validate()?;
        Ok(self.build(config))
    }

    pub fn generate_item(&mut self) -> QueueItem {
        QueueItem::new(self.generate())
    }

    pub fn generate_item_with(&mut self, config: &ProcessConfig) -> Result<QueueItem> {
        self.generate_with(config).map(QueueItem::new)
    }

    fn build(&mut self, config: &ProcessConfig) -> Process {
        let id = self.ids.next();

        let n = match config.threads {
            ThreadCount::Fixed(n) => n,
            ThreadCount::UpTo(max) => self.source.pick(1, max),
        };

        let mut burst_times: Vec<f64> = (0..n).map(|_| self.source.burst_time()).collect();

        let mut elongated = None;
        let chance = config.max_long_thread_chance as usize;
        if chance > 0 && self.source.pick(1, chance) == 1 {
            let idx = self.source.pick(0, n - 1);
            burst_times[idx] *= config.long_thread_bt_multiplier as f64;
            elongated = Some(idx);
            tracing::debug!(
                process = %id,
                subtask = idx,
                multiplier = config.long_thread_bt_multiplier,
                "elongated subtask"
            );
        }

        let process = Process::from_parts(id, burst_times, elongated);
        tracing::debug!(
            process = %id,
            subtasks = n,
            bt_sum = process.bt_sum(),
            avg_bt = process.avg_bt(),
            "generated process"
        );
        process
    }
}

impl std::fmt::Debug for ProcessFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessFactory")
            .field("ids", &self.ids)
            .field("defaults", &self.defaults)
            .finish()
    }
}

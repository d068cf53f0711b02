//! Counters and time-to-complete distribution for a simulation run.

use crate::scheduler::SortingStyle;
use hdrhistogram::Histogram;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Runtime metrics collector
#[derive(Debug)]
pub struct Metrics {
    processes_generated: AtomicU64,
    processes_dispatched: AtomicU64,
    processes_faulted: AtomicU64,
    burst_time_selections: AtomicU64,
    age_selections: AtomicU64,

    // Time to complete, in microseconds
    ttc_histogram: RwLock<Histogram<u64>>,

    start_time: RwLock<Instant>,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            processes_generated: AtomicU64::new(0),
            processes_dispatched: AtomicU64::new(0),
            processes_faulted: AtomicU64::new(0),
            burst_time_selections: AtomicU64::new(0),
            age_selections: AtomicU64::new(0),
            ttc_histogram: RwLock::new(new_histogram()),
            start_time: RwLock::new(Instant::now()),
        }
    }

    pub fn record_generated(&self, count: u64) {
        self.processes_generated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_selection(&self, style: SortingStyle) {
        match style {
            SortingStyle::BurstTime => &self.burst_time_selections,
            SortingStyle::Age => &self.age_selections,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completion(&self, ttc: Duration, faulted: bool) {
        self.processes_dispatched.fetch_add(1, Ordering::Relaxed);
        if faulted {
            self.processes_faulted.fetch_add(1, Ordering::Relaxed);
        }

        let micros = u64::try_from(ttc.as_micros()).unwrap_or(u64::MAX);
        self.ttc_histogram.write().saturating_record(micros);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let histogram = self.ttc_histogram.read();
        let micros = |v: u64| Duration::from_micros(v);

        MetricsSnapshot {
            timestamp: Instant::now(),
            uptime: self.start_time.read().elapsed(),
            processes_generated: self.processes_generated.load(Ordering::Relaxed),
            processes_dispatched: self.processes_dispatched.load(Ordering::Relaxed),
            processes_faulted: self.processes_faulted.load(Ordering::Relaxed),
            burst_time_selections: self.burst_time_selections.load(Ordering::Relaxed),
            age_selections: self.age_selections.load(Ordering::Relaxed),
            mean_ttc: if histogram.len() > 0 {
                micros(histogram.mean() as u64)
            } else {
                Duration::ZERO
            },
            p50_ttc: micros(histogram.value_at_quantile(0.50)),
            p95_ttc: micros(histogram.value_at_quantile(0.95)),
            p99_ttc: micros(histogram.value_at_quantile(0.99)),
            max_ttc: micros(histogram.max()),
        }
    }

    pub fn reset(&self) {
        self.processes_generated.store(0, Ordering::Relaxed);
        self.processes_dispatched.store(0, Ordering::Relaxed);
        self.processes_faulted.store(0, Ordering::Relaxed);
        self.burst_time_selections.store(0, Ordering::Relaxed);
        self.age_selections.store(0, Ordering::Relaxed);
        self.ttc_histogram.write().reset();
        *self.start_time.write() = Instant::now();
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Longest trackable time to complete: one hour, in microseconds.
const MAX_TRACKABLE_TTC_US: u64 = 3_600_000_000;

fn new_histogram() -> Histogram<u64> {
    Histogram::new_with_max(MAX_TRACKABLE_TTC_US, 3).expect("Failed to create histogram")
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub timestamp: Instant,
    pub uptime: Duration,
    pub processes_generated: u64,
    pub processes_dispatched: u64,
    pub processes_faulted: u64,
    pub burst_time_selections: u64,
    pub age_selections: u64,
    pub mean_ttc: Duration,
    pub p50_ttc: Duration,
    pub p95_ttc: Duration,
    pub p99_ttc: Duration,
    pub max_ttc: Duration,
}

impl MetricsSnapshot {
    /// Completed processes per second of uptime.
    pub fn throughput(&self) -> f64 {
        let seconds = self.uptime.as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.processes_dispatched as f64 / seconds
    }

    /// Share of selections made in aging mode (0.0 to 1.0).
    pub fn aging_ratio(&self) -> f64 {
        let total = self.age_selections + self.burst_time_selections;
        if total == 0 {
            return 0.0;
        }
        self.age_selections as f64 / total as f64
    }
}

//! What a subtask does while it "uses the CPU".

use crate::process::ProcessId;
use std::thread;
use std::time::Duration;

/// Work performed by one subtask. Returning `Err` or panicking marks the
/// owning process as faulted; neither stops the simulation.
pub trait Workload: Send + Sync {
    fn run(&self, process: ProcessId, subtask: usize, burst_time: f64) -> Result<(), String>;
}

/// Sleeps `burst_time * time_scale`.
#[derive(Debug, Clone, Copy)]
pub struct SleepWorkload {
    time_scale: Duration,
}

impl SleepWorkload {
    pub fn new(time_scale: Duration) -> Self {
        Self { time_scale }
    }

    pub fn time_scale(&self) -> Duration {
        self.time_scale
    }

    pub fn duration_for(&self, burst_time: f64) -> Duration {
        self.time_scale.mul_f64(burst_time.max(0.0))
    }
}

impl Default for SleepWorkload {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Workload for SleepWorkload {
    fn run(&self, process: ProcessId, subtask: usize, burst_time: f64) -> Result<(), String> {
        tracing::trace!(process = %process, subtask, burst_time, "subtask running");
        thread::sleep(self.duration_for(burst_time));
        Ok(())
    }
}

impl<F> Workload for F
where
    F: Fn(ProcessId, usize, f64) -> Result<(), String> + Send + Sync,
{
    fn run(&self, process: ProcessId, subtask: usize, burst_time: f64) -> Result<(), String> {
        self(process, subtask, burst_time)
    }
}

use crate::process::Process;
use std::time::Duration;

/// A process plus its queue-relative bookkeeping.
///
/// `age` counts the pops that happened on the ready queue while this item
/// waited in it, i.e. the dispatch cycles it survived. It is not wall-clock
/// time.
#[derive(Debug)]
pub struct QueueItem {
    process: Process,
    age: u64,
    arrival_time: Duration,
    completed_at: Option<Duration>,
}

impl QueueItem {
    pub fn new(process: Process) -> Self {
        Self {
            process,
            age: 0,
            arrival_time: Duration::ZERO,
            completed_at: None,
        }
    }

    pub fn process(&self) -> &Process {
        &self.process
    }

    pub(crate) fn process_mut(&mut self) -> &mut Process {
        &mut self.process
    }

    pub fn into_process(self) -> Process {
        self.process
    }

    pub fn age(&self) -> u64 {
        self.age
    }

    /// Offset from the ready queue's epoch at which the item was added.
    /// Inside a [`Simulation`](crate::Simulation) the epoch is the start of
    /// the run.
    pub fn arrival_time(&self) -> Duration {
        self.arrival_time
    }

    /// Offset from the completed queue's epoch at which the item was recorded.
    pub fn completed_at(&self) -> Option<Duration> {
        self.completed_at
    }

    /// Time from arrival to completion.
    pub fn turnaround(&self) -> Option<Duration> {
        self.completed_at
            .map(|done| done.saturating_sub(self.arrival_time))
    }

    /// Turnaround minus the time spent running.
    pub fn waiting_time(&self) -> Option<Duration> {
        let turnaround = self.turnaround()?;
        let ttc = self.process.ttc()?;
        Some(turnaround.saturating_sub(ttc))
    }

    pub(crate) fn grow_older(&mut self) {
        self.age += 1;
    }

    pub(crate) fn set_arrival_time(&mut self, at: Duration) {
        self.arrival_time = at;
    }

    pub(crate) fn set_completed_at(&mut self, at: Duration) {
        self.completed_at = Some(at);
    }

    #[cfg(test)]
    pub(crate) fn with_age(mut self, age: u64) -> Self {
        self.age = age;
        self
    }
}

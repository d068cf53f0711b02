use super::cpu::Cpu;
use crate::process::ProcessId;
use crate::queue::{CompletedQueue, QueueItem, ReadyQueue};
use crate::scheduler::Scheduler;
use crate::telemetry::Metrics;
use std::sync::Arc;
use std::time::Instant;

/// Moves one item from the ready queue, through the [`Cpu`], into the
/// completed queue.
///
/// The three steps are exposed separately so a caller can release its queue
/// locks while the process runs.
#[derive(Debug)]
pub struct Dispatcher {
    cpu: Cpu,
    metrics: Option<Arc<Metrics>>,
}

impl Dispatcher {
    pub fn new(cpu: Cpu) -> Self {
        Self { cpu, metrics: None }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Ask the scheduler for the next item.
    pub fn select(&self, scheduler: &mut Scheduler, ready: &mut ReadyQueue) -> Option<QueueItem> {
        let item = scheduler.select_process(ready)?;
        if let Some(metrics) = &self.metrics {
            metrics.record_selection(scheduler.sorting_style());
        }
        Some(item)
    }

    /// Run the item's process to completion and record its time to complete.
    ///
    /// A faulted process still terminates; the fault is kept on the record.
    pub fn execute(&self, mut item: QueueItem) -> QueueItem {
        let process = item.process_mut();
        process.mark_running();

        let start = Instant::now();
        let fault = self.cpu.run(process);
        let ttc = start.elapsed();

        let faulted = fault.is_some();
        process.mark_terminated(ttc, fault);

        tracing::debug!(
            process = %process.id(),
            ttc_ms = ttc.as_millis() as u64,
            faulted,
            "process terminated"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_completion(ttc, faulted);
        }
        item
    }

    pub fn complete(&self, completed: &mut CompletedQueue, item: QueueItem) -> ProcessId {
        let id = item.process().id();
        completed.add(item);
        id
    }

    /// Select, execute and complete in one call.
    ///
    /// Returns the id of the dispatched process, or `None` when the ready
    /// queue was empty.
    pub fn dispatch(
        &self,
        scheduler: &mut Scheduler,
        ready: &mut ReadyQueue,
        completed: &mut CompletedQueue,
    ) -> Option<ProcessId> {
        let item = self.select(scheduler, ready)?;
        let item = self.execute(item);
        Some(self.complete(completed, item))
    }
}

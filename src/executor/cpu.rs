use super::panic_handler::{PanicHandler, PanicSite};
use super::workload::Workload;
use crate::process::{Fault, Process, ProcessId};
use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

/// Runs one process at a time: every subtask on its own thread, then a join.
pub struct Cpu {
    workload: Arc<dyn Workload>,
    panic_handler: Arc<PanicHandler>,
    running: Mutex<Option<ProcessId>>,
    thread_name_prefix: String,
}

impl Cpu {
    pub fn new(workload: Arc<dyn Workload>, panic_handler: Arc<PanicHandler>) -> Self {
        Self {
            workload,
            panic_handler,
            running: Mutex::new(None),
            thread_name_prefix: "sjf".to_string(),
        }
    }

    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Process currently on the CPU.
    pub fn running(&self) -> Option<ProcessId> {
        *self.running.lock()
    }

    pub fn panic_handler(&self) -> &PanicHandler {
        &self.panic_handler
    }

    /// Execute all subtasks concurrently and block until every one finished.
    ///
    /// Returns the fault of the lowest-numbered failing subtask, if any.
    /// Subtasks are not cancellable; a hung subtask blocks this call.
    pub fn run(&self, process: &Process) -> Option<Fault> {
        let id = process.id();
        *self.running.lock() = Some(id);

        let (tx, rx) = unbounded::<(usize, Result<(), String>)>();
        let mut handles = Vec::with_capacity(process.subtasks().len());
        let mut faults: Vec<Fault> = Vec::new();

        for (idx, &burst_time) in process.subtasks().iter().enumerate() {
            let tx = tx.clone();
            let workload = self.workload.clone();
            let panic_handler = self.panic_handler.clone();
            let name = format!("{}-{}-{}", self.thread_name_prefix, id, idx);

            let spawned = thread::Builder::new().name(name).spawn(move || {
                let site = PanicSite::Subtask {
                    process: id,
                    index: idx,
                };
                let outcome = panic_handler
                    .execute(site, || workload.run(id, idx, burst_time))
                    .unwrap_or_else(|caught| Err(caught.to_string()));
                let _ = tx.send((idx, outcome));
            });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => faults.push(Fault {
                    subtask: idx,
                    message: format!("spawn failed: {}", e),
                }),
            }
        }
        drop(tx);

        // Every sender is gone once all subtasks reported.
        for (idx, outcome) in rx.iter() {
            if let Err(message) = outcome {
                faults.push(Fault {
                    subtask: idx,
                    message,
                });
            }
        }

        for handle in handles {
            let _ = handle.join();
        }

        *self.running.lock() = None;

        let fault = faults.into_iter().min_by_key(|f| f.subtask);
        if let Some(fault) = &fault {
            tracing::warn!(process = %id, subtask = fault.subtask, reason = %fault.message, "process faulted");
        }
        fault
    }
}

impl std::fmt::Debug for Cpu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cpu")
            .field("running", &self.running())
            .field("thread_name_prefix", &self.thread_name_prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{PanicStrategy, SleepWorkload};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    fn process(bursts: &[f64]) -> Process {
        Process::with_burst_times(ProcessId(1), bursts.to_vec()).unwrap()
    }

    fn cpu_with(workload: Arc<dyn Workload>) -> Cpu {
        Cpu::new(workload, Arc::new(PanicHandler::new(PanicStrategy::Isolate)))
    }

    #[test]
    fn test_subtasks_run_in_parallel() {
        let cpu = cpu_with(Arc::new(SleepWorkload::new(Duration::from_millis(10))));
        let p = process(&[3.0, 3.0, 3.0, 3.0]);

        let start = Instant::now();
        assert!(cpu.run(&p).is_none());
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(30));
        // Sequential execution would need 120ms.
        assert!(elapsed < Duration::from_millis(110), "took {elapsed:?}");
        assert!(cpu.running().is_none());
    }

    #[test]
    fn test_every_subtask_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let cpu = cpu_with(Arc::new(move |_: ProcessId, _: usize, _: f64| -> Result<(), String> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));

        assert!(cpu.run(&process(&[1.0, 2.0, 3.0, 4.0, 5.0])).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_panicking_subtask_becomes_fault() {
        let cpu = cpu_with(Arc::new(|_: ProcessId, subtask: usize, _: f64| -> Result<(), String> {
            if subtask >= 1 {
                panic!("subtask {} exploded", subtask);
            }
            Ok(())
        }));

        let fault = cpu.run(&process(&[1.0, 1.0, 1.0])).unwrap();
        assert_eq!(fault.subtask, 1);
        assert!(fault.message.contains("subtask 1 exploded"));
        assert_eq!(cpu.panic_handler().panic_count(), 2);
    }

    #[test]
    fn test_failing_subtask_becomes_fault() {
        let cpu = cpu_with(Arc::new(|_: ProcessId, subtask: usize, _: f64| -> Result<(), String> {
            if subtask == 2 {
                Err("disk on fire".to_string())
            } else {
                Ok(())
            }
        }));

        let fault = cpu.run(&process(&[1.0, 1.0, 1.0])).unwrap();
        assert_eq!(fault.subtask, 2);
        assert_eq!(fault.message, "disk on fire");
    }
}

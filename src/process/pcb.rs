//! Process control block.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Unique identifier for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ProcessId(pub(crate) u64);

impl ProcessId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Lifecycle of a process. Transitions are linear and never go back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ProcessState {
    New,
    Ready,
    Running,
    /// Declared for completeness; no transition leads here.
    Waiting,
    Terminated,
}

/// A subtask that failed while the process was running.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Fault {
    pub subtask: usize,
    pub message: String,
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subtask {} failed: {}", self.subtask, self.message)
    }
}

/// Scheduling metadata for one unit of work.
///
/// Burst-time statistics are computed once from the final subtask set and
/// never recomputed. Only the dispatcher mutates `state`, `ttc` and `fault`.
#[derive(Debug)]
pub struct Process {
    id: ProcessId,
    subtasks: Vec<f64>,
    state: ProcessState,
    bt_sum: f64,
    avg_bt: f64,
    min_bt: f64,
    max_bt: f64,
    elongated: Option<usize>,
    ttc: Option<Duration>,
    fault: Option<Fault>,
}

impl Process {
    /// Build a process from explicit burst times.
    pub fn with_burst_times(id: ProcessId, burst_times: Vec<f64>) -> Result<Self> {
        if burst_times.is_empty() {
            return Err(Error::config("subtasks", "at least one burst time is required"));
        }
        if let Some(bad) = burst_times.iter().find(|bt| !bt.is_finite() || **bt < 0.0) {
            return Err(Error::config(
                "subtasks",
                format!("burst time {} is not a finite non-negative number", bad),
            ));
        }
        Ok(Self::from_parts(id, burst_times, None))
    }

    pub(crate) fn from_parts(id: ProcessId, subtasks: Vec<f64>, elongated: Option<usize>) -> Self {
        debug_assert!(!subtasks.is_empty(), "process {id} needs at least one subtask");

        let bt_sum: f64 = subtasks.iter().sum();
        let avg_bt = bt_sum / subtasks.len() as f64;
        let min_bt = subtasks.iter().copied().fold(f64::INFINITY, f64::min);
        let max_bt = subtasks.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Self {
            id,
            subtasks,
            state: ProcessState::New,
            bt_sum,
            avg_bt,
            min_bt,
            max_bt,
            elongated,
            ttc: None,
            fault: None,
        }
    }

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn subtasks(&self) -> &[f64] {
        &self.subtasks
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn bt_sum(&self) -> f64 {
        self.bt_sum
    }

    pub fn avg_bt(&self) -> f64 {
        self.avg_bt
    }

    pub fn min_bt(&self) -> f64 {
        self.min_bt
    }

    pub fn max_bt(&self) -> f64 {
        self.max_bt
    }

    /// Index of the subtask whose burst time was multiplied, if any.
    pub fn elongated_subtask(&self) -> Option<usize> {
        self.elongated
    }

    /// Wall-clock duration of the dispatch, once the process has run.
    pub fn ttc(&self) -> Option<Duration> {
        self.ttc
    }

    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub(crate) fn mark_ready(&mut self) {
        if self.state == ProcessState::New {
            self.state = ProcessState::Ready;
        }
    }

    pub(crate) fn mark_running(&mut self) {
        debug_assert!(
            self.state != ProcessState::Terminated,
            "terminated process {} cannot run again",
            self.id
        );
        self.state = ProcessState::Running;
    }

    pub(crate) fn mark_terminated(&mut self, ttc: Duration, fault: Option<Fault>) {
        debug_assert_eq!(
            self.state,
            ProcessState::Running,
            "process {} must be running before it terminates",
            self.id
        );
        self.state = ProcessState::Terminated;
        self.ttc = Some(ttc);
        self.fault = fault;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_from_burst_times() {
        let p = Process::with_burst_times(ProcessId(1), vec![1.0, 3.0, 2.0]).unwrap();
        assert_eq!(p.bt_sum(), 6.0);
        assert_eq!(p.avg_bt(), 2.0);
        assert_eq!(p.min_bt(), 1.0);
        assert_eq!(p.max_bt(), 3.0);
        assert_eq!(p.state(), ProcessState::New);
        assert!(p.ttc().is_none());
        assert!(p.elongated_subtask().is_none());
    }

    #[test]
    fn test_rejects_empty_and_negative_burst_times() {
        assert!(Process::with_burst_times(ProcessId(1), vec![]).is_err());
        assert!(Process::with_burst_times(ProcessId(1), vec![1.0, -0.5]).is_err());
        assert!(Process::with_burst_times(ProcessId(1), vec![f64::NAN]).is_err());
    }

    #[test]
    fn test_linear_lifecycle() {
        let mut p = Process::with_burst_times(ProcessId(4), vec![0.5]).unwrap();
        p.mark_ready();
        assert_eq!(p.state(), ProcessState::Ready);
        p.mark_running();
        assert_eq!(p.state(), ProcessState::Running);
        p.mark_terminated(Duration::from_millis(5), None);
        assert_eq!(p.state(), ProcessState::Terminated);
        assert_eq!(p.ttc(), Some(Duration::from_millis(5)));

        // Re-queueing a finished process must not rewind its state.
        p.mark_ready();
        assert_eq!(p.state(), ProcessState::Terminated);
    }

    #[test]
    fn test_fault_recorded_on_termination() {
        let mut p = Process::with_burst_times(ProcessId(2), vec![0.5, 0.5]).unwrap();
        p.mark_running();
        p.mark_terminated(
            Duration::from_millis(1),
            Some(Fault {
                subtask: 1,
                message: "boom".into(),
            }),
        );
        assert!(p.is_faulted());
        assert_eq!(p.fault().unwrap().to_string(), "subtask 1 failed: boom");
        assert_eq!(ProcessId(2).to_string(), "P2");
    }
}

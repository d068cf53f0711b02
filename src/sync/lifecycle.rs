use parking_lot::{Condvar, Mutex};

/// Where a simulation is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum RunState {
    /// Not started, or stopped and joined.
    Idle,
    Running,
    Paused,
    /// Loops are winding down and will not run again.
    Stopped,
}

/// Shared run state with a condition variable so paused loops can block.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<RunState>,
    changed: Condvar,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunState::Idle),
            changed: Condvar::new(),
        }
    }

    pub fn state(&self) -> RunState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Move to `to` if the current state is one of `from`.
    pub fn transition(&self, from: &[RunState], to: RunState) -> bool {
        let mut state = self.state.lock();
        if !from.contains(&state) {
            return false;
        }
        *state = to;
        self.changed.notify_all();
        true
    }

    pub fn start(&self) -> bool {
        self.transition(&[RunState::Idle], RunState::Running)
    }

    pub fn pause(&self) -> bool {
        self.transition(&[RunState::Running], RunState::Paused)
    }

    pub fn resume(&self) -> bool {
        self.transition(&[RunState::Paused], RunState::Running)
    }

    pub fn stop(&self) -> bool {
        self.transition(&[RunState::Running, RunState::Paused], RunState::Stopped)
    }

    /// Back to `Idle` once the loops are gone.
    pub fn reset(&self) -> bool {
        self.transition(&[RunState::Stopped], RunState::Idle)
    }

    /// Block until `done` accepts the current state, and return that state.
    pub fn wait_until<F>(&self, done: F) -> RunState
    where
        F: Fn(RunState) -> bool,
    {
        let mut state = self.state.lock();
        while !done(*state) {
            self.changed.wait(&mut state);
        }
        *state
    }

    /// Block while paused; returns the state that ended the wait.
    pub fn wait_while_paused(&self) -> RunState {
        self.wait_until(|state| state != RunState::Paused)
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

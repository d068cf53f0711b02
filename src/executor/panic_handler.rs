//! Containment for panics raised by subtask workloads and loop hooks.

use crate::process::ProcessId;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What to do once a panic has been caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Log and abort the whole process.
    Abort,
    /// Turn the panic into an error silently.
    #[default]
    Isolate,
    /// Turn the panic into an error and log it.
    LogAndContinue,
}

/// Where a caught panic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicSite {
    Subtask { process: ProcessId, index: usize },
    Hook(&'static str),
}

impl fmt::Display for PanicSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanicSite::Subtask { process, index } => write!(f, "{} subtask {}", process, index),
            PanicSite::Hook(name) => write!(f, "hook `{}`", name),
        }
    }
}

#[derive(Debug)]
pub struct PanicHandler {
    strategy: PanicStrategy,
    subtask_panics: AtomicUsize,
    hook_panics: AtomicUsize,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            subtask_panics: AtomicUsize::new(0),
            hook_panics: AtomicUsize::new(0),
        }
    }

    /// Run `f`, converting a panic into [`CaughtPanic`] according to the
    /// strategy.
    pub fn execute<F, R>(&self, site: PanicSite, f: F) -> Result<R, CaughtPanic>
    where
        F: FnOnce() -> R,
    {
        let payload = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => return Ok(result),
            Err(payload) => payload,
        };

        match site {
            PanicSite::Subtask { .. } => &self.subtask_panics,
            PanicSite::Hook(_) => &self.hook_panics,
        }
        .fetch_add(1, Ordering::Relaxed);

        let caught = CaughtPanic {
            site,
            message: panic_message(&*payload),
        };

        match self.strategy {
            PanicStrategy::Abort => {
                tracing::error!(site = %caught.site, reason = %caught.message, "panic, aborting");
                std::process::abort();
            }
            PanicStrategy::Isolate => {}
            PanicStrategy::LogAndContinue => {
                tracing::error!(site = %caught.site, reason = %caught.message, "panic contained");
            }
        }

        Err(caught)
    }

    /// Panics caught so far, from any site.
    pub fn panic_count(&self) -> usize {
        self.subtask_panics() + self.hook_panics()
    }

    pub fn subtask_panics(&self) -> usize {
        self.subtask_panics.load(Ordering::Relaxed)
    }

    pub fn hook_panics(&self) -> usize {
        self.hook_panics.load(Ordering::Relaxed)
    }

    pub fn reset_count(&self) {
        self.subtask_panics.store(0, Ordering::Relaxed);
        self.hook_panics.store(0, Ordering::Relaxed);
    }

    pub fn strategy(&self) -> PanicStrategy {
        self.strategy
    }
}

impl Default for PanicHandler {
    fn default() -> Self {
        Self::new(PanicStrategy::default())
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A panic turned into a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaughtPanic {
    pub site: PanicSite,
    pub message: String,
}

impl fmt::Display for CaughtPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} panicked: {}", self.site, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtask(index: usize) -> PanicSite {
        PanicSite::Subtask {
            process: ProcessId(7),
            index,
        }
    }

    #[test]
    fn test_isolated_panic_becomes_error() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);

        let result = handler.execute(subtask(2), || {
            panic!("disk on fire");
        });

        let caught: CaughtPanic = result.unwrap_err();
        assert_eq!(caught.message, "disk on fire");
        assert_eq!(caught.to_string(), "P7 subtask 2 panicked: disk on fire");
        assert_eq!(handler.subtask_panics(), 1);
        assert_eq!(handler.hook_panics(), 0);
    }

    #[test]
    fn test_value_passes_through() {
        let handler = PanicHandler::default();
        assert_eq!(handler.execute(PanicSite::Hook("on_dispatch"), || 42).unwrap(), 42);
        assert_eq!(handler.panic_count(), 0);
        assert_eq!(handler.strategy(), PanicStrategy::Isolate);
    }

    #[test]
    fn test_counts_per_site() {
        let handler = PanicHandler::new(PanicStrategy::LogAndContinue);

        for i in 0..3 {
            let _ = handler.execute(subtask(i), || panic!("subtask {}", i));
        }
        let caught = handler
            .execute(PanicSite::Hook("on_generate"), || panic!("hook"))
            .unwrap_err();
        assert_eq!(caught.to_string(), "hook `on_generate` panicked: hook");

        assert_eq!(handler.subtask_panics(), 3);
        assert_eq!(handler.hook_panics(), 1);
        assert_eq!(handler.panic_count(), 4);

        handler.reset_count();
        assert_eq!(handler.panic_count(), 0);
    }
}

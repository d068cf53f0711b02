//! Process execution.
//!
//! A [`Cpu`] runs one process at a time, fanning its subtasks out to threads.
//! The [`Dispatcher`] wraps it with scheduling and queue bookkeeping.

pub mod cpu;
pub mod dispatcher;
pub mod panic_handler;
pub mod workload;

pub use cpu::Cpu;
pub use dispatcher::Dispatcher;
pub use panic_handler::{CaughtPanic, PanicHandler, PanicSite, PanicStrategy};
pub use workload::{SleepWorkload, Workload};

//! Process control blocks and their synthetic construction.

pub mod generator;
pub mod pcb;

pub use generator::{BurstTimeSource, ProcessFactory, ProcessIdAllocator, RandomBurstTimeGenerator};
pub use pcb::{Fault, Process, ProcessId, ProcessState};

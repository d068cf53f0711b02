//! Blocking coordination primitives for the simulation loops.

pub mod lifecycle;
pub mod rendezvous;
pub mod semaphore;

pub use lifecycle::{Lifecycle, RunState};
pub use rendezvous::{Rendezvous, Side, Turn};
pub use semaphore::Semaphore;

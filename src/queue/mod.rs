//! Ready and completed queues.
//!
//! A [`QueueItem`] lives in exactly one queue at a time. It moves by value
//! from the [`ReadyQueue`] to the dispatcher and from there into the
//! [`CompletedQueue`], which never gives it back.

pub mod completed;
pub mod item;
pub mod ready;

pub use completed::{CompletedQueue, CompletionSummary};
pub use item::QueueItem;
pub use ready::ReadyQueue;

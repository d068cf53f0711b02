//! Process selection policy.
//!
//! The scheduler is a pure decision component: given a ready queue it
//! reorders it and removes the item that should run next. It never runs
//! anything itself; that is the [`executor`](crate::executor)'s job.

pub mod sjf;

pub use sjf::Scheduler;

/// Ordering applied by the last selection. Diagnostic only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SortingStyle {
    /// Ascending mean burst time.
    BurstTime,
    /// Descending age, then descending total burst time.
    Age,
}

impl SortingStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            SortingStyle::BurstTime => "burst_time",
            SortingStyle::Age => "age",
        }
    }
}

impl std::fmt::Display for SortingStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

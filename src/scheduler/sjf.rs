use super::SortingStyle;
use crate::queue::{QueueItem, ReadyQueue};
use std::cmp::Ordering;

/// Non-preemptive shortest-job-first with an aging escape valve.
///
/// While no queued item has waited `age_threshold` pops, the queue is
/// ordered by ascending mean burst time. As soon as one has, it is ordered
/// oldest first, heaviest (`bt_sum`) first among equally old items. The sort
/// is stable, so remaining ties keep queue order.
#[derive(Debug, Clone)]
pub struct Scheduler {
    age_threshold: u64,
    sorting_style: SortingStyle,
}

impl Scheduler {
    pub fn new(age_threshold: u64) -> Self {
        Self {
            age_threshold,
            sorting_style: SortingStyle::BurstTime,
        }
    }

    pub fn age_threshold(&self) -> u64 {
        self.age_threshold
    }

    pub fn set_age_threshold(&mut self, threshold: u64) {
        self.age_threshold = threshold;
    }

    /// Style used by the most recent selection.
    pub fn sorting_style(&self) -> SortingStyle {
        self.sorting_style
    }

    /// Pick and remove the next item to run, or `None` if the queue is empty.
    ///
    /// Removal ages every item left in the queue by one.
    pub fn select_process(&mut self, queue: &mut ReadyQueue) -> Option<QueueItem> {
        if queue.is_empty() {
            return None;
        }

        if self.has_starving(queue) {
            self.sorting_style = SortingStyle::Age;
            queue.sort_by(by_age_then_heaviest);
        } else {
            self.sorting_style = SortingStyle::BurstTime;
            queue.sort_by(by_shortest_mean_burst);
        }

        let selected = queue.pop_front();
        if let Some(item) = &selected {
            tracing::debug!(
                process = %item.process().id(),
                style = ?self.sorting_style,
                age = item.age(),
                avg_bt = item.process().avg_bt(),
                remaining = queue.len(),
                "selected process"
            );
        }
        selected
    }

    fn has_starving(&self, queue: &ReadyQueue) -> bool {
        queue.iter().any(|item| item.age() >= self.age_threshold)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(10)
    }
}

fn by_shortest_mean_burst(a: &QueueItem, b: &QueueItem) -> Ordering {
    a.process().avg_bt().total_cmp(&b.process().avg_bt())
}

fn by_age_then_heaviest(a: &QueueItem, b: &QueueItem) -> Ordering {
    b.age()
        .cmp(&a.age())
        .then_with(|| b.process().bt_sum().total_cmp(&a.process().bt_sum()))
}

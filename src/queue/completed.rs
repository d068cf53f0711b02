use super::item::QueueItem;
use std::ops::Index;
use std::time::{Duration, Instant};

/// Append-only record of finished items.
#[derive(Debug)]
pub struct CompletedQueue {
    items: Vec<QueueItem>,
    epoch: Instant,
}

impl CompletedQueue {
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    pub fn with_epoch(epoch: Instant) -> Self {
        Self {
            items: Vec::new(),
            epoch,
        }
    }

    /// Move the epoch forward to `epoch`, shifting recorded completion
    /// offsets with it.
    pub fn rebase(&mut self, epoch: Instant) {
        let shift = epoch.saturating_duration_since(self.epoch);
        for item in &mut self.items {
            if let Some(done) = item.completed_at() {
                item.set_completed_at(done.saturating_sub(shift));
            }
        }
        self.epoch = epoch;
    }

    pub fn add(&mut self, mut item: QueueItem) {
        item.set_completed_at(self.epoch.elapsed());
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QueueItem> {
        self.items.iter()
    }

    pub fn last_n(&self, n: usize) -> &[QueueItem] {
        let start = self.items.len().saturating_sub(n);
        &self.items[start..]
    }

    pub fn summary(&self) -> CompletionSummary {
        CompletionSummary::from_items(&self.items)
    }
}

impl Default for CompletedQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for CompletedQueue {
    type Output = QueueItem;

    fn index(&self, index: usize) -> &QueueItem {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a CompletedQueue {
    type Item = &'a QueueItem;
    type IntoIter = std::slice::Iter<'a, QueueItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Aggregate timings over the completed items, in seconds.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CompletionSummary {
    pub count: usize,
    pub faulted: usize,
    pub mean_ttc_secs: f64,
    pub mean_turnaround_secs: f64,
    pub mean_waiting_secs: f64,
    pub mean_avg_bt: f64,
}

impl CompletionSummary {
    fn from_items(items: &[QueueItem]) -> Self {
        if items.is_empty() {
            return Self::default();
        }

        Self {
            count: items.len(),
            faulted: items.iter().filter(|i| i.process().is_faulted()).count(),
            mean_ttc_secs: mean_secs(items.iter().filter_map(|i| i.process().ttc())),
            mean_turnaround_secs: mean_secs(items.iter().filter_map(QueueItem::turnaround)),
            mean_waiting_secs: mean_secs(items.iter().filter_map(QueueItem::waiting_time)),
            mean_avg_bt: items.iter().map(|i| i.process().avg_bt()).sum::<f64>()
                / items.len() as f64,
        }
    }
}

fn mean_secs(durations: impl Iterator<Item = Duration>) -> f64 {
    let (total, count) = durations.fold((0.0, 0usize), |(total, count), d| {
        (total + d.as_secs_f64(), count + 1)
    });
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Fault, Process, ProcessId};

    fn finished(id: u64, ttc_ms: u64, fault: bool) -> QueueItem {
        let mut item =
            QueueItem::new(Process::with_burst_times(ProcessId(id), vec![1.0, 3.0]).unwrap());
        let fault = fault.then(|| Fault {
            subtask: 0,
            message: "x".into(),
        });
        item.process_mut().mark_running();
        item.process_mut()
            .mark_terminated(Duration::from_millis(ttc_ms), fault);
        item
    }

    #[test]
    fn test_append_only_order_and_last_n() {
        let mut done = CompletedQueue::new();
        assert!(done.is_empty());
        for id in 1..=5 {
            done.add(finished(id, 1, false));
        }

        assert_eq!(done.len(), 5);
        assert_eq!(done[0].process().id().get(), 1);
        let tail: Vec<u64> = done.last_n(2).iter().map(|i| i.process().id().get()).collect();
        assert_eq!(tail, vec![4, 5]);
        assert_eq!(done.last_n(50).len(), 5);
        assert!(done.iter().all(|i| i.completed_at().is_some()));
    }

    #[test]
    fn test_rebase_shifts_completion_offsets() {
        let past = Instant::now()
            .checked_sub(Duration::from_secs(10))
            .unwrap();
        let mut done = CompletedQueue::with_epoch(past);
        done.add(finished(1, 1, false));

        done.rebase(past + Duration::from_secs(3));
        let at = done[0].completed_at().unwrap();
        assert!(at >= Duration::from_secs(7) && at < Duration::from_secs(8));
    }

    #[test]
    fn test_summary() {
        let mut done = CompletedQueue::new();
        assert_eq!(done.summary(), CompletionSummary::default());

        done.add(finished(1, 10, false));
        done.add(finished(2, 30, true));

        let summary = done.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.faulted, 1);
        assert!((summary.mean_ttc_secs - 0.020).abs() < 1e-9);
        assert_eq!(summary.mean_avg_bt, 2.0);
        assert!(summary.mean_waiting_secs >= 0.0);
    }
}

use super::item::QueueItem;
use std::cmp::Ordering;
use std::ops::Index;
use std::time::Instant;

/// Ordered collection of items waiting to be dispatched.
#[derive(Debug)]
pub struct ReadyQueue {
    items: Vec<QueueItem>,
    epoch: Instant,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::with_epoch(Instant::now())
    }

    pub fn with_epoch(epoch: Instant) -> Self {
        Self {
            items: Vec::new(),
            epoch,
        }
    }

    pub fn epoch(&self) -> Instant {
        self.epoch
    }

    /// Move the epoch forward to `epoch`. Items already waiting keep their
    /// arrival offsets relative to the new epoch, clamped at zero.
    pub fn rebase(&mut self, epoch: Instant) {
        let shift = epoch.saturating_duration_since(self.epoch);
        for item in &mut self.items {
            let arrived = item.arrival_time().saturating_sub(shift);
            item.set_arrival_time(arrived);
        }
        self.epoch = epoch;
    }

    /// Append to the tail, stamping the arrival time.
    pub fn add(&mut self, mut item: QueueItem) {
        item.set_arrival_time(self.epoch.elapsed());
        item.process_mut().mark_ready();
        self.items.push(item);
    }

    /// Remove the item at `index`. Every item left behind ages by one.
    ///
    /// Out-of-range indices return `None` and age nothing.
    pub fn pop(&mut self, index: usize) -> Option<QueueItem> {
        if index >= self.items.len() {
            return None;
        }

        let item = self.items.remove(index);
        for waiting in &mut self.items {
            waiting.grow_older();
        }
        Some(item)
    }

    pub fn pop_front(&mut self) -> Option<QueueItem> {
        self.pop(0)
    }

    /// Stable in-place sort: items comparing equal keep their relative order.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&QueueItem, &QueueItem) -> Ordering,
    {
        self.items.sort_by(compare);
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

    pub fn first_n(&self, n: usize) -> &[QueueItem] {
        &self.items[..n.min(self.items.len())]
    }
}

impl Default for ReadyQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for ReadyQueue {
    type Output = QueueItem;

    fn index(&self, index: usize) -> &QueueItem {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a ReadyQueue {
    type Item = &'a QueueItem;
    type IntoIter = std::slice::Iter<'a, QueueItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Process, ProcessId, ProcessState};

    fn item(id: u64, bursts: &[f64]) -> QueueItem {
        QueueItem::new(Process::with_burst_times(ProcessId(id), bursts.to_vec()).unwrap())
    }

    fn ids(queue: &ReadyQueue) -> Vec<u64> {
        queue.iter().map(|i| i.process().id().get()).collect()
    }

    #[test]
    fn test_empty_add_pop_cycle() {
        let mut queue = ReadyQueue::new();
        assert!(queue.is_empty());

        queue.add(item(1, &[1.0]));
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);

        let popped = queue.pop_front().unwrap();
        assert_eq!(popped.process().id().get(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_add_marks_ready_and_stamps_arrival() {
        let mut queue = ReadyQueue::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        queue.add(item(1, &[1.0]));

        assert_eq!(queue[0].process().state(), ProcessState::Ready);
        assert!(queue[0].arrival_time() >= std::time::Duration::from_millis(2));
    }

    #[test]
    fn test_rebase_keeps_offsets_relative_to_new_epoch() {
        use std::time::Duration;

        let past = Instant::now()
            .checked_sub(Duration::from_secs(10))
            .unwrap();
        let mut queue = ReadyQueue::with_epoch(past);
        queue.add(item(1, &[1.0]));
        assert!(queue[0].arrival_time() >= Duration::from_secs(10));

        let anchor = past + Duration::from_secs(4);
        queue.rebase(anchor);
        assert_eq!(queue.epoch(), anchor);
        let arrival = queue[0].arrival_time();
        assert!(arrival >= Duration::from_secs(6) && arrival < Duration::from_secs(7));

        // Items that arrived before the new epoch clamp to zero.
        queue.rebase(Instant::now() + Duration::from_secs(1));
        assert_eq!(queue[0].arrival_time(), Duration::ZERO);

        queue.add(item(2, &[1.0]));
        assert_eq!(queue[1].arrival_time(), Duration::ZERO);
    }

    #[test]
    fn test_pop_out_of_range_is_none_and_ages_nothing() {
        let mut queue = ReadyQueue::new();
        queue.add(item(1, &[1.0]));
        assert!(queue.pop(5).is_none());
        assert_eq!(queue[0].age(), 0);

        let mut empty = ReadyQueue::new();
        assert!(empty.pop_front().is_none());
    }

    #[test]
    fn test_pop_ages_every_remaining_item_by_one() {
        let mut queue = ReadyQueue::new();
        for id in 1..=4 {
            queue.add(item(id, &[1.0]));
        }

        let popped = queue.pop(2).unwrap();
        assert_eq!(popped.process().id().get(), 3);
        assert_eq!(popped.age(), 0);
        assert!(queue.iter().all(|i| i.age() == 1));

        queue.pop_front();
        assert_eq!(ids(&queue), vec![2, 4]);
        assert!(queue.iter().all(|i| i.age() == 2));
    }

    #[test]
    fn test_sort_is_stable() {
        let mut queue = ReadyQueue::new();
        queue.add(item(1, &[2.0]));
        queue.add(item(2, &[1.0]));
        queue.add(item(3, &[2.0]));
        queue.add(item(4, &[1.0]));

        queue.sort_by(|a, b| a.process().avg_bt().total_cmp(&b.process().avg_bt()));
        assert_eq!(ids(&queue), vec![2, 4, 1, 3]);

        // Descending order keeps ties in their current order too.
        queue.sort_by(|a, b| b.process().avg_bt().total_cmp(&a.process().avg_bt()));
        assert_eq!(ids(&queue), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_first_n_clamps() {
        let mut queue = ReadyQueue::new();
        queue.add(item(1, &[1.0]));
        queue.add(item(2, &[1.0]));
        assert_eq!(queue.first_n(1).len(), 1);
        assert_eq!(queue.first_n(10).len(), 2);
        assert_eq!((&queue).into_iter().count(), 2);
    }
}

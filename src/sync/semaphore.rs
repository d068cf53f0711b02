//! Counting semaphore built from a mutex and a condition variable.

use parking_lot::{Condvar, Mutex};

/// Counting semaphore.
///
/// A semaphore created with zero permits works as a repeating signal: one
/// thread blocks in [`acquire`](Semaphore::acquire) until another calls
/// [`release`](Semaphore::release).
#[derive(Debug)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Block until a permit is available, then take it.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }
        *permits -= 1;
    }

    /// Return a permit and wake one waiter.
    pub fn release(&self) {
        *self.permits.lock() += 1;
        self.available.notify_one();
    }

    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_release_counts() {
        let sema = Semaphore::new(2);
        sema.acquire();
        sema.acquire();
        assert_eq!(sema.available(), 0);

        sema.release();
        assert_eq!(sema.available(), 1);
        sema.acquire();
        assert_eq!(sema.available(), 0);
    }

    #[test]
    fn test_zero_permits_blocks_until_signalled() {
        let sema = Arc::new(Semaphore::new(0));
        let woke = Arc::new(AtomicUsize::new(0));

        let handle = {
            let sema = sema.clone();
            let woke = woke.clone();
            thread::spawn(move || {
                sema.acquire();
                woke.fetch_add(1, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(woke.load(Ordering::SeqCst), 0);

        sema.release();
        handle.join().unwrap();
        assert_eq!(woke.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bounded_concurrency() {
        let sema = Arc::new(Semaphore::new(3));
        let inside = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sema = sema.clone();
                let inside = inside.clone();
                let peak = peak.clone();
                thread::spawn(move || {
                    sema.acquire();
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                    inside.fetch_sub(1, Ordering::SeqCst);
                    sema.release();
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(sema.available(), 3);
    }
}

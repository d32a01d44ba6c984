use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Completion barrier: one `count_down` per task, one blocking `wait`
/// for all of them.
///
/// The count never goes below zero; counting down an open latch is a
/// no-op. `wait` returns immediately once the count reaches zero and
/// stays open thereafter.
#[derive(Debug)]
pub struct CountdownLatch {
    remaining: Mutex<usize>,
    zeroed: Condvar,
}

impl CountdownLatch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            zeroed: Condvar::new(),
        }
    }

    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining > 0 {
            *remaining -= 1;
            if *remaining == 0 {
                self.zeroed.notify_all();
            }
        }
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.zeroed.wait(&mut remaining);
        }
    }

    /// Block until the count reaches zero or the timeout elapses.
    /// Returns `true` if the latch opened.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            let result = self.zeroed.wait_until(&mut remaining, deadline);
            if result.timed_out() {
                return *remaining == 0;
            }
        }
        true
    }

    pub fn count(&self) -> usize {
        *self.remaining.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn opens_at_zero() {
        let latch = CountdownLatch::new(0);
        latch.wait();
        assert_eq!(latch.count(), 0);
    }

    #[test]
    fn waits_for_all_counts() {
        let latch = Arc::new(CountdownLatch::new(4));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let latch = Arc::clone(&latch);
            handles.push(thread::spawn(move || latch.count_down()));
        }

        latch.wait();
        assert_eq!(latch.count(), 0);

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn extra_count_down_is_ignored() {
        let latch = CountdownLatch::new(1);
        latch.count_down();
        latch.count_down();
        assert_eq!(latch.count(), 0);
        latch.wait();
    }

    #[test]
    fn wait_timeout_expires() {
        let latch = CountdownLatch::new(1);
        assert!(!latch.wait_timeout(Duration::from_millis(20)));

        latch.count_down();
        assert!(latch.wait_timeout(Duration::from_millis(20)));
    }
}

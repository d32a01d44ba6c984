//! Pool counters.
//!
//! Always-on atomic counters covering task and thread lifecycle events.
//! `WorkerPool::metrics` returns a point-in-time snapshot; the counters
//! are the instrumentation used by callers (and tests) to observe
//! dispatch behavior, e.g. that trivial inputs never reach the pool.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct PoolMetrics {
    tasks_submitted: AtomicU64,
    tasks_executed: AtomicU64,
    tasks_panicked: AtomicU64,
    threads_spawned: AtomicU64,
    threads_expired: AtomicU64,
}

impl PoolMetrics {
    pub fn new() -> Self {
        Self {
            tasks_submitted: AtomicU64::new(0),
            tasks_executed: AtomicU64::new(0),
            tasks_panicked: AtomicU64::new(0),
            threads_spawned: AtomicU64::new(0),
            threads_expired: AtomicU64::new(0),
        }
    }

    pub fn record_task_submitted(&self) {
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_executed(&self) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_task_panicked(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_thread_spawned(&self) {
        self.threads_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_thread_expired(&self) {
        self.threads_expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            tasks_submitted: self.tasks_submitted.load(Ordering::Relaxed),
            tasks_executed: self.tasks_executed.load(Ordering::Relaxed),
            tasks_panicked: self.tasks_panicked.load(Ordering::Relaxed),
            threads_spawned: self.threads_spawned.load(Ordering::Relaxed),
            threads_expired: self.threads_expired.load(Ordering::Relaxed),
        }
    }
}

impl Default for PoolMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub tasks_submitted: u64,
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub threads_spawned: u64,
    pub threads_expired: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = PoolMetrics::new();
        metrics.record_task_submitted();
        metrics.record_task_submitted();
        metrics.record_task_executed();
        metrics.record_thread_spawned();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.tasks_submitted, 2);
        assert_eq!(snapshot.tasks_executed, 1);
        assert_eq!(snapshot.tasks_panicked, 0);
        assert_eq!(snapshot.threads_spawned, 1);
        assert_eq!(snapshot.threads_expired, 0);
    }
}

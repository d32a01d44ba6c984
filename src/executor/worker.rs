// worker thread loop
use super::metrics::PoolMetrics;
use super::task::Task;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub type WorkerId = usize;

pub(crate) struct Worker {
    pub id: WorkerId,
    pub metrics: Arc<PoolMetrics>,
}

impl Worker {
    pub fn new(id: WorkerId, metrics: Arc<PoolMetrics>) -> Self {
        Self { id, metrics }
    }

    // Blocks on the shared queue until a task arrives, the queue closes,
    // or the idle timeout elapses. An expiring worker deregisters from
    // the live count first and then drains the queue once more, so a
    // submission racing with the expiry is picked up instead of stranded.
    pub fn run(
        &self,
        tasks: Receiver<Task>,
        shutdown: Arc<AtomicBool>,
        idle_workers: Arc<AtomicUsize>,
        live_workers: Arc<AtomicUsize>,
        idle_timeout: Duration,
    ) {
        loop {
            if shutdown.load(Ordering::Acquire) {
                break;
            }

            idle_workers.fetch_add(1, Ordering::SeqCst);
            let next = tasks.recv_timeout(idle_timeout);
            idle_workers.fetch_sub(1, Ordering::SeqCst);

            match next {
                Ok(task) => self.execute_task(task),
                Err(RecvTimeoutError::Timeout) => {
                    live_workers.fetch_sub(1, Ordering::SeqCst);
                    match tasks.try_recv() {
                        Ok(task) => {
                            live_workers.fetch_add(1, Ordering::SeqCst);
                            self.execute_task(task);
                        }
                        Err(_) => {
                            self.metrics.record_thread_expired();
                            return;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        live_workers.fetch_sub(1, Ordering::SeqCst);
    }

    fn execute_task(&self, task: Task) {
        let tid = task.id;

        let result = catch_unwind(AssertUnwindSafe(|| task.execute()));

        if result.is_err() {
            if cfg!(debug_assertions) {
                eprintln!("[parfn] task {:?} panicked in worker {}", tid, self.id);
            }
            self.metrics.record_task_panicked();
        }
        self.metrics.record_task_executed();
    }
}

use super::metrics::{MetricsSnapshot, PoolMetrics};
use super::task::Task;
use super::worker::Worker;
use crate::config::Config;
use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Fixed-capacity worker pool backed by a single shared task queue.
///
/// Capacity (`num_threads`) is fixed at construction; the threads behind
/// it are elastic. Workers start on demand as tasks are submitted, exit
/// after sitting idle past `idle_timeout`, and are replaced by later
/// submissions, up to the capacity. Tasks run in FIFO submission order
/// per worker pickup; there is no work stealing and no priorities.
///
/// `shutdown` closes the queue: workers finish what is already queued
/// and exit, and further submissions are rejected. Dropping the pool
/// shuts it down.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Task>>>,
    receiver: Receiver<Task>,
    num_threads: usize,
    idle_timeout: Duration,
    stack_size: Option<usize>,
    thread_name_prefix: String,
    next_worker_id: AtomicUsize,
    shutdown: Arc<AtomicBool>,
    idle_workers: Arc<AtomicUsize>,
    live_workers: Arc<AtomicUsize>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<PoolMetrics>,
}

impl WorkerPool {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let (sender, receiver) = unbounded();

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            receiver,
            num_threads: config.worker_threads(),
            idle_timeout: config.idle_timeout,
            stack_size: config.stack_size,
            thread_name_prefix: config.thread_name_prefix,
            next_worker_id: AtomicUsize::new(0),
            shutdown: Arc::new(AtomicBool::new(false)),
            idle_workers: Arc::new(AtomicUsize::new(0)),
            live_workers: Arc::new(AtomicUsize::new(0)),
            handles: Mutex::new(Vec::new()),
            metrics: Arc::new(PoolMetrics::new()),
        })
    }

    /// Submit a closure for execution on a pool thread.
    ///
    /// Errors after `shutdown`. A returned `Ok` means the task is queued
    /// and will run; completion is signalled by whatever the closure
    /// itself does (the parallel operations pair this with a latch).
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Task::new(f))
    }

    pub(crate) fn submit(&self, task: Task) -> Result<()> {
        {
            let sender = self.sender.lock();
            let sender = sender
                .as_ref()
                .ok_or_else(|| Error::executor("pool is shut down"))?;
            sender
                .send(task)
                .map_err(|_| Error::executor("pool queue closed"))?;
        }
        self.metrics.record_task_submitted();

        if let Err(spawn_err) = self.ensure_worker() {
            if self.live_workers.load(Ordering::SeqCst) == 0 {
                if cfg!(debug_assertions) {
                    eprintln!(
                        "[parfn] worker spawn failed ({}); draining queue on the submitting thread",
                        spawn_err
                    );
                }
                self.drain_on_caller();
            }
        }
        Ok(())
    }

    // Start a replacement worker when every live one is busy and the
    // capacity allows it. The live count is reserved before spawning.
    fn ensure_worker(&self) -> Result<()> {
        if self.idle_workers.load(Ordering::SeqCst) > 0 {
            return Ok(());
        }

        let mut live = self.live_workers.load(Ordering::SeqCst);
        loop {
            if live >= self.num_threads {
                return Ok(());
            }
            match self.live_workers.compare_exchange(
                live,
                live + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(observed) => live = observed,
            }
        }

        self.spawn_worker()
    }

    fn spawn_worker(&self) -> Result<()> {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        let worker = Worker::new(id, Arc::clone(&self.metrics));
        let tasks = self.receiver.clone();
        let shutdown = Arc::clone(&self.shutdown);
        let idle_workers = Arc::clone(&self.idle_workers);
        let live_workers = Arc::clone(&self.live_workers);
        let idle_timeout = self.idle_timeout;

        let mut builder =
            thread::Builder::new().name(format!("{}-{}", self.thread_name_prefix, id));
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || worker.run(tasks, shutdown, idle_workers, live_workers, idle_timeout))
            .map_err(|e| {
                self.live_workers.fetch_sub(1, Ordering::SeqCst);
                Error::executor(format!("spawn failed: {}", e))
            })?;

        self.metrics.record_thread_spawned();

        let mut handles = self.handles.lock();
        handles.retain(|h| !h.is_finished());
        handles.push(handle);
        Ok(())
    }

    // Last resort when no worker thread could be started: run whatever
    // is queued on the submitting thread so queued tasks are never
    // stranded behind a zero-thread pool.
    fn drain_on_caller(&self) {
        while let Ok(task) = self.receiver.try_recv() {
            let tid = task.id;
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| task.execute()));
            if result.is_err() {
                if cfg!(debug_assertions) {
                    eprintln!("[parfn] task {:?} panicked on the submitting thread", tid);
                }
                self.metrics.record_task_panicked();
            }
            self.metrics.record_task_executed();
        }
    }

    /// Fixed capacity of the pool.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Worker threads currently alive (busy or idle).
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::SeqCst)
    }

    /// Snapshot of the pool counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Close the queue and join all workers. Already-queued tasks are
    /// drained before the workers exit; new submissions are rejected.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        self.sender.lock().take();

        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock();
            guard.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_threads", &self.num_threads)
            .field("live_workers", &self.live_workers.load(Ordering::SeqCst))
            .field("idle_workers", &self.idle_workers.load(Ordering::SeqCst))
            .finish()
    }
}

//! Process-wide worker pool provisioning.
//!
//! The first parallel call creates the shared pool, sized to that
//! call's input; every later call reuses the same pool regardless of
//! input size. `configure` installs a pool with explicit settings
//! before the lazy path runs; `shutdown` drops the shared pool (calls
//! already holding it keep running on their own handle).

use crate::config::Config;
use crate::error::{Error, Result};
use crate::executor::WorkerPool;
use parking_lot::RwLock;
use std::sync::Arc;

static GLOBAL_POOL: RwLock<Option<Arc<WorkerPool>>> = RwLock::new(None);

/// Install the shared pool from an explicit config. Fails with
/// [`Error::AlreadyInitialized`] if the pool already exists.
pub fn configure(config: Config) -> Result<()> {
    let mut slot = GLOBAL_POOL.write();
    if slot.is_some() {
        return Err(Error::AlreadyInitialized);
    }
    *slot = Some(Arc::new(WorkerPool::new(config)?));
    Ok(())
}

/// Get the shared pool, creating it sized to `size` on the first call.
/// First writer wins: concurrent first calls produce exactly one pool.
pub(crate) fn provision(size: usize) -> Result<Arc<WorkerPool>> {
    if let Some(pool) = GLOBAL_POOL.read().as_ref() {
        return Ok(Arc::clone(pool));
    }

    let mut slot = GLOBAL_POOL.write();
    if let Some(pool) = slot.as_ref() {
        return Ok(Arc::clone(pool));
    }

    let threads = sized_thread_count(size, num_cpus::get().max(1));
    let config = Config::builder().num_threads(threads).build()?;
    let pool = Arc::new(WorkerPool::new(config)?);
    *slot = Some(Arc::clone(&pool));
    Ok(pool)
}

// Pool capacity for a first call with `size` elements: the input size
// while it fits the processor count, capped at twice the processors.
fn sized_thread_count(size: usize, processors: usize) -> usize {
    let max_threads = processors * 2;
    if size <= processors {
        size.max(1)
    } else if size > max_threads {
        max_threads
    } else {
        size
    }
}

/// The current shared pool, if one has been created.
pub fn current_pool() -> Option<Arc<WorkerPool>> {
    GLOBAL_POOL.read().clone()
}

/// Drop the shared pool. The next parallel call provisions a fresh one.
pub fn shutdown() {
    GLOBAL_POOL.write().take();
}

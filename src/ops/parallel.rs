//! Order-preserving parallel map, filter and chunked reduce.
//!
//! Each operation materializes the input, fans tasks out over a worker
//! pool, and blocks on a completion barrier until every task has
//! reported. Result ordering never depends on completion order: map and
//! filter write into index-aligned slots, reduce folds its partials in
//! chunk order.
//!
//! The `*_parallel` variants use the process-wide pool (created on
//! first use, sized to the first call); the `*_parallel_with` variants
//! run on a caller-owned pool. Inputs with fewer than two elements are
//! handled on the calling thread and never reach a pool.
//!
//! A panic in the user function fails the call: the first panic is
//! captured, tasks that have not started skip their work, and the call
//! returns [`Error::TaskPanicked`](crate::Error::TaskPanicked) once the
//! barrier opens. Tasks already running are not stopped, so side
//! effects of a non-pure function may still occur after the call has
//! failed.

use crate::error::Result;
use crate::executor::{FailureCell, WorkerPool};
use crate::ops::serial;
use crate::runtime;
use crate::sync::CountdownLatch;
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

/// Apply `transform` to every element in parallel on the shared pool,
/// returning the results in input order.
pub fn map_parallel<C, E, R, F>(items: C, transform: F) -> Result<Vec<R>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    R: Send + 'static,
    F: Fn(E) -> R + Send + Sync + 'static,
{
    let items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(serial::map(items, transform));
    }
    let pool = runtime::provision(items.len())?;
    dispatch_map(&pool, items, transform)
}

/// [`map_parallel`] on a caller-owned pool.
pub fn map_parallel_with<C, E, R, F>(pool: &WorkerPool, items: C, transform: F) -> Result<Vec<R>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    R: Send + 'static,
    F: Fn(E) -> R + Send + Sync + 'static,
{
    let items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(serial::map(items, transform));
    }
    dispatch_map(pool, items, transform)
}

/// Keep the elements for which `keep` returns true, evaluating the
/// predicate in parallel on the shared pool. Order is preserved.
pub fn filter_parallel<C, E, F>(items: C, keep: F) -> Result<Vec<E>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    let items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(serial::filter(items, keep));
    }
    let pool = runtime::provision(items.len())?;
    dispatch_filter(&pool, items, keep)
}

/// [`filter_parallel`] on a caller-owned pool.
pub fn filter_parallel_with<C, E, F>(pool: &WorkerPool, items: C, keep: F) -> Result<Vec<E>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    let items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(serial::filter(items, keep));
    }
    dispatch_filter(pool, items, keep)
}

/// Merge all elements into one value, reducing contiguous chunks in
/// parallel on the shared pool and then folding the per-chunk partials
/// in chunk order. Empty input yields `Ok(None)`.
///
/// The grouping differs from the serial left fold (chunked tree rather
/// than a linear chain), so the result matches [`serial::reduce`] only
/// when `merge` is associative. That is the caller's obligation; the
/// operation does not check it.
pub fn reduce_parallel<C, E, F>(items: C, merge: F) -> Result<Option<E>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    F: Fn(E, E) -> E + Send + Sync + 'static,
{
    let mut items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(items.pop());
    }
    let pool = runtime::provision(items.len())?;
    dispatch_reduce(&pool, items, merge)
}

/// [`reduce_parallel`] on a caller-owned pool.
pub fn reduce_parallel_with<C, E, F>(pool: &WorkerPool, items: C, merge: F) -> Result<Option<E>>
where
    C: IntoIterator<Item = E>,
    E: Send + 'static,
    F: Fn(E, E) -> E + Send + Sync + 'static,
{
    let mut items: Vec<E> = items.into_iter().collect();
    if items.len() < 2 {
        return Ok(items.pop());
    }
    dispatch_reduce(pool, items, merge)
}

// Opens the latch exactly once per fan-out task, whether the task ran,
// was skipped, or was dropped unexecuted. A drop before `finished` is
// set marks the call cancelled so the caller sees an error instead of
// a partially written result.
struct TaskGuard {
    failure: Arc<FailureCell>,
    latch: Arc<CountdownLatch>,
    finished: bool,
}

impl TaskGuard {
    fn new(failure: Arc<FailureCell>, latch: Arc<CountdownLatch>) -> Self {
        Self {
            failure,
            latch,
            finished: false,
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if !self.finished {
            self.failure.cancel();
        }
        self.latch.count_down();
    }
}

fn dispatch_map<E, R, F>(pool: &WorkerPool, items: Vec<E>, transform: F) -> Result<Vec<R>>
where
    E: Send + 'static,
    R: Send + 'static,
    F: Fn(E) -> R + Send + Sync + 'static,
{
    let len = items.len();
    let slots: Arc<Vec<Mutex<Option<R>>>> = Arc::new((0..len).map(|_| Mutex::new(None)).collect());
    let latch = Arc::new(CountdownLatch::new(len));
    let failure = Arc::new(FailureCell::new());
    let transform = Arc::new(transform);

    for (index, item) in items.into_iter().enumerate() {
        let slots = Arc::clone(&slots);
        let transform = Arc::clone(&transform);
        let guard = TaskGuard::new(Arc::clone(&failure), Arc::clone(&latch));

        let submitted = pool.execute(move || {
            let mut guard = guard;
            if !guard.failure.is_cancelled() {
                if let Some(value) = guard.failure.run(|| transform(item)) {
                    *slots[index].lock() = Some(value);
                }
            }
            // release the slot handle before the latch opens
            drop(slots);
            guard.finished = true;
        });

        if let Err(err) = submitted {
            for _ in (index + 1)..len {
                latch.count_down();
            }
            latch.wait();
            return Err(err);
        }
    }

    latch.wait();
    failure.check()?;

    let slots = unwrap_owned(slots);
    let mut result = Vec::with_capacity(len);
    for slot in slots {
        match slot.into_inner() {
            Some(value) => result.push(value),
            None => {
                return Err(crate::error::Error::executor(
                    "result slot left unwritten",
                ))
            }
        }
    }
    Ok(result)
}

fn dispatch_filter<E, F>(pool: &WorkerPool, items: Vec<E>, keep: F) -> Result<Vec<E>>
where
    E: Send + 'static,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    let len = items.len();
    let slots: Arc<Vec<Mutex<Option<E>>>> = Arc::new((0..len).map(|_| Mutex::new(None)).collect());
    let latch = Arc::new(CountdownLatch::new(len));
    let failure = Arc::new(FailureCell::new());
    let keep = Arc::new(keep);

    for (index, item) in items.into_iter().enumerate() {
        let slots = Arc::clone(&slots);
        let keep = Arc::clone(&keep);
        let guard = TaskGuard::new(Arc::clone(&failure), Arc::clone(&latch));

        let submitted = pool.execute(move || {
            let mut guard = guard;
            if !guard.failure.is_cancelled() {
                if let Some(true) = guard.failure.run(|| keep(&item)) {
                    *slots[index].lock() = Some(item);
                }
            }
            drop(slots);
            guard.finished = true;
        });

        if let Err(err) = submitted {
            for _ in (index + 1)..len {
                latch.count_down();
            }
            latch.wait();
            return Err(err);
        }
    }

    latch.wait();
    failure.check()?;

    // compaction: drop the absent slots, keeping relative order
    let slots = unwrap_owned(slots);
    Ok(slots
        .into_iter()
        .filter_map(|slot| slot.into_inner())
        .collect())
}

fn dispatch_reduce<E, F>(pool: &WorkerPool, items: Vec<E>, merge: F) -> Result<Option<E>>
where
    E: Send + 'static,
    F: Fn(E, E) -> E + Send + Sync + 'static,
{
    let len = items.len();
    let splits = pool.num_threads().min(len).max(1);
    let lengths = chunk_lengths(len, splits);

    let latch = Arc::new(CountdownLatch::new(splits));
    let failure = Arc::new(FailureCell::new());
    let partials: Arc<Mutex<Vec<(usize, E)>>> = Arc::new(Mutex::new(Vec::with_capacity(splits)));
    let merge = Arc::new(merge);

    let mut items = items.into_iter();
    for (chunk_index, chunk_len) in lengths.into_iter().enumerate() {
        let chunk: Vec<E> = items.by_ref().take(chunk_len).collect();
        let partials = Arc::clone(&partials);
        let merge = Arc::clone(&merge);
        let guard = TaskGuard::new(Arc::clone(&failure), Arc::clone(&latch));

        let submitted = pool.execute(move || {
            let mut guard = guard;
            if !guard.failure.is_cancelled() {
                let reduced = guard.failure.run(|| serial::reduce(chunk, |a, b| merge(a, b)));
                if let Some(Some(partial)) = reduced {
                    partials.lock().push((chunk_index, partial));
                }
            }
            drop(partials);
            guard.finished = true;
        });

        if let Err(err) = submitted {
            for _ in (chunk_index + 1)..splits {
                latch.count_down();
            }
            latch.wait();
            return Err(err);
        }
    }

    latch.wait();
    failure.check()?;

    let mut partials = unwrap_owned(partials).into_inner();
    partials.sort_by_key(|entry| entry.0);
    Ok(serial::reduce(
        partials.into_iter().map(|(_, partial)| partial),
        |a, b| merge(a, b),
    ))
}

// Chunk lengths for splitting `len` elements into `splits` contiguous
// chunks: every chunk gets len / splits elements and the last one also
// absorbs the len % splits remainder.
pub(crate) fn chunk_lengths(len: usize, splits: usize) -> Vec<usize> {
    let per_chunk = len / splits;
    let remainder = len % splits;
    let mut lengths = vec![per_chunk; splits];
    if let Some(last) = lengths.last_mut() {
        *last += remainder;
    }
    lengths
}

// Every task drops its clone before opening the latch, so by the time
// the caller gets here the count is normally already one. The yield
// loop covers a task dropped unexecuted mid-teardown.
fn unwrap_owned<T>(mut shared: Arc<T>) -> T {
    loop {
        match Arc::try_unwrap(shared) {
            Ok(owned) => return owned,
            Err(still_shared) => {
                shared = still_shared;
                thread::yield_now();
            }
        }
    }
}

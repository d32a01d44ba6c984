//! Task execution infrastructure.
//!
//! This module provides the worker pool and its supporting pieces:
//! the shared task queue, worker thread loop, panic capture, and pool
//! counters.

pub mod metrics;
pub mod pool;
pub mod task;
pub mod worker;

pub(crate) mod panic_handler;

pub use metrics::{MetricsSnapshot, PoolMetrics};
pub use pool::WorkerPool;

pub(crate) use panic_handler::FailureCell;

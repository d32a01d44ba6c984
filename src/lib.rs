//! parfn - higher-order map, filter and reduce with order-preserving
//! parallel execution over a bounded worker pool.
//!
//! Every operation comes in three flavors: a single-threaded reference
//! implementation ([`map`], [`filter`], [`reduce`]), a parallel variant
//! on a process-wide pool created on first use ([`map_parallel`],
//! [`filter_parallel`], [`reduce_parallel`]), and a parallel variant on
//! a caller-owned [`WorkerPool`] (`*_parallel_with`). Parallel results
//! are always in input order: tasks write into index-aligned slots, and
//! the chunked reduction folds its partials in chunk order.
//!
//! # Quick Start
//!
//! ```
//! use parfn::prelude::*;
//!
//! let doubled = map_parallel(1..=5, |x: i32| x * 2)?;
//! assert_eq!(doubled, vec![2, 4, 6, 8, 10]);
//!
//! let odds = filter_parallel(1..=10, |x: &i32| x % 2 != 0)?;
//! assert_eq!(odds, vec![1, 3, 5, 7, 9]);
//!
//! let sum = reduce_parallel(1..=100, |a: i32, b| a + b)?;
//! assert_eq!(sum, Some(5050));
//! # Ok::<(), parfn::Error>(())
//! ```
//!
//! # Notes
//!
//! - `reduce_parallel` matches the serial left fold only for an
//!   associative merge; that is the caller's obligation.
//! - A panicking user function fails the whole call with
//!   [`Error::TaskPanicked`]; tasks already running are not stopped.
//! - Calling a parallel operation from inside a task function running
//!   on the same pool can exhaust the pool's threads and deadlock.

#![warn(missing_docs, missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod ops;
pub mod prelude;
pub mod runtime;
pub mod sync;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use executor::{MetricsSnapshot, WorkerPool};
pub use ops::{
    filter, filter_parallel, filter_parallel_with, map, map_parallel, map_parallel_with, reduce,
    reduce_parallel, reduce_parallel_with,
};
pub use runtime::{configure, current_pool, shutdown};

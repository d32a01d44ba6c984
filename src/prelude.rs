//! Convenience re-exports.

pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{MetricsSnapshot, WorkerPool};
pub use crate::ops::{
    filter, filter_parallel, filter_parallel_with, map, map_parallel, map_parallel_with, reduce,
    reduce_parallel, reduce_parallel_with,
};
pub use crate::runtime::{configure, current_pool, shutdown};

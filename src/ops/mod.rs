//! Higher-order operations over ordered collections.

pub mod parallel;
pub mod serial;

pub use parallel::{
    filter_parallel, filter_parallel_with, map_parallel, map_parallel_with, reduce_parallel,
    reduce_parallel_with,
};
pub use serial::{filter, map, reduce};

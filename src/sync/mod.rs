//! Synchronization primitives.

pub mod latch;

pub use latch::CountdownLatch;

//! Shared-memory parallel building blocks: the round barrier, row partitioning,
//! row-disjoint shared buffers and (with the `rayon` feature) a fork-join pool.

pub mod barrier;
pub mod partition;
pub mod shared;

pub use barrier::{AbortOnPanic, BarrierWaitResult, SenseBarrier};
pub use partition::{RowAssignment, RowPartitioner, WorkQueue, block_cyclic_ranges, block_range};
pub use shared::SharedSlice;

#[cfg(feature = "rayon")]
pub mod rayon_comm;
#[cfg(feature = "rayon")]
pub use rayon_comm::RayonComm;

/// Hardware threads available to a run.
#[cfg(feature = "rayon")]
pub fn available_threads() -> usize {
    num_cpus::get()
}

/// Hardware threads available to a run.
#[cfg(not(feature = "rayon"))]
pub fn available_threads() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

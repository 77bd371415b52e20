use thiserror::Error;

use crate::config::options::MappingStrategy;

// Unified error type for itmv

#[derive(Error, Debug)]
pub enum ItmvError {
    #[error("thread count {count} is not in 1..={max}")]
    InvalidThreadCount { count: usize, max: usize },
    #[error("invalid matrix dimension {0}")]
    InvalidDimension(usize),
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("block size must be positive for {0} mapping")]
    InvalidBlockSize(MappingStrategy),
    #[error("unknown mapping strategy: {0}")]
    UnknownMapping(String),
    #[error("failed space allocation for {what} ({len} elements)")]
    Allocation { what: &'static str, len: usize },
    #[error("thread pool error: {0}")]
    ThreadPool(String),
    #[error("worker thread {0} panicked")]
    WorkerPanicked(usize),
    #[error("barrier needs at least one participating thread")]
    EmptyBarrier,
    #[error("barrier destroyed with {waiting} thread(s) still inside wait()")]
    BarrierInUse { waiting: usize },
    #[error("barrier broken: a participating thread died")]
    BarrierBroken,
}

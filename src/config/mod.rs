//! Run configuration: thread count, row mapping and block size.

pub mod options;
pub use options::{MappingStrategy, RunOptions, ERROR_THRESHOLD, THREAD_COUNT_MAX};

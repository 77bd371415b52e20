//! Core traits shared by the matrix types and the iteration engines.

pub mod traits;
pub use traits::{Indexing, RowCompute};

//! itmv: barrier-synchronized parallel iterative matrix-vector multiplication
//!
//! This crate runs the Jacobi-style fixed-point iteration `y = d + A·x; x ← y` over a
//! dense (or upper-triangular) matrix on a fixed set of worker threads. Rows are
//! mapped to threads by contiguous block, block-cyclic, dynamic or guided
//! scheduling, and the rounds are separated by a reusable sense-reversal barrier.

pub mod parallel;

pub mod config;
pub mod context;
pub mod core;
pub mod error;
pub mod matrix;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use context::*;
pub use core::*;
pub use error::*;
pub use matrix::*;
pub use parallel::{BarrierWaitResult, RowAssignment, RowPartitioner, SenseBarrier, WorkQueue};
pub use solver::*;

// Re-export the convergence types at the crate root for convenience
pub use utils::convergence::{Convergence, SolveStats};

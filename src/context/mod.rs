//! Context module for itmv.
//!
//! This module provides the context type that holds the problem state of a run:
//! the iteration matrix, the vectors `d`, `x`, `y`, and the stopping criteria.
//! Solvers borrow the context mutably for one run and leave the result in `y`.
//!
//! Modules:
//! - [`itmv_context`]: Contains the `ItmvContext` struct and the fixed-point test systems.
//!
//! # Example
//! ```rust,ignore
//! use itmv::{ItmvContext, MatrixKind, RunOptions, ThreadedSolver};
//! let mut ctx = ItmvContext::<f64>::fixed_point(512, MatrixKind::Dense, 4096)?;
//! let stats = ctx.solve_context(&mut ThreadedSolver::new(RunOptions::default()))?;
//! ```

pub mod itmv_context;
pub use itmv_context::ItmvContext;

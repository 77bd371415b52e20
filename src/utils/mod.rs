//! Small utilities shared by the solvers.

pub mod convergence;

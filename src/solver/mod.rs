//! Jacobi iteration engines.
//!
//! Every engine runs the same loop on an [`ItmvContext`]:
//!
//! ```text
//! for k in 1..=t
//!     y = d + A x
//!     if max_i |x[i] - y[i]| < tol: stop
//!     x = y
//! ```
//!
//! so on convergence `y` holds the last sweep and `x` the one before it, and on
//! budget exhaustion `x == y`.

use crate::context::ItmvContext;
use crate::error::ItmvError;
use crate::utils::convergence::SolveStats;

/// Common interface for the sequential and parallel engines.
pub trait ItmvSolver<T> {
    /// Run the iteration on `ctx`, writing the result into `ctx.y`.
    /// Returns iteration stats (including convergence info).
    fn solve(&mut self, ctx: &mut ItmvContext<T>) -> Result<SolveStats<T>, ItmvError>;
}

pub mod sequential;
pub use sequential::{SequentialSolver, itmv_mult_seq};

pub mod threaded;
pub use threaded::{ThreadedSolver, parallel_itmv_mult};

#[cfg(feature = "rayon")]
pub mod rayon_itmv;
#[cfg(feature = "rayon")]
pub use rayon_itmv::{RayonSolver, rayon_itmv_mult};

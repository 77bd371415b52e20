//! Problem state for the iterative matrix-vector multiplication `y = d + A x; x ← y`.
//!
//! `ItmvContext` owns the matrix, the constant term `d`, the current iterate `x`,
//! the fresh iterate `y` and the stopping criteria. It replaces process-wide
//! buffers: the engines borrow it for one run, hand read-only views of `A` and
//! `d` to every worker, and give them row-disjoint write access to `x` and `y`.
//!
//! # Usage
//!
//! 1. Build a context with [`ItmvContext::new`] (or [`ItmvContext::fixed_point`] for
//!    the standard test system).
//! 2. Call `solve_context` with a sequential, threaded or rayon solver.
//! 3. Read the result from `y`.

use std::fmt;

use log::debug;
use num_traits::Float;

use crate::config::options::ERROR_THRESHOLD;
use crate::error::ItmvError;
use crate::matrix::dense::{ItmvMatrix, MatrixKind};
use crate::solver::ItmvSolver;
use crate::utils::convergence::{Convergence, SolveStats};

/// Allocate `len` copies of `value`, reporting failure instead of aborting.
pub(crate) fn try_alloc<T: Clone>(
    what: &'static str,
    len: usize,
    value: T,
) -> Result<Vec<T>, ItmvError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ItmvError::Allocation { what, len })?;
    v.resize(len, value);
    Ok(v)
}

fn cast<T: Float>(v: f64) -> T {
    num_traits::cast(v).unwrap_or_else(T::nan)
}

/// Matrix, vectors and stopping criteria of one Jacobi run.
#[derive(Clone)]
pub struct ItmvContext<T> {
    /// Iteration matrix (dense or upper-triangular)
    pub a: ItmvMatrix<T>,
    /// Constant term
    pub d: Vec<T>,
    /// Current iterate
    pub x: Vec<T>,
    /// Fresh iterate; holds the result after a run
    pub y: Vec<T>,
    /// Tolerance on `max_i |x[i] - y[i]|` and sweep budget
    pub conv: Convergence<T>,
}

impl<T: Float + fmt::Debug> fmt::Debug for ItmvContext<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItmvContext")
            .field("n", &self.dim())
            .field("kind", &self.a.kind())
            .field("conv", &self.conv)
            .finish_non_exhaustive()
    }
}

impl<T: Float> ItmvContext<T> {
    /// Build a context from `A`, `d` and the starting iterate `x0`.
    pub fn new(
        a: ItmvMatrix<T>,
        d: Vec<T>,
        x0: Vec<T>,
        conv: Convergence<T>,
    ) -> Result<Self, ItmvError> {
        let n = a.dim();
        let y = try_alloc("vector y", n, T::zero())?;
        let ctx = Self { a, d, x: x0, y, conv };
        ctx.validate()?;
        Ok(ctx)
    }

    /// The standard test system: zero diagonal, `-1/n` off the diagonal (above it
    /// only for the upper-triangular kind), `x = 0`, and `d` chosen so that the
    /// all-ones vector is the fixed point.
    pub fn fixed_point(n: usize, kind: MatrixKind, max_iters: usize) -> Result<Self, ItmvError> {
        if n == 0 {
            return Err(ItmvError::InvalidDimension(n));
        }
        let len = n.checked_mul(n).ok_or(ItmvError::InvalidDimension(n))?;
        let nf = n as f64;
        let off = -1.0 / nf;
        let mut data = try_alloc("matrix A", len, T::zero())?;
        for i in 0..n {
            let start = match kind {
                MatrixKind::Dense => 0,
                MatrixKind::UpperTriangular => i + 1,
            };
            for j in start..n {
                if i != j {
                    data[i * n + j] = cast(off);
                }
            }
        }
        let mut d = try_alloc("vector d", n, T::zero())?;
        for (i, di) in d.iter_mut().enumerate() {
            *di = match kind {
                MatrixKind::Dense => cast((2.0 * nf - 1.0) / nf),
                MatrixKind::UpperTriangular => cast((2.0 * nf - 1.0 * i as f64 - 1.0) / nf),
            };
        }
        let x = try_alloc("vector x", n, T::zero())?;
        let a = ItmvMatrix::from_row_major(n, &data, kind)?;
        debug!("built {kind:?} fixed-point system, n={n}, t={max_iters}");
        Self::new(a, d, x, Convergence::new(cast(ERROR_THRESHOLD), max_iters))
    }

    pub fn dim(&self) -> usize {
        self.a.dim()
    }

    /// Check that `d`, `x` and `y` all match the matrix dimension.
    pub fn validate(&self) -> Result<(), ItmvError> {
        let n = self.dim();
        if n == 0 {
            return Err(ItmvError::InvalidDimension(n));
        }
        for (what, len) in [
            ("vector d", self.d.len()),
            ("vector x", self.x.len()),
            ("vector y", self.y.len()),
        ] {
            if len != n {
                return Err(ItmvError::DimensionMismatch { what, expected: n, found: len });
            }
        }
        Ok(())
    }

    /// Solve with the given engine, updating `x` and `y` in place.
    pub fn solve_context<S: ItmvSolver<T> + ?Sized>(
        &mut self,
        solver: &mut S,
    ) -> Result<SolveStats<T>, ItmvError> {
        solver.solve(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_point_dense_layout() {
        let ctx = ItmvContext::<f64>::fixed_point(4, MatrixKind::Dense, 3).unwrap();
        assert_eq!(ctx.dim(), 4);
        assert_eq!(ctx.a.get(0, 0), 0.0);
        assert_eq!(ctx.a.get(2, 1), -0.25);
        assert!(ctx.d.iter().all(|&v| v == 7.0 / 4.0));
        assert!(ctx.x.iter().all(|&v| v == 0.0));
        assert_eq!(ctx.conv.max_iters, 3);
        assert_eq!(ctx.conv.tol, ERROR_THRESHOLD);
    }

    #[test]
    fn fixed_point_upper_layout() {
        let ctx = ItmvContext::<f64>::fixed_point(4, MatrixKind::UpperTriangular, 1).unwrap();
        assert_eq!(ctx.a.get(2, 1), 0.0);
        assert_eq!(ctx.a.get(1, 2), -0.25);
        assert_eq!(ctx.d, vec![7.0 / 4.0, 6.0 / 4.0, 5.0 / 4.0, 4.0 / 4.0]);
        // all-ones is the fixed point: 1 = d[i] - (n-1-i)/n
        for i in 0..4 {
            let row: f64 = (0..4).map(|j| ctx.a.get(i, j)).sum();
            assert_eq!(ctx.d[i] + row, 1.0);
        }
    }

    #[test]
    fn mismatched_vectors_are_rejected() {
        let a = ItmvMatrix::from_row_major(2, &[0.0, 1.0, 1.0, 0.0], MatrixKind::Dense).unwrap();
        let err = ItmvContext::new(a, vec![1.0; 3], vec![0.0; 2], Convergence::new(1e-6, 10))
            .unwrap_err();
        assert!(matches!(
            err,
            ItmvError::DimensionMismatch { what: "vector d", expected: 2, found: 3 }
        ));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            ItmvContext::<f64>::fixed_point(0, MatrixKind::Dense, 1),
            Err(ItmvError::InvalidDimension(0))
        ));
    }

    #[test]
    fn huge_allocation_reports_failure() {
        assert!(matches!(
            try_alloc("vector y", usize::MAX / 2, 0.0f64),
            Err(ItmvError::Allocation { what: "vector y", .. })
        ));
    }
}

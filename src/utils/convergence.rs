//! Convergence tracking & tolerance checks for the Jacobi iteration.

use num_traits::Float;

/// Stopping criteria: `max_i |x[i] - y[i]| < tol`, at most `max_iters` sweeps.
#[derive(Clone, Copy, Debug)]
pub struct Convergence<T> {
    pub tol: T,
    pub max_iters: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveStats<T> {
    /// Sweeps performed
    pub iterations: usize,
    /// `max_i |x[i] - y[i]|` of the last sweep
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Float> SolveStats<T> {
    /// Stats of a run that performed no sweep.
    pub fn empty() -> Self {
        Self { iterations: 0, final_residual: T::infinity(), converged: false }
    }
}

impl<T: Copy + Float> Convergence<T> {
    pub fn new(tol: T, max_iters: usize) -> Self {
        Self { tol, max_iters }
    }

    /// Whether a sweep whose largest update was `max_delta` has converged.
    #[inline]
    pub fn is_converged(&self, max_delta: T) -> bool {
        max_delta < self.tol
    }

    /// Returns (should_stop, stats) given the largest update `max_delta` of sweep `i` (1-based).
    pub fn check(&self, max_delta: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = self.is_converged(max_delta);
        (
            converged || i >= self.max_iters,
            SolveStats {
                iterations: i,
                final_residual: max_delta,
                converged,
            },
        )
    }
}

/// Supremum norm of `x - y`.
pub fn max_abs_diff<T: Float>(x: &[T], y: &[T]) -> T {
    debug_assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .fold(T::zero(), |m, (&xi, &yi)| m.max((xi - yi).abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_on_tolerance_or_budget() {
        let conv = Convergence::new(1e-3, 5);
        let (stop, stats) = conv.check(5e-4, 2);
        assert!(stop && stats.converged);
        let (stop, stats) = conv.check(1e-3, 2);
        assert!(!stop && !stats.converged, "threshold itself is not converged");
        let (stop, stats) = conv.check(0.5, 5);
        assert!(stop && !stats.converged);
        assert_eq!(stats.iterations, 5);
    }

    #[test]
    fn sup_norm() {
        assert_eq!(max_abs_diff(&[1.0, -2.0, 3.0], &[1.5, 2.0, 3.0]), 4.0);
        assert_eq!(max_abs_diff::<f64>(&[], &[]), 0.0);
    }
}

//! Single-threaded reference iteration, used as the correctness oracle.

use num_traits::Float;

use crate::context::ItmvContext;
use crate::core::traits::RowCompute;
use crate::error::ItmvError;
use crate::solver::ItmvSolver;
use crate::utils::convergence::{SolveStats, max_abs_diff};

/// Run the Jacobi loop row-major, one full sweep per iteration.
pub fn itmv_mult_seq<T: Float>(ctx: &mut ItmvContext<T>) -> Result<SolveStats<T>, ItmvError> {
    ctx.validate()?;
    let ItmvContext { a, d, x, y, conv } = ctx;
    let mut stats = SolveStats::empty();
    for k in 1..=conv.max_iters {
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = a.row_value(i, d[i], x);
        }
        let (_, s) = conv.check(max_abs_diff(x, y), k);
        stats = s;
        if stats.converged {
            break;
        }
        x.copy_from_slice(y);
    }
    Ok(stats)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialSolver;

impl SequentialSolver {
    pub fn new() -> Self {
        Self
    }
}

impl<T: Float> ItmvSolver<T> for SequentialSolver {
    fn solve(&mut self, ctx: &mut ItmvContext<T>) -> Result<SolveStats<T>, ItmvError> {
        itmv_mult_seq(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::dense::{ItmvMatrix, MatrixKind};
    use crate::utils::convergence::Convergence;

    #[test]
    fn two_sweeps_by_hand() {
        // A = [[0, 0.5], [0.25, 0]], d = [1, 2], x0 = 0
        let a = ItmvMatrix::from_row_major(2, &[0.0, 0.5, 0.25, 0.0], MatrixKind::Dense).unwrap();
        let mut ctx =
            ItmvContext::new(a, vec![1.0, 2.0], vec![0.0; 2], Convergence::new(1e-9, 2)).unwrap();
        let stats = SequentialSolver::new().solve(&mut ctx).unwrap();
        // sweep 1: y = [1, 2]; sweep 2: y = [1 + 1, 2 + 0.25]
        assert_eq!(ctx.y, vec![2.0, 2.25]);
        assert_eq!(ctx.x, ctx.y);
        assert_eq!(stats.iterations, 2);
        assert!(!stats.converged);
        assert_eq!(stats.final_residual, 1.0);
    }

    #[test]
    fn stops_before_updating_x() {
        // A = 0: y = d after one sweep, converged on the second
        let a = ItmvMatrix::from_row_major(2, &[0.0; 4], MatrixKind::Dense).unwrap();
        let mut ctx =
            ItmvContext::new(a, vec![3.0, 4.0], vec![0.0; 2], Convergence::new(1e-6, 10)).unwrap();
        let stats = itmv_mult_seq(&mut ctx).unwrap();
        assert!(stats.converged);
        assert_eq!(stats.iterations, 2);
        assert_eq!(stats.final_residual, 0.0);
        assert_eq!(ctx.y, vec![3.0, 4.0]);
    }

    #[test]
    fn zero_budget_is_a_no_op() {
        let mut ctx = ItmvContext::<f64>::fixed_point(8, MatrixKind::Dense, 0).unwrap();
        let stats = itmv_mult_seq(&mut ctx).unwrap();
        assert_eq!(stats.iterations, 0);
        assert!(ctx.y.iter().all(|&v| v == 0.0));
    }
}

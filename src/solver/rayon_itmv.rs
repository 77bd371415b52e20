//! Fork-join Jacobi iteration on a dedicated rayon pool.
//!
//! Each sweep is a parallel loop over rows, followed by a parallel max-reduction
//! for the convergence test and a parallel copy `x ← y`. The join at the end of
//! every parallel loop plays the role of the barrier. The mapping strategy only
//! changes how rayon splits the rows, never the arithmetic, so results match the
//! sequential oracle bit for bit.

use std::fmt;

use log::{debug, trace};
use num_traits::Float;

use crate::config::options::RunOptions;
use crate::context::ItmvContext;
use crate::error::ItmvError;
use crate::parallel::RayonComm;
use crate::solver::ItmvSolver;
use crate::utils::convergence::SolveStats;

/// Run the Jacobi loop with rayon, `opts.thread_count` threads.
pub fn rayon_itmv_mult<T>(
    ctx: &mut ItmvContext<T>,
    opts: &RunOptions,
) -> Result<SolveStats<T>, ItmvError>
where
    T: Float + Send + Sync + fmt::Debug,
{
    ctx.validate()?;
    let comm = RayonComm::new(opts)?;
    debug!(
        "itmv rayon start: n={}, threads={}, mapping={}",
        ctx.dim(),
        comm.size(),
        opts.mapping
    );
    let ItmvContext { a, d, x, y, conv } = ctx;
    let conv = *conv;
    let stats = comm.install(|| {
        let mut stats = SolveStats::empty();
        for k in 1..=conv.max_iters {
            comm.sweep(&*a, d, x, y);
            let max_delta = comm.max_abs_diff(x, y);
            trace!("round {k}: max |x - y| = {max_delta:?}");
            let (_, s) = conv.check(max_delta, k);
            stats = s;
            if stats.converged {
                break;
            }
            comm.copy(y, x);
        }
        stats
    });
    debug!("itmv rayon done: {} sweeps, converged={}", stats.iterations, stats.converged);
    Ok(stats)
}

/// [`ItmvSolver`] front end for [`rayon_itmv_mult`].
#[derive(Debug, Clone, Copy)]
pub struct RayonSolver {
    pub opts: RunOptions,
}

impl RayonSolver {
    pub fn new(opts: RunOptions) -> Self {
        Self { opts }
    }
}

impl<T: Float + Send + Sync + fmt::Debug> ItmvSolver<T> for RayonSolver {
    fn solve(&mut self, ctx: &mut ItmvContext<T>) -> Result<SolveStats<T>, ItmvError> {
        rayon_itmv_mult(ctx, &self.opts)
    }
}

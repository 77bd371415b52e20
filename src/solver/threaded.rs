//! Barrier-synchronized SPMD Jacobi iteration on a fixed set of OS threads.
//!
//! Every worker runs the same state machine for at most `t` rounds:
//!
//! 1. compute `y[i]` for every row it owns (or claims), tracking its local
//!    `max |x[i] - y[i]|`, and publish that maximum in its own slot;
//! 2. barrier; every worker evaluates the identical predicate
//!    `max(slots) < tol` over the published slots. The round leader resets the
//!    work queue for claimed mappings;
//! 3. on convergence, stop without touching `x`; otherwise copy its own rows
//!    `y → x`;
//! 4. barrier, so no worker reads `x` for the next round before every owner has
//!    finished writing it.
//!
//! Row ownership comes from the [`RowPartitioner`], called once per worker before
//! the first round.
//!
//! A worker that panics breaks the barrier on its way out. The survivors return
//! `BarrierBroken`, and the run reports `WorkerPanicked` with the dead rank.

use std::fmt;
use std::ops::Range;
use std::thread;

use log::{debug, trace};
use num_traits::Float;

use crate::config::options::RunOptions;
use crate::context::ItmvContext;
use crate::context::itmv_context::try_alloc;
use crate::core::traits::RowCompute;
use crate::error::ItmvError;
use crate::matrix::dense::ItmvMatrix;
use crate::parallel::{RowAssignment, RowPartitioner, SenseBarrier, SharedSlice, WorkQueue};
use crate::solver::ItmvSolver;
use crate::utils::convergence::{Convergence, SolveStats};

/// Everything a worker needs, shared by reference across the scope.
struct Worker<'a, T> {
    a: &'a ItmvMatrix<T>,
    d: &'a [T],
    x: SharedSlice<'a, T>,
    y: SharedSlice<'a, T>,
    /// Per-rank local maximum of `|x[i] - y[i]|` for the current round
    slots: SharedSlice<'a, T>,
    barrier: &'a SenseBarrier,
    queue: &'a WorkQueue,
    conv: Convergence<T>,
}

impl<T: Float + Send + Sync + fmt::Debug> Worker<'_, T> {
    fn run(&self, rank: usize, assignment: RowAssignment) -> Result<SolveStats<T>, ItmvError> {
        let _guard = self.barrier.abort_on_panic();
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut stats = SolveStats::empty();

        for k in 1..=self.conv.max_iters {
            let local = match &assignment {
                RowAssignment::Static(ranges) => {
                    let mut local = T::zero();
                    for r in ranges {
                        local = local.max(self.compute(r.clone()));
                    }
                    local
                }
                RowAssignment::Claimed => {
                    claimed.clear();
                    let mut local = T::zero();
                    while let Some(r) = self.queue.claim() {
                        local = local.max(self.compute(r.clone()));
                        claimed.push(r);
                    }
                    local
                }
            };
            // SAFETY: slot `rank` is written only by this worker, and nobody
            // reads the slots until the barrier below.
            unsafe { self.slots.write(rank, local) };

            let wait = self.barrier.wait()?;

            // SAFETY: slots are not written again before the next barrier.
            let slots = unsafe { self.slots.as_slice() };
            let max_delta = slots.iter().fold(T::zero(), |m, &v| m.max(v));
            let (_, s) = self.conv.check(max_delta, k);
            stats = s;
            if wait.is_leader() {
                trace!("round {k}: max |x - y| = {max_delta:?}, leader rank {rank}");
                self.queue.reset();
            }
            if stats.converged {
                break;
            }

            let owned = match &assignment {
                RowAssignment::Static(ranges) => ranges.as_slice(),
                RowAssignment::Claimed => claimed.as_slice(),
            };
            for r in owned {
                for i in r.clone() {
                    // SAFETY: row `i` is owned by this worker for this round; no
                    // other worker reads or writes x[i] or y[i] until the barrier.
                    unsafe { self.x.write(i, self.y.read(i)) };
                }
            }

            self.barrier.wait()?;
        }
        Ok(stats)
    }

    /// Compute phase for one range of rows; returns the range's largest update.
    fn compute(&self, rows: Range<usize>) -> T {
        // SAFETY: x is only written in the update phase, which is separated
        // from every compute phase by a barrier.
        let x = unsafe { self.x.as_slice() };
        let mut local = T::zero();
        for i in rows {
            let yi = self.a.row_value(i, self.d[i], x);
            local = local.max((x[i] - yi).abs());
            // SAFETY: row `i` belongs to this worker for the current round.
            unsafe { self.y.write(i, yi) };
        }
        local
    }
}

/// Run the barrier-synchronized Jacobi iteration on `opts.thread_count` threads.
///
/// Returns after every worker has joined. `ctx.y` holds the last sweep; `ctx.x`
/// holds the previous sweep on convergence and equals `ctx.y` otherwise.
pub fn parallel_itmv_mult<T>(
    ctx: &mut ItmvContext<T>,
    opts: &RunOptions,
) -> Result<SolveStats<T>, ItmvError>
where
    T: Float + Send + Sync + fmt::Debug,
{
    opts.validate()?;
    ctx.validate()?;
    let n = ctx.dim();
    let threads = opts.thread_count;
    let partitioner = RowPartitioner::new(n, opts);
    let queue = partitioner.work_queue();
    let barrier = SenseBarrier::new(threads)?;
    let mut slots = try_alloc("convergence slots", threads, T::zero())?;

    debug!(
        "itmv start: n={n}, kind={:?}, threads={threads}, mapping={}, block_size={}, t={}",
        ctx.a.kind(),
        opts.mapping,
        opts.block_size,
        ctx.conv.max_iters
    );

    let ItmvContext { a, d, x, y, conv } = ctx;
    let worker = Worker {
        a: &*a,
        d: d.as_slice(),
        x: SharedSlice::new(x.as_mut_slice()),
        y: SharedSlice::new(y.as_mut_slice()),
        slots: SharedSlice::new(slots.as_mut_slice()),
        barrier: &barrier,
        queue: &queue,
        conv: *conv,
    };

    let stats = run_team(&worker, &partitioner, threads);
    drop(worker);
    let stats = stats?;
    barrier.destroy()?;
    debug!(
        "itmv done: {} sweeps, converged={}, max |x - y| = {:?}",
        stats.iterations, stats.converged, stats.final_residual
    );
    Ok(stats)
}

/// Spawn one scoped thread per rank and join them all.
///
/// A panicked rank takes precedence over the `BarrierBroken` errors it causes
/// in the others.
fn run_team<T>(
    worker: &Worker<'_, T>,
    partitioner: &RowPartitioner,
    threads: usize,
) -> Result<SolveStats<T>, ItmvError>
where
    T: Float + Send + Sync + fmt::Debug,
{
    let results: Vec<Result<SolveStats<T>, ItmvError>> = thread::scope(|s| {
        let handles: Vec<_> = (0..threads)
            .map(|rank| {
                let assignment = partitioner.assignment(rank);
                s.spawn(move || worker.run(rank, assignment))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(rank, h)| h.join().unwrap_or(Err(ItmvError::WorkerPanicked(rank))))
            .collect()
    });

    let mut stats = SolveStats::empty();
    let mut failure = None;
    for r in results {
        match r {
            // every worker evaluated the same predicate on the same data
            Ok(s) => stats = s,
            Err(e @ ItmvError::WorkerPanicked(_)) => return Err(e),
            Err(e) => failure = failure.or(Some(e)),
        }
    }
    match failure {
        Some(e) => Err(e),
        None => Ok(stats),
    }
}

/// [`ItmvSolver`] front end for [`parallel_itmv_mult`].
#[derive(Debug, Clone, Copy)]
pub struct ThreadedSolver {
    pub opts: RunOptions,
}

impl ThreadedSolver {
    pub fn new(opts: RunOptions) -> Self {
        Self { opts }
    }
}

impl<T: Float + Send + Sync + fmt::Debug> ItmvSolver<T> for ThreadedSolver {
    fn solve(&mut self, ctx: &mut ItmvContext<T>) -> Result<SolveStats<T>, ItmvError> {
        parallel_itmv_mult(ctx, &self.opts)
    }
}

// rayon-based fork-join sweeps

use rayon::prelude::*;
use num_traits::Float;

use crate::config::options::{MappingStrategy, RunOptions};
use crate::core::traits::{Indexing, RowCompute};
use crate::error::ItmvError;
use crate::parallel::partition::block_chunk;

/// Dedicated rayon pool sized to a run's thread count.
pub struct RayonComm {
    pool: rayon::ThreadPool,
    opts: RunOptions,
}

impl RayonComm {
    pub fn new(opts: &RunOptions) -> Result<Self, ItmvError> {
        opts.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.thread_count)
            .thread_name(|i| format!("itmv-rayon-{i}"))
            .build()
            .map_err(|e| ItmvError::ThreadPool(e.to_string()))?;
        Ok(Self { pool, opts: *opts })
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `op` inside the pool.
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }

    /// One sweep `y = d + A x`, splitting rows according to the mapping strategy.
    /// Must be called from inside [`RayonComm::install`].
    pub fn sweep<T, M>(&self, a: &M, d: &[T], x: &[T], y: &mut [T])
    where
        T: Float + Send + Sync,
        M: RowCompute<T> + Indexing + Sync,
    {
        assert_eq!(a.nrows(), y.len());
        assert_eq!(d.len(), y.len());
        assert_eq!(x.len(), y.len());
        let n = y.len();
        let bs = self.opts.effective_block_size();
        let row = |i: usize, yi: &mut T| *yi = a.row_value(i, d[i], x);
        let by_chunks = |y: &mut [T], chunk: usize| {
            y.par_chunks_mut(chunk).enumerate().for_each(|(c, ys)| {
                for (off, yi) in ys.iter_mut().enumerate() {
                    row(c * chunk + off, yi);
                }
            });
        };
        match self.opts.mapping {
            MappingStrategy::Block => by_chunks(y, block_chunk(self.opts.thread_count, n).max(1)),
            MappingStrategy::BlockCyclic => by_chunks(y, bs),
            MappingStrategy::Dynamic => {
                y.par_iter_mut()
                    .enumerate()
                    .with_max_len(bs)
                    .for_each(|(i, yi)| row(i, yi));
            }
            MappingStrategy::Guided => {
                y.par_iter_mut()
                    .enumerate()
                    .with_min_len(bs)
                    .for_each(|(i, yi)| row(i, yi));
            }
        }
    }

    /// `max_i |x[i] - y[i]|` as a parallel reduction.
    pub fn max_abs_diff<T: Float + Send + Sync>(&self, x: &[T], y: &[T]) -> T {
        x.par_iter()
            .zip(y.par_iter())
            .map(|(&xi, &yi)| (xi - yi).abs())
            .reduce(T::zero, T::max)
    }

    /// `x ← y`.
    pub fn copy<T: Float + Send + Sync>(&self, y: &[T], x: &mut [T]) {
        x.par_iter_mut().zip(y.par_iter()).for_each(|(xi, &yi)| *xi = yi);
    }
}

//! Row ownership for the parallel iteration.
//!
//! Block and block-cyclic mappings are pure functions of
//! `(rank, thread_count, n, block_size)` and are computed once per thread before
//! the first round. Dynamic and guided mappings hand out rows at run time from a
//! shared [`WorkQueue`], so which thread owns a row can change from round to round
//! while every row is still claimed exactly once per round.

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::options::{MappingStrategy, RunOptions};

/// Rows per thread under block mapping: `ceil(n / thread_count)`.
pub fn block_chunk(thread_count: usize, n: usize) -> usize {
    n.div_ceil(thread_count.max(1))
}

/// Rows owned by `rank` under block mapping (possibly empty when `thread_count > n`).
pub fn block_range(rank: usize, thread_count: usize, n: usize) -> Range<usize> {
    let chunk = block_chunk(thread_count, n);
    let start = rank.saturating_mul(chunk).min(n);
    let end = (rank + 1).saturating_mul(chunk).min(n);
    start..end
}

/// Blocks of `block_size` rows owned by `rank` under block-cyclic mapping,
/// in increasing row order. Block `b` belongs to rank `b % thread_count`.
pub fn block_cyclic_ranges(
    rank: usize,
    thread_count: usize,
    n: usize,
    block_size: usize,
) -> Vec<Range<usize>> {
    let bs = block_size.max(1);
    let stride = bs.saturating_mul(thread_count.max(1));
    let first = rank.saturating_mul(bs);
    if first >= n {
        return Vec::new();
    }
    (first..n)
        .step_by(stride)
        .map(|start| start..(start + bs).min(n))
        .collect()
}

/// How a single thread finds its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAssignment {
    /// Fixed, ordered, non-empty ranges owned for the whole run
    Static(Vec<Range<usize>>),
    /// Rows are claimed every round from the shared work queue
    Claimed,
}

impl RowAssignment {
    /// Number of rows in a static assignment; `None` for claimed rows.
    pub fn static_len(&self) -> Option<usize> {
        match self {
            RowAssignment::Static(ranges) => Some(ranges.iter().map(|r| r.len()).sum()),
            RowAssignment::Claimed => None,
        }
    }
}

/// Maps `(rank, thread_count, n, strategy, block_size)` to row ownership.
#[derive(Debug, Clone, Copy)]
pub struct RowPartitioner {
    n: usize,
    thread_count: usize,
    mapping: MappingStrategy,
    block_size: usize,
}

impl RowPartitioner {
    pub fn new(n: usize, opts: &RunOptions) -> Self {
        Self {
            n,
            thread_count: opts.thread_count.max(1),
            mapping: opts.mapping,
            block_size: opts.effective_block_size(),
        }
    }

    /// Ownership for `rank`. Empty ranges are dropped.
    pub fn assignment(&self, rank: usize) -> RowAssignment {
        let ranges = match self.mapping {
            MappingStrategy::Block => vec![block_range(rank, self.thread_count, self.n)],
            MappingStrategy::BlockCyclic => {
                block_cyclic_ranges(rank, self.thread_count, self.n, self.block_size)
            }
            MappingStrategy::Dynamic | MappingStrategy::Guided => return RowAssignment::Claimed,
        };
        RowAssignment::Static(ranges.into_iter().filter(|r| !r.is_empty()).collect())
    }

    /// Shared queue for claimed mappings.
    pub fn work_queue(&self) -> WorkQueue {
        WorkQueue::new(self.n, self.thread_count, self.mapping, self.block_size)
    }
}

/// Shared cursor from which threads claim the next unclaimed rows.
///
/// Dynamic claims are a single `fetch_add` of `chunk` rows. Guided claims take
/// `max(ceil(remaining / threads), chunk)` rows and need a compare-and-swap loop
/// because the claim size depends on the cursor value.
#[derive(Debug)]
pub struct WorkQueue {
    next: AtomicUsize,
    n: usize,
    threads: usize,
    chunk: usize,
    guided: bool,
}

impl WorkQueue {
    pub fn new(n: usize, threads: usize, mapping: MappingStrategy, chunk: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            n,
            threads: threads.max(1),
            // claims never exceed n, so the cursor cannot wrap
            chunk: chunk.clamp(1, n.max(1)),
            guided: mapping == MappingStrategy::Guided,
        }
    }

    /// Claim the next unit of work, or `None` once every row has been handed out.
    pub fn claim(&self) -> Option<Range<usize>> {
        if self.guided {
            self.claim_guided()
        } else {
            self.claim_dynamic()
        }
    }

    fn claim_dynamic(&self) -> Option<Range<usize>> {
        // Early exit keeps the cursor from creeping far past `n` once drained.
        if self.next.load(Ordering::Relaxed) >= self.n {
            return None;
        }
        let start = self.next.fetch_add(self.chunk, Ordering::AcqRel);
        if start >= self.n {
            return None;
        }
        Some(start..(start + self.chunk).min(self.n))
    }

    fn claim_guided(&self) -> Option<Range<usize>> {
        let mut start = self.next.load(Ordering::Acquire);
        loop {
            if start >= self.n {
                return None;
            }
            let remaining = self.n - start;
            let size = remaining
                .div_ceil(self.threads)
                .max(self.chunk)
                .min(remaining);
            match self.next.compare_exchange_weak(
                start,
                start + size,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return Some(start..start + size),
                Err(current) => start = current,
            }
        }
    }

    /// Make every row claimable again. Callers must ensure no thread is claiming.
    pub fn reset(&self) {
        self.next.store(0, Ordering::Release);
    }
}

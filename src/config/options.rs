//! API options for a parallel run.
//!
//! This module provides the `RunOptions` struct, which selects how many worker
//! threads take part in a run and how matrix rows are mapped onto them. The
//! available mappings are contiguous block, block-cyclic, dynamic and guided.
//! The block size is the cyclic block for block-cyclic mapping and the claim
//! granularity for dynamic and guided mapping.

use std::fmt;
use std::str::FromStr;

use crate::error::ItmvError;

/// Upper bound on the number of worker threads a run accepts.
pub const THREAD_COUNT_MAX: usize = 64;

/// Default convergence threshold for `max_i |x[i] - y[i]|`.
pub const ERROR_THRESHOLD: f64 = 1e-3;

/// How rows of the matrix are assigned to worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MappingStrategy {
    /// One contiguous range of `ceil(n / threads)` rows per thread
    Block,
    /// Blocks of `block_size` rows dealt round-robin over the threads
    BlockCyclic,
    /// Chunks of `block_size` rows claimed from a shared cursor
    Dynamic,
    /// Shrinking chunks (never below `block_size`) claimed from a shared cursor
    Guided,
}

impl MappingStrategy {
    pub const ALL: [MappingStrategy; 4] = [
        MappingStrategy::Block,
        MappingStrategy::BlockCyclic,
        MappingStrategy::Dynamic,
        MappingStrategy::Guided,
    ];

    /// Whether rows are claimed at run time instead of assigned up front.
    pub fn is_claimed(self) -> bool {
        matches!(self, MappingStrategy::Dynamic | MappingStrategy::Guided)
    }
}

impl fmt::Display for MappingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MappingStrategy::Block => "block",
            MappingStrategy::BlockCyclic => "block-cyclic",
            MappingStrategy::Dynamic => "dynamic",
            MappingStrategy::Guided => "guided",
        };
        f.write_str(name)
    }
}

impl FromStr for MappingStrategy {
    type Err = ItmvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(MappingStrategy::Block),
            "block-cyclic" | "block_cyclic" | "cyclic" => Ok(MappingStrategy::BlockCyclic),
            "dynamic" => Ok(MappingStrategy::Dynamic),
            "guided" => Ok(MappingStrategy::Guided),
            other => Err(ItmvError::UnknownMapping(other.to_string())),
        }
    }
}

/// Thread count & row mapping for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Number of worker threads (1..=THREAD_COUNT_MAX)
    pub thread_count: usize,

    /// Row mapping strategy
    pub mapping: MappingStrategy,

    /// Cyclic block size, or claim granularity for dynamic/guided
    pub block_size: usize,
}

impl RunOptions {
    pub fn new(thread_count: usize, mapping: MappingStrategy, block_size: usize) -> Self {
        Self { thread_count, mapping, block_size }
    }

    /// Rejects configurations that must never reach a worker thread.
    pub fn validate(&self) -> Result<(), ItmvError> {
        if self.thread_count == 0 || self.thread_count > THREAD_COUNT_MAX {
            return Err(ItmvError::InvalidThreadCount {
                count: self.thread_count,
                max: THREAD_COUNT_MAX,
            });
        }
        if self.mapping == MappingStrategy::BlockCyclic && self.block_size == 0 {
            return Err(ItmvError::InvalidBlockSize(self.mapping));
        }
        Ok(())
    }

    /// Block size with the dynamic/guided default of one row applied.
    pub fn effective_block_size(&self) -> usize {
        self.block_size.max(1)
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            thread_count: crate::parallel::available_threads().clamp(1, THREAD_COUNT_MAX),
            mapping: MappingStrategy::Block,
            block_size: 1,
        }
    }
}

//! Core row-level traits for itmv.

/// Uniform dimension query for square operators and vectors.
pub trait Indexing {
    /// Number of rows (or length for a vector).
    fn nrows(&self) -> usize;
}

/// Single-row affine product: `offset + A[i, ·] · x`.
///
/// Implementations must be pure in `(i, offset, x)` so that disjoint rows can be
/// evaluated from different threads at once.
pub trait RowCompute<T> {
    /// Compute `offset + Σ_j A[i, j] x[j]` over the columns the operator stores for row `i`.
    fn row_value(&self, i: usize, offset: T, x: &[T]) -> T;
}

//! Dense square matrices on top of Faer.
//!
//! `ItmvMatrix` wraps a `faer::Mat<T>` together with a `MatrixKind` flag. The
//! upper-triangular kind promises that every entry below the diagonal is zero,
//! so row `i` only accumulates columns `j >= i`.

use faer::Mat;
use num_traits::Float;

use crate::core::traits::{Indexing, RowCompute};
use crate::error::ItmvError;

/// Storage pattern of the iteration matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixKind {
    /// Every off-diagonal entry may be nonzero
    Dense,
    /// Entries with column < row are known to be zero
    UpperTriangular,
}

/// Square iteration matrix `A` of `y = d + A x`.
#[derive(Debug, Clone)]
pub struct ItmvMatrix<T> {
    a: Mat<T>,
    kind: MatrixKind,
}

impl<T: Copy + Float> ItmvMatrix<T> {
    /// Wrap an existing Faer matrix. Fails unless `a` is square and non-empty.
    pub fn from_mat(a: Mat<T>, kind: MatrixKind) -> Result<Self, ItmvError> {
        if a.nrows() == 0 {
            return Err(ItmvError::InvalidDimension(0));
        }
        if a.nrows() != a.ncols() {
            return Err(ItmvError::DimensionMismatch {
                what: "matrix columns",
                expected: a.nrows(),
                found: a.ncols(),
            });
        }
        Ok(Self { a, kind })
    }

    /// Construct from row-major storage of length `n * n`.
    pub fn from_row_major(n: usize, data: &[T], kind: MatrixKind) -> Result<Self, ItmvError> {
        if n == 0 {
            return Err(ItmvError::InvalidDimension(n));
        }
        let len = n.checked_mul(n).ok_or(ItmvError::InvalidDimension(n))?;
        if data.len() != len {
            return Err(ItmvError::DimensionMismatch {
                what: "matrix storage",
                expected: len,
                found: data.len(),
            });
        }
        Self::from_mat(Mat::from_fn(n, n, |i, j| data[i * n + j]), kind)
    }

    pub fn kind(&self) -> MatrixKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.a.nrows()
    }

    /// Entry `A[i, j]`.
    pub fn get(&self, i: usize, j: usize) -> T {
        self.a[(i, j)]
    }

    /// First column row `i` accumulates over.
    #[inline]
    pub fn col_start(&self, i: usize) -> usize {
        match self.kind {
            MatrixKind::Dense => 0,
            MatrixKind::UpperTriangular => i,
        }
    }

    /// Floating-point operations in one full sweep `y = d + A x`.
    pub fn flops_per_sweep(&self) -> u64 {
        let n = self.dim() as u64;
        match self.kind {
            MatrixKind::Dense => 2 * n * n,
            MatrixKind::UpperTriangular => n * (n + 1),
        }
    }
}

impl<T> Indexing for ItmvMatrix<T> {
    fn nrows(&self) -> usize {
        self.a.nrows()
    }
}

impl<T: Copy + Float> RowCompute<T> for ItmvMatrix<T> {
    #[inline]
    fn row_value(&self, i: usize, offset: T, x: &[T]) -> T {
        let n = self.dim();
        debug_assert_eq!(x.len(), n, "input vector x has incorrect length");
        let mut acc = offset;
        for j in self.col_start(i)..n {
            acc = acc + self.a[(i, j)] * x[j];
        }
        acc
    }
}

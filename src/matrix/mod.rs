//! Matrix module: the dense iteration matrix and its storage kinds.

pub mod dense;
pub use dense::{ItmvMatrix, MatrixKind};

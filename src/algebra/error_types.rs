use thiserror::Error;

/// Error type returned when matrix and vector arguments disagree in size.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Incompatible dimensions: expected {expected:?}, found {found:?}")]
pub struct MatrixDimensionError {
    pub expected: (usize, usize),
    pub found: (usize, usize),
}

/// Error type returned by dense factorization routines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DenseFactorizationError {
    #[error("Matrix dimension fields and/or array lengths are incompatible")]
    IncompatibleDimension,
    /// A non-positive pivot was met at the given column.
    #[error("Cholesky error: matrix is not positive definite (pivot {0})")]
    Cholesky(usize),
    /// The matrix is numerically singular.  Holds the detected rank.
    #[error("LU error: matrix is singular (rank {0})")]
    LU(usize),
}

use crate::algebra::{DenseFactorizationError, FloatT, Matrix};

/// A matrix decomposition used as an opaque numeric service.
///
/// The solvers only ever ask three things of a decomposition: could it
/// factor the matrix, what is the solution for a right hand side, and what
/// rank did the factorization reveal.

pub trait Decomposition<T: FloatT> {
    /// Factor `A`, returning `true` if the result can be used to solve.
    fn compute(&mut self, A: &Matrix<T>) -> bool;

    /// `true` if the last call to `compute` produced a usable factorization.
    fn is_solvable(&self) -> bool;

    /// Solve `A*x = b` in place using the current factors.
    fn solve(&self, b: &mut [T]) -> Result<(), DenseFactorizationError>;

    /// Numerical rank revealed by the last factorization.
    fn rank(&self) -> usize;

    /// Solve for every column of `B` in place.
    fn solve_columns(&self, B: &mut Matrix<T>) -> Result<(), DenseFactorizationError> {
        for j in 0..B.ncols() {
            self.solve(B.col_slice_mut(j))?;
        }
        Ok(())
    }
}

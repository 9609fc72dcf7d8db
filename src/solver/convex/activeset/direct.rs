#![allow(non_snake_case)]

use super::SchurSolve;
use crate::algebra::*;
use crate::solver::convex::kkt::{solve_schur, QFactor};
use crate::solver::{ConvexData, ConvexSettings};

/// Dense Schur complement solve, refactored from scratch whenever the
/// working set changes.
#[derive(Debug, Default)]
pub(crate) struct DirectSchur<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> SchurSolve<T> for DirectSchur<T>
where
    T: FloatT,
{
    fn solve_reduced(
        &mut self,
        qf: &QFactor<T>,
        _data: &ConvexData<T>,
        _keys: &[usize],
        A: &Matrix<T>,
        g: &[T],
        r: &[T],
        p: &mut [T],
        lambda: &mut [T],
        settings: &ConvexSettings<T>,
    ) -> bool {
        solve_schur(qf, A, g, r, p, lambda, settings)
    }

    fn release(&mut self, _key: usize) {}

    fn clear(&mut self) {}
}

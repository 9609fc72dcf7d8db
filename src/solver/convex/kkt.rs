#![allow(non_snake_case)]

//! Solves of the equality constrained KKT system
//!
//! ```text
//! [ Q  A' ] [ p ]   [ -g ]
//! [ A  0  ] [ λ ] = [  r ]
//! ```
//!
//! either through the Schur complement `S = A*inv(Q)*A'` or, as a
//! fallback, by factoring the full matrix.

use super::stability::{dual_ridge, SchurScaling};
use crate::algebra::*;
use crate::solver::{ConvexData, ConvexSettings};

/// How the quadratic term could be factored
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum QMode<T> {
    /// Q is positive definite
    Definite,
    /// Q is semidefinite.   The factor is of `Q + δI`.
    Patched(T),
    /// Q is exactly zero
    Zero,
    /// no diagonal patch produced a factorization
    Indefinite,
}

/// Cholesky factor of the (possibly patched) quadratic term
#[derive(Debug, Clone)]
pub(crate) struct QFactor<T> {
    pub chol: CholeskyEngine<T>,
    pub mode: QMode<T>,
}

impl<T> QFactor<T>
where
    T: FloatT,
{
    pub fn analyse(Q: &Matrix<T>, settings: &ConvexSettings<T>) -> Self {
        let n = Q.nrows();
        let mut chol = CholeskyEngine::new(n);

        if n > 0 && Q.is_zero() {
            return Self {
                chol,
                mode: QMode::Zero,
            };
        }
        if chol.compute(Q) {
            return Self {
                chol,
                mode: QMode::Definite,
            };
        }

        let delta = settings.diagonal_patch * T::max(Q.max_abs_diag(), Q.max_abs());
        if delta > T::zero() {
            let mut Qp = Q.clone();
            Qp.add_to_diag(delta);
            if chol.compute(&Qp) {
                tracing::debug!(delta = ?delta, "quadratic term patched");
                return Self {
                    chol,
                    mode: QMode::Patched(delta),
                };
            }
        }

        tracing::debug!("quadratic term could not be factored");
        Self {
            chol,
            mode: QMode::Indefinite,
        }
    }

    pub fn is_factored(&self) -> bool {
        matches!(self.mode, QMode::Definite | QMode::Patched(_))
    }

    pub fn is_patched(&self) -> bool {
        matches!(self.mode, QMode::Patched(_))
    }

    /// `b <- inv(Q)*b`
    pub fn solve(&self, b: &mut [T]) -> bool {
        self.is_factored() && self.chol.solve(b).is_ok()
    }
}

/// Factors and solves a Schur complement system in place, trying
/// Cholesky first and LU second.
pub(crate) fn solve_schur_system<T>(
    mut S: Matrix<T>,
    rhs: &mut [T],
    settings: &ConvexSettings<T>,
) -> bool
where
    T: FloatT,
{
    let scaling = SchurScaling::apply(&mut S, settings);
    scaling.scale_vector(rhs);

    let k = S.nrows();
    let mut chol = CholeskyEngine::new(k);
    let solved = if chol.compute(&S) {
        chol.solve(rhs).is_ok()
    } else {
        let mut lu = LUEngine::new(k);
        lu.compute(&S) && lu.solve(rhs).is_ok()
    };

    if solved {
        scaling.scale_vector(rhs);
    }
    solved && rhs.is_finite()
}

/// Schur complement solve with a factored `Q`.   Returns `false` if the
/// reduced system could not be solved.
pub(crate) fn solve_schur<T>(
    qf: &QFactor<T>,
    A: &Matrix<T>,
    g: &[T],
    r: &[T],
    p: &mut [T],
    lambda: &mut [T],
    settings: &ConvexSettings<T>,
) -> bool
where
    T: FloatT,
{
    if !qf.is_factored() {
        return false;
    }
    let k = A.nrows();

    // z = inv(Q)*g
    let mut z = g.to_vec();
    if !qf.solve(&mut z) {
        return false;
    }

    if k == 0 {
        p.copy_from(&z).negate();
        return p.is_finite();
    }

    // Y = inv(Q)*A'
    let mut Y = A.transpose();
    if qf.chol.solve_columns(&mut Y).is_err() {
        return false;
    }

    let mut S = Matrix::zeros((k, k));
    for j in 0..k {
        let yj = Y.col_slice(j);
        for i in 0..=j {
            let v = A.row_dot(i, yj);
            S[(i, j)] = v;
            S[(j, i)] = v;
        }
    }

    // S*λ = -(r + A*z)
    for i in 0..k {
        lambda[i] = -(r[i] + A.row_dot(i, &z));
    }
    if !solve_schur_system(S, lambda, settings) {
        return false;
    }

    // p = -z - Y*λ
    p.copy_from(&z).negate();
    Y.gemv(p, lambda, -T::one(), T::one());
    p.is_finite()
}

/// Solve by factoring the full KKT matrix.   `ridge` is subtracted from
/// the diagonal of the dual block.
pub(crate) fn solve_full_kkt<T>(
    Q: &Matrix<T>,
    A: &Matrix<T>,
    g: &[T],
    r: &[T],
    p: &mut [T],
    lambda: &mut [T],
    ridge: T,
) -> bool
where
    T: FloatT,
{
    let n = Q.nrows();
    let k = A.nrows();
    let mut K = Matrix::zeros((n + k, n + k));
    for j in 0..n {
        for i in 0..n {
            K[(i, j)] = Q[(i, j)];
        }
    }
    for i in 0..k {
        for j in 0..n {
            K[(n + i, j)] = A[(i, j)];
            K[(j, n + i)] = A[(i, j)];
        }
        K[(n + i, n + i)] = -ridge;
    }

    let mut rhs: Vec<T> = g.iter().map(|&v| -v).chain(r.iter().copied()).collect();

    let mut lu = LUEngine::new(n + k);
    if !(lu.compute(&K) && lu.solve(&mut rhs).is_ok() && rhs.is_finite()) {
        return false;
    }
    p.copy_from_slice(&rhs[..n]);
    lambda.copy_from_slice(&rhs[n..]);
    true
}

/// Tries the Schur complement path, then the full KKT fallback.
pub(crate) fn solve_kkt<T>(
    qf: &QFactor<T>,
    data: &ConvexData<T>,
    A: &Matrix<T>,
    g: &[T],
    r: &[T],
    p: &mut [T],
    lambda: &mut [T],
    settings: &ConvexSettings<T>,
) -> bool
where
    T: FloatT,
{
    if solve_schur(qf, A, g, r, p, lambda, settings) {
        return true;
    }
    let exempt = settings.extended_precision_enable || qf.mode == QMode::Zero;
    let ridge = dual_ridge(A, settings, exempt);
    solve_full_kkt(&data.Q, A, g, r, p, lambda, ridge)
}

/// Infinity norm of the stationarity residual `Q*x + C + AE'*λE + AI'*λI`.
pub(crate) fn stationarity_residual<T>(
    data: &ConvexData<T>,
    x: &[T],
    lambda_eq: &[T],
    lambda_ineq: &[T],
) -> T
where
    T: FloatT,
{
    let mut g = vec![T::zero(); data.nvars()];
    data.gradient(x, &mut g);
    data.AE.gemv_t(&mut g, lambda_eq, T::one(), T::one());
    data.AI.gemv_t(&mut g, lambda_ineq, T::one(), T::one());
    g.norm_inf()
}

/// Structural checks: symmetric and positive semidefinite `Q`, and
/// equality rows of full rank.
pub(crate) fn validate_structure<T>(data: &ConvexData<T>, settings: &ConvexSettings<T>) -> bool
where
    T: FloatT,
{
    if !data.Q.is_symmetric(settings.tol_symmetry) {
        tracing::debug!("validation: Q is not symmetric");
        return false;
    }
    if !data.Q.is_zero() {
        let qf = QFactor::analyse(&data.Q, settings);
        if !qf.is_factored() {
            tracing::debug!("validation: Q is not positive semidefinite");
            return false;
        }
    }
    let me = data.neq();
    if me > 0 {
        let mut G = Matrix::zeros((me, me));
        for i in 0..me {
            for j in 0..me {
                let mut s = T::zero();
                for c in 0..data.nvars() {
                    s += data.AE[(i, c)] * data.AE[(j, c)];
                }
                G[(i, j)] = s;
            }
        }
        let mut lu = LUEngine::new(me);
        if !lu.compute(&G) {
            tracing::debug!(rank = lu.rank(), "validation: equality rows are rank deficient");
            return false;
        }
    }
    true
}

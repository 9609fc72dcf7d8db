#![allow(non_snake_case)]

use crate::algebra::*;
use crate::solver::ConvexSettings;

/// Symmetric Jacobi scaling of a Schur complement, `S <- D*S*D` with
/// `D = diag(1/sqrt(S_ii))`.
///
/// Before scaling, diagonal entries below a floor relative to the largest
/// one are clamped to that floor.  Scaling is only applied when the
/// diagonal spread lies in `[schur_scaling_min_spread, schur_scaling_max_spread)`.
#[derive(Debug, Clone)]
pub(crate) struct SchurScaling<T> {
    d: Vec<T>,
    active: bool,
}

impl<T> SchurScaling<T>
where
    T: FloatT,
{
    pub fn inactive() -> Self {
        Self {
            d: vec![],
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Regularises and scales `S` in place.
    pub fn apply(S: &mut Matrix<T>, settings: &ConvexSettings<T>) -> Self {
        if !settings.schur_scaling_enable || S.nrows() == 0 {
            return Self::inactive();
        }
        let k = S.nrows();
        let dmax = S.diag().maximum();
        if !(dmax > T::zero()) {
            return Self::inactive();
        }

        let floor = dmax * settings.schur_diagonal_floor;
        for i in 0..k {
            if S[(i, i)] < floor {
                S[(i, i)] = floor;
            }
        }

        let spread = dmax / S.diag().minimum();
        if spread < settings.schur_scaling_min_spread || spread >= settings.schur_scaling_max_spread
        {
            return Self::inactive();
        }

        let d: Vec<T> = S.diag().iter().map(|&v| T::recip(v.sqrt())).collect();
        for j in 0..k {
            for i in 0..k {
                S[(i, j)] *= d[i] * d[j];
            }
        }
        Self { d, active: true }
    }

    /// `b <- D*b`.  Used both to scale a right hand side and to recover
    /// the solution of the unscaled system.
    pub fn scale_vector(&self, b: &mut [T]) {
        if self.active {
            b.hadamard(&self.d);
        }
    }
}

/// Size of the negative ridge added to the dual block of a full KKT
/// matrix.   Zero unless enabled and the row norms of `A` are spread
/// wider than the configured threshold.   Callers pass `exempt` for
/// extended precision corrections and for problems without a quadratic
/// term.
pub(crate) fn dual_ridge<T>(A: &Matrix<T>, settings: &ConvexSettings<T>, exempt: bool) -> T
where
    T: FloatT,
{
    if !settings.dual_regularization_enable || exempt || A.nrows() == 0 {
        return T::zero();
    }
    let norms: Vec<T> = (0..A.nrows())
        .map(|i| A.row_norm(i))
        .filter(|&v| v > T::zero())
        .collect();
    if norms.is_empty() {
        return T::zero();
    }
    let spread = norms.maximum() / norms.minimum();
    if spread > settings.dual_regularization_threshold {
        settings.dual_regularization_scale * spread
    } else {
        T::zero()
    }
}

#[test]
fn test_schur_scaling() {
    let settings = ConvexSettings::<f64>::default();

    let mut S = Matrix::from(&[[1e4, 1.], [1., 1e-2]]);
    let scaling = SchurScaling::apply(&mut S, &settings);
    assert!(scaling.is_active());
    assert!(f64::abs(S[(0, 0)] - 1.) < 1e-14);
    assert!(f64::abs(S[(1, 1)] - 1.) < 1e-14);

    // narrow spread is left alone
    let mut S = Matrix::from(&[[2., 0.], [0., 1.]]);
    assert!(!SchurScaling::apply(&mut S, &settings).is_active());
    assert_eq!(S[(0, 0)], 2.);

    let A = Matrix::from(&[[1e6, 0.], [0., 1.]]);
    assert_eq!(dual_ridge(&A, &settings, false), 0.);
    let mut on = settings.clone();
    on.dual_regularization_enable = true;
    assert!(dual_ridge(&A, &on, false) > 0.);
    assert_eq!(dual_ridge(&A, &on, true), 0.);
}

#![allow(non_snake_case)]

use crate::algebra::{AsFloatT, Decomposition, DenseFactorizationError, FloatT, Matrix};

/// Dense LU factorization with partial (row) pivoting, `P*A = L*U`.
///
/// Columns with no acceptable pivot are skipped rather than aborting the
/// factorization, so that the numerical rank is available even for
/// singular systems.
#[derive(Debug, Clone)]
pub struct LUEngine<T> {
    /// packed unit lower triangular L and upper triangular U
    LU: Matrix<T>,
    /// row permutation
    perm: Vec<usize>,
    rank: usize,
}

impl<T> LUEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        Self {
            LU: Matrix::zeros((n, n)),
            perm: (0..n).collect(),
            rank: 0,
        }
    }

    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        self.LU = A.clone();
        self.perm = (0..n).collect();
        self.rank = 0;

        let size: T = n.max(1).as_T();
        let tol = T::epsilon() * size * T::max(A.max_abs(), T::min_positive_value());
        let LU = &mut self.LU;

        for k in 0..n {
            // find pivot row
            let mut p = k;
            let mut pmax = T::abs(LU[(k, k)]);
            for i in (k + 1)..n {
                let v = T::abs(LU[(i, k)]);
                if v > pmax {
                    pmax = v;
                    p = i;
                }
            }
            if !(pmax > tol) {
                // no usable pivot.  Leave the column alone
                continue;
            }
            if p != k {
                for j in 0..n {
                    let tmp = LU[(k, j)];
                    LU[(k, j)] = LU[(p, j)];
                    LU[(p, j)] = tmp;
                }
                self.perm.swap(k, p);
            }
            self.rank += 1;

            let pivot = LU[(k, k)];
            for i in (k + 1)..n {
                let lik = LU[(i, k)] / pivot;
                LU[(i, k)] = lik;
                if lik != T::zero() {
                    for j in (k + 1)..n {
                        let ukj = LU[(k, j)];
                        LU[(i, j)] -= lik * ukj;
                    }
                }
            }
        }

        if self.rank < n {
            Err(DenseFactorizationError::LU(self.rank))
        } else {
            Ok(())
        }
    }
}

impl<T> Decomposition<T> for LUEngine<T>
where
    T: FloatT,
{
    fn compute(&mut self, A: &Matrix<T>) -> bool {
        self.factor(A).is_ok()
    }

    fn is_solvable(&self) -> bool {
        self.rank == self.LU.nrows()
    }

    fn solve(&self, b: &mut [T]) -> Result<(), DenseFactorizationError> {
        let n = self.LU.nrows();
        if b.len() != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        if !self.is_solvable() {
            return Err(DenseFactorizationError::LU(self.rank));
        }
        let LU = &self.LU;

        let mut y: Vec<T> = self.perm.iter().map(|&p| b[p]).collect();

        // unit lower triangular forward substitution
        for i in 0..n {
            let mut s = y[i];
            for k in 0..i {
                s -= LU[(i, k)] * y[k];
            }
            y[i] = s;
        }
        // upper triangular back substitution
        for i in (0..n).rev() {
            let mut s = y[i];
            for k in (i + 1)..n {
                s -= LU[(i, k)] * y[k];
            }
            y[i] = s / LU[(i, i)];
        }
        b.copy_from_slice(&y);
        Ok(())
    }

    fn rank(&self) -> usize {
        self.rank
    }
}

#[test]
fn test_lu() {
    use crate::algebra::{MatrixVectorMultiply, VectorMath};

    // symmetric indefinite KKT-like matrix
    #[rustfmt::skip]
    let K = Matrix::from(
        &[[2., 0., 1.],
          [0., 2., 1.],
          [1., 1., 0.]]);

    let mut eng = LUEngine::<f64>::new(3);
    assert!(eng.compute(&K));

    let x = vec![0.5, 0.5, -1.];
    let mut b = vec![0.; 3];
    K.gemv(&mut b, &x, 1., 0.);
    eng.solve(&mut b).unwrap();
    assert!(b.norm_inf_diff(&x) < 1e-12);

    #[rustfmt::skip]
    let S = Matrix::from(
        &[[1., 2., 3.],
          [2., 4., 6.],
          [1., 0., 1.]]);
    assert!(!eng.compute(&S));
    assert_eq!(eng.rank(), 2);
    assert!(eng.solve(&mut b).is_err());
}

#![allow(non_snake_case)]

use crate::algebra::{AsFloatT, Decomposition, DenseFactorizationError, FloatT, Matrix};

/// Dense Cholesky factorization `A = L*L'` for symmetric positive
/// definite systems.  Only the lower triangle of `A` is referenced.
#[derive(Debug, Clone)]
pub struct CholeskyEngine<T> {
    /// lower triangular factor (stored as square dense)
    pub L: Matrix<T>,
    rank: usize,
    solvable: bool,
}

impl<T> CholeskyEngine<T>
where
    T: FloatT,
{
    pub fn new(n: usize) -> Self {
        let L = Matrix::<T>::zeros((n, n));
        Self {
            L,
            rank: 0,
            solvable: false,
        }
    }

    pub fn factor(&mut self, A: &Matrix<T>) -> Result<(), DenseFactorizationError> {
        if !A.is_square() {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let n = A.nrows();
        if self.L.size() != A.size() {
            self.L = Matrix::zeros((n, n));
        }

        self.solvable = false;
        self.rank = 0;

        // pivots below this are treated as zero
        let size: T = n.max(1).as_T();
        let tol = T::epsilon() * size * T::max(A.max_abs_diag(), T::min_positive_value());

        let L = &mut self.L;
        for j in 0..n {
            let mut d = A[(j, j)];
            for k in 0..j {
                d -= L[(j, k)] * L[(j, k)];
            }
            if !(d > tol) {
                return Err(DenseFactorizationError::Cholesky(j));
            }
            let d = d.sqrt();
            L[(j, j)] = d;
            for i in (j + 1)..n {
                let mut s = A[(i, j)];
                for k in 0..j {
                    s -= L[(i, k)] * L[(j, k)];
                }
                L[(i, j)] = s / d;
            }
            for i in 0..j {
                L[(i, j)] = T::zero();
            }
            self.rank = j + 1;
        }

        self.solvable = true;
        Ok(())
    }
}

impl<T> Decomposition<T> for CholeskyEngine<T>
where
    T: FloatT,
{
    fn compute(&mut self, A: &Matrix<T>) -> bool {
        self.factor(A).is_ok()
    }

    fn is_solvable(&self) -> bool {
        self.solvable
    }

    fn solve(&self, b: &mut [T]) -> Result<(), DenseFactorizationError> {
        if !self.solvable {
            return Err(DenseFactorizationError::Cholesky(self.rank));
        }
        let n = self.L.nrows();
        if b.len() != n {
            return Err(DenseFactorizationError::IncompatibleDimension);
        }
        let L = &self.L;

        // forward substitution L*y = b
        for i in 0..n {
            let mut s = b[i];
            for k in 0..i {
                s -= L[(i, k)] * b[k];
            }
            b[i] = s / L[(i, i)];
        }
        // back substitution L'*x = y
        for i in (0..n).rev() {
            let mut s = b[i];
            for k in (i + 1)..n {
                s -= L[(k, i)] * b[k];
            }
            b[i] = s / L[(i, i)];
        }
        Ok(())
    }

    fn rank(&self) -> usize {
        self.rank
    }
}

#[test]
fn test_cholesky() {
    use crate::algebra::{MatrixVectorMultiply, VectorMath};

    #[rustfmt::skip]
    let S = Matrix::from(
        &[[ 8., -2., 4.],
          [-2., 12., 2.],
          [ 4.,  2., 6.]]);

    let mut eng = CholeskyEngine::<f64>::new(3);
    assert!(eng.compute(&S));
    assert_eq!(eng.rank(), 3);

    let x = vec![1., -1., 2.];
    let mut b = vec![0.; 3];
    S.gemv(&mut b, &x, 1., 0.);
    eng.solve(&mut b).unwrap();
    assert!(b.norm_inf_diff(&x) < 1e-10);

    // singular matrix is rejected
    let Z = Matrix::from(&[[1., 1.], [1., 1.]]);
    assert!(!eng.compute(&Z));
    assert!(!eng.is_solvable());
    assert_eq!(eng.rank(), 1);
}

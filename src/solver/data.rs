#![allow(non_snake_case)]

use crate::algebra::*;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned when constructing or updating problem data
pub enum DataError {
    /// A matrix or vector has the wrong size
    #[error("Incompatible dimension for {what}: expected {expected}, found {found}")]
    IncompatibleDimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Problem data contains an infinite or NaN value
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),
    /// An update referenced a row that does not exist
    #[error("Row index {0} out of range")]
    BadRowIndex(usize),
}

/// Numeric problem data for the convex solver family:
///
/// ```text
/// minimise   ½x'Qx + C'x
/// subject to AE*x  = BE
///            AI*x <= BI
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexData<T> {
    pub Q: Matrix<T>,
    pub C: Vec<T>,
    pub AE: Matrix<T>,
    pub BE: Vec<T>,
    pub AI: Matrix<T>,
    pub BI: Vec<T>,
}

fn check_dim(what: &'static str, expected: usize, found: usize) -> Result<(), DataError> {
    if expected != found {
        return Err(DataError::IncompatibleDimension {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

fn check_finite<T: FloatT>(what: &'static str, v: &[T]) -> Result<(), DataError> {
    if !v.is_finite() {
        return Err(DataError::NonFinite(what));
    }
    Ok(())
}

impl<T> ConvexData<T>
where
    T: FloatT,
{
    /// Problem data with all dimensions checked.
    pub fn new(
        Q: Matrix<T>,
        C: Vec<T>,
        AE: Matrix<T>,
        BE: Vec<T>,
        AI: Matrix<T>,
        BI: Vec<T>,
    ) -> Result<Self, DataError> {
        let n = C.len();
        check_dim("Q rows", n, Q.nrows())?;
        check_dim("Q columns", n, Q.ncols())?;
        check_dim("AE columns", n, AE.ncols())?;
        check_dim("BE", AE.nrows(), BE.len())?;
        check_dim("AI columns", n, AI.ncols())?;
        check_dim("BI", AI.nrows(), BI.len())?;

        check_finite("Q", Q.data())?;
        check_finite("C", &C)?;
        check_finite("AE", AE.data())?;
        check_finite("BE", &BE)?;
        check_finite("AI", AI.data())?;
        check_finite("BI", &BI)?;

        Ok(Self {
            Q,
            C,
            AE,
            BE,
            AI,
            BI,
        })
    }

    /// Problem data with no constraints
    pub fn unconstrained(Q: Matrix<T>, C: Vec<T>) -> Result<Self, DataError> {
        let n = C.len();
        Self::new(
            Q,
            C,
            Matrix::zeros((0, n)),
            vec![],
            Matrix::zeros((0, n)),
            vec![],
        )
    }

    /// Problem data with equality constraints only
    pub fn equality_constrained(
        Q: Matrix<T>,
        C: Vec<T>,
        AE: Matrix<T>,
        BE: Vec<T>,
    ) -> Result<Self, DataError> {
        let n = C.len();
        Self::new(Q, C, AE, BE, Matrix::zeros((0, n)), vec![])
    }

    pub fn nvars(&self) -> usize {
        self.C.len()
    }

    pub fn neq(&self) -> usize {
        self.BE.len()
    }

    pub fn nineq(&self) -> usize {
        self.BI.len()
    }

    /// `½x'Qx + C'x`
    pub fn objective(&self, x: &[T]) -> T {
        let half: T = (0.5).as_T();
        half * self.Q.quad_form(x) + self.C.dot(x)
    }

    /// Objective gradient `Qx + C`
    pub fn gradient(&self, x: &[T], g: &mut [T]) {
        g.copy_from(&self.C);
        self.Q.gemv(g, x, T::one(), T::one());
    }

    /// Equality residual `BE - AE*x`
    pub fn equality_residual(&self, x: &[T], r: &mut [T]) {
        r.copy_from(&self.BE);
        self.AE.gemv(r, x, -T::one(), T::one());
    }

    /// Inequality slack `BI - AI*x`.   Negative entries are violations.
    pub fn inequality_slack(&self, x: &[T], s: &mut [T]) {
        s.copy_from(&self.BI);
        self.AI.gemv(s, x, -T::one(), T::one());
    }

    /// Largest constraint violation at `x`
    pub fn max_violation(&self, x: &[T]) -> T {
        let mut r = vec![T::zero(); self.neq()];
        let mut s = vec![T::zero(); self.nineq()];
        self.equality_residual(x, &mut r);
        self.inequality_slack(x, &mut s);
        let viol = s.iter().fold(T::zero(), |acc, &v| T::max(acc, -v));
        T::max(r.norm_inf(), viol)
    }

    /// `true` if `x` satisfies every constraint to within `tol`, relative
    /// to the magnitude of each right hand side.
    pub fn is_feasible(&self, x: &[T], tol: T) -> bool {
        if x.len() != self.nvars() {
            return false;
        }
        let mut r = vec![T::zero(); self.neq()];
        self.equality_residual(x, &mut r);
        let eq_ok = r
            .iter()
            .zip(&self.BE)
            .all(|(&ri, &bi)| T::abs(ri) <= tol * (T::one() + T::abs(bi)));

        let mut s = vec![T::zero(); self.nineq()];
        self.inequality_slack(x, &mut s);
        let ineq_ok = s
            .iter()
            .zip(&self.BI)
            .all(|(&si, &bi)| si >= -tol * (T::one() + T::abs(bi)));

        eq_ok && ineq_ok
    }

    /// Replace the right hand side of one inequality row
    pub fn update_inequality_rhs(&mut self, row: usize, value: T) -> Result<(), DataError> {
        if row >= self.nineq() {
            return Err(DataError::BadRowIndex(row));
        }
        if !value.is_finite() {
            return Err(DataError::NonFinite("BI"));
        }
        self.BI[row] = value;
        Ok(())
    }

    /// Constraint row by combined key: equality rows first, then inequality rows.
    pub(crate) fn row(&self, key: usize) -> Vec<T> {
        if key < self.neq() {
            self.AE.row(key)
        } else {
            self.AI.row(key - self.neq())
        }
    }

    /// Stacks the rows listed by combined key.
    pub(crate) fn select_rows(&self, keys: &[usize]) -> Matrix<T> {
        let mut out = Matrix::zeros((keys.len(), self.nvars()));
        for (r, &key) in keys.iter().enumerate() {
            for j in 0..self.nvars() {
                out[(r, j)] = if key < self.neq() {
                    self.AE[(key, j)]
                } else {
                    self.AI[(key - self.neq(), j)]
                };
            }
        }
        out
    }
}

#[test]
fn test_data_dimension_checks() {
    let Q = Matrix::<f64>::identity(2);
    let AI = Matrix::from(&[[1., 1.]]);
    let data = ConvexData::new(
        Q.clone(),
        vec![0., 0.],
        Matrix::zeros((0, 2)),
        vec![],
        AI.clone(),
        vec![1.],
    )
    .unwrap();
    assert_eq!(data.nineq(), 1);
    assert!(data.is_feasible(&[0.5, 0.5], 1e-9));
    assert!(!data.is_feasible(&[1., 1.], 1e-9));
    assert_eq!(data.select_rows(&[0]).row(0), vec![1., 1.]);

    let err = ConvexData::new(Q, vec![0.; 3], Matrix::zeros((0, 3)), vec![], AI, vec![1.]);
    assert!(matches!(
        err,
        Err(DataError::IncompatibleDimension { what: "Q rows", .. })
    ));
}

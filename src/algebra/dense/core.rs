#![allow(non_snake_case)]

use crate::algebra::{FloatT, MatrixDimensionError, MatrixVectorMultiply, VectorMath};
use std::ops::{Index, IndexMut};

/// Dense matrix in column major format.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    /// number of rows
    m: usize,
    /// number of columns
    n: usize,
    /// vector of data in column major format
    data: Vec<T>,
}

impl<T> Matrix<T>
where
    T: FloatT,
{
    pub fn zeros(size: (usize, usize)) -> Self {
        let (m, n) = size;
        let data = vec![T::zero(); m * n];
        Self { m, n, data }
    }

    pub fn identity(n: usize) -> Self {
        let mut mat = Matrix::zeros((n, n));
        for i in 0..n {
            mat[(i, i)] = T::one();
        }
        mat
    }

    /// Builds a matrix from a slice of rows.  All rows must have
    /// the same length.
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self, MatrixDimensionError> {
        let m = rows.len();
        let n = rows.first().map_or(0, |r| r.len());
        let mut mat = Matrix::zeros((m, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(MatrixDimensionError {
                    expected: (m, n),
                    found: (i, row.len()),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        Ok(mat)
    }

    pub fn new_from_slice(size: (usize, usize), src: &[T]) -> Self {
        let (m, n) = size;
        assert!(m * n == src.len());
        Self {
            m,
            n,
            data: src.to_vec(),
        }
    }

    pub fn nrows(&self) -> usize {
        self.m
    }

    pub fn ncols(&self) -> usize {
        self.n
    }

    pub fn size(&self) -> (usize, usize) {
        (self.m, self.n)
    }

    pub fn is_square(&self) -> bool {
        self.m == self.n
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    fn index_linear(&self, idx: (usize, usize)) -> usize {
        idx.0 + self.m * idx.1
    }

    pub fn col_slice(&self, col: usize) -> &[T] {
        assert!(col < self.n);
        &self.data[(col * self.m)..(col + 1) * self.m]
    }

    pub fn col_slice_mut(&mut self, col: usize) -> &mut [T] {
        assert!(col < self.n);
        &mut self.data[(col * self.m)..(col + 1) * self.m]
    }

    /// Copy of row `i` into `out`
    pub fn row_into(&self, i: usize, out: &mut [T]) {
        assert_eq!(out.len(), self.n);
        for (j, v) in out.iter_mut().enumerate() {
            *v = self[(i, j)];
        }
    }

    pub fn row(&self, i: usize) -> Vec<T> {
        let mut out = vec![T::zero(); self.n];
        self.row_into(i, &mut out);
        out
    }

    /// Dot product of row `i` with `x`
    pub fn row_dot(&self, i: usize, x: &[T]) -> T {
        assert_eq!(x.len(), self.n);
        let mut out = T::zero();
        for (j, &xj) in x.iter().enumerate() {
            out += self.data[i + self.m * j] * xj;
        }
        out
    }

    /// 2-norm of row `i`
    pub fn row_norm(&self, i: usize) -> T {
        let mut out = T::zero();
        for j in 0..self.n {
            let v = self.data[i + self.m * j];
            out += v * v;
        }
        out.sqrt()
    }

    /// New matrix made up of the rows listed in `rows`, in that order.
    pub fn select_rows(&self, rows: &[usize]) -> Matrix<T> {
        let mut out = Matrix::zeros((rows.len(), self.n));
        for (r, &i) in rows.iter().enumerate() {
            for j in 0..self.n {
                out[(r, j)] = self[(i, j)];
            }
        }
        out
    }

    /// Appends a row to the bottom of the matrix.
    pub fn push_row(&mut self, row: &[T]) {
        assert_eq!(row.len(), self.n);
        let m = self.m;
        let mut data = Vec::with_capacity((m + 1) * self.n);
        for (j, &v) in row.iter().enumerate() {
            data.extend_from_slice(&self.data[(j * m)..(j + 1) * m]);
            data.push(v);
        }
        self.data = data;
        self.m += 1;
    }

    pub fn transpose(&self) -> Matrix<T> {
        let mut out = Matrix::zeros((self.n, self.m));
        for j in 0..self.n {
            for i in 0..self.m {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    pub fn diag(&self) -> Vec<T> {
        let k = usize::min(self.m, self.n);
        (0..k).map(|i| self[(i, i)]).collect()
    }

    pub fn max_abs(&self) -> T {
        self.data.norm_inf()
    }

    pub fn max_abs_diag(&self) -> T {
        self.diag().norm_inf()
    }

    /// `true` if every entry is (exactly) zero
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&v| v == T::zero())
    }

    /// Checks symmetry up to a relative tolerance on the largest entry.
    pub fn is_symmetric(&self, rtol: T) -> bool {
        if !self.is_square() {
            return false;
        }
        let tol = rtol * T::max(T::one(), self.max_abs());
        for j in 0..self.n {
            for i in (j + 1)..self.m {
                if T::abs(self[(i, j)] - self[(j, i)]) > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Quadratic form `x'*M*x`
    pub fn quad_form(&self, x: &[T]) -> T {
        assert!(self.is_square());
        let mut y = vec![T::zero(); self.m];
        self.gemv(&mut y, x, T::one(), T::zero());
        y.dot(x)
    }

    pub fn add_to_diag(&mut self, c: T) {
        let k = usize::min(self.m, self.n);
        for i in 0..k {
            self[(i, i)] += c;
        }
    }

    pub fn scale(&mut self, c: T) {
        self.data.scale(c);
    }

    pub fn negate(&mut self) {
        self.data.negate();
    }
}

impl<T> Index<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &Self::Output {
        &self.data[self.index_linear(idx)]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T>
where
    T: FloatT,
{
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut Self::Output {
        let lidx = self.index_linear(idx);
        &mut self.data[lidx]
    }
}

impl<T, const R: usize, const C: usize> From<&[[T; C]; R]> for Matrix<T>
where
    T: FloatT,
{
    fn from(rows: &[[T; C]; R]) -> Matrix<T> {
        let mut mat = Matrix::zeros((R, C));
        for (i, row) in rows.iter().enumerate() {
            for (j, &v) in row.iter().enumerate() {
                mat[(i, j)] = v;
            }
        }
        mat
    }
}

impl<T> MatrixVectorMultiply for Matrix<T>
where
    T: FloatT,
{
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.m);

        y.scale(b);
        for (j, &xj) in x.iter().enumerate() {
            if xj == T::zero() {
                continue;
            }
            let axj = a * xj;
            for (yi, &mij) in y.iter_mut().zip(self.col_slice(j)) {
                *yi += mij * axj;
            }
        }
    }

    fn gemv_t(&self, y: &mut [T], x: &[T], a: T, b: T) {
        assert_eq!(x.len(), self.m);
        assert_eq!(y.len(), self.n);

        for (j, yj) in y.iter_mut().enumerate() {
            *yj = a * self.col_slice(j).dot(x) + b * (*yj);
        }
    }
}

impl<T> std::fmt::Display for Matrix<T>
where
    T: FloatT,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f)?;
        for i in 0..self.m {
            write!(f, "[ ")?;
            for j in 0..self.n {
                write!(f, " {:?}", self[(i, j)])?;
            }
            writeln!(f, "]")?;
        }
        writeln!(f)?;
        Ok(())
    }
}

#[test]
fn test_matrix_basics() {
    #[rustfmt::skip]
    let A = Matrix::from(
        &[[1., 2., 3.],
          [4., 5., 6.]]);

    assert_eq!(A.size(), (2, 3));
    assert_eq!(A.row(1), vec![4., 5., 6.]);
    assert_eq!(A.row_dot(0, &[1., 1., 1.]), 6.);

    let mut y = vec![1.; 2];
    A.gemv(&mut y, &[1., 0., -1.], 2., 1.);
    assert_eq!(y, vec![-3., -3.]);

    let mut z = vec![0.; 3];
    A.gemv_t(&mut z, &[1., 1.], 1., 0.);
    assert_eq!(z, vec![5., 7., 9.]);

    let mut B = A.select_rows(&[1]);
    B.push_row(&[7., 8., 9.]);
    assert_eq!(B.transpose()[(2, 1)], 9.);
    assert!(!B.is_symmetric(1e-12));
    assert!(Matrix::<f64>::identity(3).is_symmetric(0.));
}

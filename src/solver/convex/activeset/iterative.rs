#![allow(non_snake_case)]

use super::SchurSolve;
use crate::algebra::*;
use crate::solver::convex::kkt::QFactor;
use crate::solver::{ConvexData, ConvexSettings};
use std::collections::HashMap;

#[derive(Debug)]
struct CachedRow<T> {
    a: SparseRow<T>,
    /// `inv(Q)*a'`
    y: Vec<T>,
    /// `a*inv(Q)*a'`
    diag: T,
}

/// Schur complement solve by Jacobi preconditioned conjugate gradient.
///
/// The complement is never formed.   Each working row keeps its sparse
/// coefficients and `inv(Q)*a'` in a buffer drawn from a [`RowPool`];
/// buffers go back to the pool when their row leaves the working set.
#[derive(Debug)]
pub(crate) struct IterativeSchur<T> {
    rows: HashMap<usize, CachedRow<T>>,
    pool: RowPool<T>,
    /// last number of conjugate gradient iterations
    pub cg_iterations: u32,
}

impl<T> Default for IterativeSchur<T>
where
    T: FloatT,
{
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
            pool: RowPool::new(),
            cg_iterations: 0,
        }
    }
}

impl<T> IterativeSchur<T>
where
    T: FloatT,
{
    fn ensure_cached(&mut self, qf: &QFactor<T>, data: &ConvexData<T>, key: usize) -> bool {
        if self.rows.contains_key(&key) {
            return true;
        }
        let dense = data.row(key);
        let a = SparseRow::from_dense(&dense);
        let mut y = self.pool.acquire(dense.len());
        y.copy_from_slice(&dense);
        if !qf.solve(&mut y) {
            self.pool.release(y);
            return false;
        }
        let diag = a.dot(&y);
        self.rows.insert(key, CachedRow { a, y, diag });
        true
    }

    /// `out <- S*v` for the rows in `keys`, using `w` as workspace
    fn schur_multiply(&self, keys: &[usize], v: &[T], w: &mut [T], out: &mut [T]) {
        w.set(T::zero());
        for (&key, &vj) in keys.iter().zip(v) {
            if vj != T::zero() {
                w.axpby(vj, &self.rows[&key].y, T::one());
            }
        }
        for (o, key) in out.iter_mut().zip(keys) {
            *o = self.rows[key].a.dot(w);
        }
    }
}

impl<T> SchurSolve<T> for IterativeSchur<T>
where
    T: FloatT,
{
    fn solve_reduced(
        &mut self,
        qf: &QFactor<T>,
        data: &ConvexData<T>,
        keys: &[usize],
        _A: &Matrix<T>,
        g: &[T],
        r: &[T],
        p: &mut [T],
        lambda: &mut [T],
        settings: &ConvexSettings<T>,
    ) -> bool {
        if !qf.is_factored() {
            return false;
        }
        for &key in keys {
            if !self.ensure_cached(qf, data, key) {
                return false;
            }
        }

        let n = data.nvars();
        let k = keys.len();

        let mut z = g.to_vec();
        if !qf.solve(&mut z) {
            return false;
        }

        let mut w = vec![T::zero(); n];
        if k > 0 {
            // rhs = -(r + A*z)
            let rhs: Vec<T> = keys
                .iter()
                .zip(r)
                .map(|(key, &ri)| -(ri + self.rows[key].a.dot(&z)))
                .collect();
            let precond: Vec<T> = keys
                .iter()
                .map(|key| {
                    let d = self.rows[key].diag;
                    if d > T::zero() {
                        T::recip(d)
                    } else {
                        T::one()
                    }
                })
                .collect();

            if rhs.norm() == T::zero() {
                lambda.set(T::zero());
            }

            let mut res = vec![T::zero(); k];
            self.schur_multiply(keys, lambda, &mut w, &mut res);
            res.axpby(T::one(), &rhs, -T::one());

            let tol = settings.cg_tol * T::max(rhs.norm(), res.norm());
            let max_iter = match settings.cg_max_iter {
                0 => 2 * k as u32 + 10,
                m => m,
            };

            let mut zr = res.clone();
            zr.hadamard(&precond);
            let mut d = zr.clone();
            let mut rz = res.dot(&zr);
            let mut Sd = vec![T::zero(); k];

            let mut converged = res.norm() <= tol;
            self.cg_iterations = 0;
            while !converged && self.cg_iterations < max_iter {
                self.schur_multiply(keys, &d, &mut w, &mut Sd);
                let dSd = d.dot(&Sd);
                if !(dSd > T::zero()) {
                    break;
                }
                let alpha = rz / dSd;
                lambda.axpby(alpha, &d, T::one());
                res.axpby(-alpha, &Sd, T::one());
                self.cg_iterations += 1;

                converged = res.norm() <= tol;
                zr.copy_from(&res).hadamard(&precond);
                let rz_new = res.dot(&zr);
                let beta = rz_new / rz;
                rz = rz_new;
                d.axpby(T::one(), &zr, beta);
            }

            tracing::trace!(iterations = self.cg_iterations, converged, "schur cg");
            if !converged || !lambda.is_finite() {
                return false;
            }
        }

        // p = -z - Y*λ
        p.copy_from(&z).negate();
        for (&key, &lj) in keys.iter().zip(lambda.iter()) {
            p.axpby(-lj, &self.rows[&key].y, T::one());
        }
        p.is_finite()
    }

    fn release(&mut self, key: usize) {
        if let Some(row) = self.rows.remove(&key) {
            self.pool.release(row.y);
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.pool.clear();
    }
}

#[test]
fn test_iterative_schur_matches_direct() {
    use crate::solver::convex::kkt::solve_schur;

    let settings = ConvexSettings::<f64>::default();
    #[rustfmt::skip]
    let Q = Matrix::from(
        &[[4., 1., 0.],
          [1., 3., 0.],
          [0., 0., 2.]]);
    let AI = Matrix::from(&[[1., 1., 0.], [0., 1., 1.]]);
    let data = ConvexData::new(
        Q.clone(),
        vec![1., -1., 0.5],
        Matrix::zeros((0, 3)),
        vec![],
        AI.clone(),
        vec![1., 1.],
    )
    .unwrap();
    let qf = QFactor::analyse(&Q, &settings);

    let keys = [0, 1];
    let g = vec![1., -1., 0.5];
    let r = vec![0.2, -0.1];

    let (mut p1, mut l1) = (vec![0.; 3], vec![0.; 2]);
    assert!(solve_schur(&qf, &AI, &g, &r, &mut p1, &mut l1, &settings));

    let mut it = IterativeSchur::default();
    let (mut p2, mut l2) = (vec![0.; 3], vec![0.; 2]);
    assert!(it.solve_reduced(&qf, &data, &keys, &AI, &g, &r, &mut p2, &mut l2, &settings));
    assert!(p1.norm_inf_diff(&p2) < 1e-10);
    assert!(l1.norm_inf_diff(&l2) < 1e-10);

    it.release(1);
    assert_eq!(it.rows.len(), 1);
    assert_eq!(it.pool.allocated(), 2);
}

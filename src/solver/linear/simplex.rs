#![allow(non_snake_case)]

use super::LinearSettings;
use crate::algebra::*;
use crate::solver::{ConvexData, SolveResult, SolverState};
use crate::timers::*;

/// Dense two-phase simplex with Bland's rule.
///
/// Solves
///
/// ```text
/// minimise   c'x
/// subject to AE*x  = BE
///            AI*x <= BI
/// ```
///
/// with `x` free.  Free variables are split as `x = u - v` with `u, v >= 0`
/// and every inequality row receives a slack.  Rows that cannot start with
/// a slack in the basis receive an artificial variable that phase one
/// drives to zero.
#[derive(Debug)]
pub struct SimplexSolver<T>
where
    T: FloatT,
{
    c: Vec<T>,
    AE: Matrix<T>,
    BE: Vec<T>,
    AI: Matrix<T>,
    BI: Vec<T>,
    settings: LinearSettings<T>,
    timers: Timers,
}

enum PhaseOutcome {
    Optimal,
    Unbounded,
    IterationLimit,
}

struct Tableau<T> {
    /// one row per constraint, rhs in the last column
    rows: Vec<Vec<T>>,
    basis: Vec<usize>,
    n: usize,
    nslack: usize,
    nart: usize,
}

impl<T> Tableau<T>
where
    T: FloatT,
{
    fn ncols(&self) -> usize {
        2 * self.n + self.nslack + self.nart
    }

    fn rhs(&self, i: usize) -> T {
        self.rows[i][self.ncols()]
    }

    fn is_artificial(&self, j: usize) -> bool {
        j >= 2 * self.n + self.nslack
    }

    fn pivot(&mut self, r: usize, j: usize) {
        let p = self.rows[r][j];
        self.rows[r].iter_mut().for_each(|v| *v /= p);
        let pivot_row = self.rows[r].clone();
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i == r {
                continue;
            }
            let f = row[j];
            if f != T::zero() {
                for (v, &pv) in row.iter_mut().zip(&pivot_row) {
                    *v -= f * pv;
                }
                row[j] = T::zero();
            }
        }
        self.basis[r] = j;
    }

    fn objective(&self, cost: &[T]) -> T {
        self.basis
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (i, &b)| acc + cost[b] * self.rhs(i))
    }

    /// Runs simplex pivots on `cost`, never letting artificial columns
    /// enter when `allow_artificial` is false.
    fn run(
        &mut self,
        cost: &[T],
        allow_artificial: bool,
        settings: &LinearSettings<T>,
        iterations: &mut u32,
    ) -> PhaseOutcome {
        let ncols = self.ncols();
        let mut in_basis = vec![false; ncols];
        self.basis.iter().for_each(|&b| in_basis[b] = true);

        loop {
            if *iterations >= settings.max_iter {
                return PhaseOutcome::IterationLimit;
            }

            // Bland: lowest index with a negative reduced cost enters
            let entering = (0..ncols)
                .filter(|&j| !in_basis[j] && (allow_artificial || !self.is_artificial(j)))
                .find(|&j| {
                    let reduced = self
                        .basis
                        .iter()
                        .enumerate()
                        .fold(cost[j], |acc, (i, &b)| acc - cost[b] * self.rows[i][j]);
                    reduced < -settings.tol_optimality
                });

            let j = match entering {
                Some(j) => j,
                None => return PhaseOutcome::Optimal,
            };

            // ratio test, ties broken by lowest basis index
            let mut leaving: Option<(usize, T)> = None;
            for i in 0..self.rows.len() {
                let a = self.rows[i][j];
                if a > settings.tol_pivot {
                    let ratio = self.rhs(i) / a;
                    leaving = match leaving {
                        None => Some((i, ratio)),
                        Some((k, best)) => {
                            if ratio < best || (ratio == best && self.basis[i] < self.basis[k]) {
                                Some((i, ratio))
                            } else {
                                Some((k, best))
                            }
                        }
                    };
                }
            }

            let r = match leaving {
                Some((r, _)) => r,
                None => return PhaseOutcome::Unbounded,
            };

            in_basis[self.basis[r]] = false;
            in_basis[j] = true;
            self.pivot(r, j);
            *iterations += 1;
        }
    }

    /// Pivot artificial variables out of the basis.   Rows where that is
    /// impossible are redundant and keep their artificial at zero.
    fn expel_artificials(&mut self, settings: &LinearSettings<T>) {
        for r in 0..self.rows.len() {
            if !self.is_artificial(self.basis[r]) {
                continue;
            }
            let candidate = (0..2 * self.n + self.nslack)
                .filter(|j| !self.basis.contains(j))
                .find(|&j| T::abs(self.rows[r][j]) > settings.tol_pivot);
            if let Some(j) = candidate {
                self.pivot(r, j);
            }
        }
    }

    fn primal(&self) -> Vec<T> {
        let mut x = vec![T::zero(); self.n];
        for (i, &b) in self.basis.iter().enumerate() {
            if b < self.n {
                x[b] += self.rhs(i);
            } else if b < 2 * self.n {
                x[b - self.n] -= self.rhs(i);
            }
        }
        x
    }
}

impl<T> SimplexSolver<T>
where
    T: FloatT,
{
    pub fn new(
        c: &[T],
        AE: &Matrix<T>,
        BE: &[T],
        AI: &Matrix<T>,
        BI: &[T],
        settings: LinearSettings<T>,
    ) -> Self {
        Self {
            c: c.to_vec(),
            AE: AE.clone(),
            BE: BE.to_vec(),
            AI: AI.clone(),
            BI: BI.to_vec(),
            settings,
            timers: Timers::default(),
        }
    }

    /// Linear problem over the constraints of `data`, ignoring `Q`.
    pub fn from_convex_data(c: &[T], data: &ConvexData<T>, settings: LinearSettings<T>) -> Self {
        Self::new(c, &data.AE, &data.BE, &data.AI, &data.BI, settings)
    }

    fn nvars(&self) -> usize {
        self.c.len()
    }

    fn build_tableau(&self) -> Tableau<T> {
        let n = self.nvars();
        let (me, mi) = (self.BE.len(), self.BI.len());
        let m = me + mi;

        // rows that can start with their slack basic
        let slack_basic: Vec<bool> = (0..m)
            .map(|r| r >= me && self.BI[r - me] >= T::zero())
            .collect();
        let nart = slack_basic.iter().filter(|&&b| !b).count();

        let mut tab = Tableau {
            rows: Vec::with_capacity(m),
            basis: Vec::with_capacity(m),
            n,
            nslack: mi,
            nart,
        };
        let width = tab.ncols() + 1;

        let mut next_art = 2 * n + mi;
        for r in 0..m {
            let mut row = vec![T::zero(); width];
            let b = if r < me { self.BE[r] } else { self.BI[r - me] };
            let sign = if b < T::zero() { -T::one() } else { T::one() };
            for j in 0..n {
                let a = if r < me {
                    self.AE[(r, j)]
                } else {
                    self.AI[(r - me, j)]
                };
                row[j] = sign * a;
                row[n + j] = -sign * a;
            }
            if r >= me {
                row[2 * n + (r - me)] = sign;
            }
            row[width - 1] = sign * b;

            if slack_basic[r] {
                tab.basis.push(2 * n + (r - me));
            } else {
                row[next_art] = T::one();
                tab.basis.push(next_art);
                next_art += 1;
            }
            tab.rows.push(row);
        }
        tab
    }

    /// Phase one.   Returns the tableau at a basic feasible point or the
    /// state explaining why there is none.
    fn phase_one(&self, iterations: &mut u32) -> Result<Tableau<T>, SolverState> {
        let mut tab = self.build_tableau();
        if tab.nart == 0 {
            return Ok(tab);
        }

        let ncols = tab.ncols();
        let cost: Vec<T> = (0..ncols)
            .map(|j| {
                if tab.is_artificial(j) {
                    T::one()
                } else {
                    T::zero()
                }
            })
            .collect();

        match tab.run(&cost, true, &self.settings, iterations) {
            PhaseOutcome::Optimal => {}
            PhaseOutcome::Unbounded | PhaseOutcome::IterationLimit => {
                return Err(SolverState::Failed)
            }
        }

        let scale = T::one() + T::max(self.BE.norm_inf(), self.BI.norm_inf());
        if tab.objective(&cost) > self.settings.tol_feas * scale {
            return Err(SolverState::Infeasible);
        }
        tab.expel_artificials(&self.settings);
        Ok(tab)
    }

    /// Any point satisfying the constraints
    pub fn feasible_point(&mut self) -> Result<Vec<T>, SolverState> {
        let mut iterations = 0;
        let tab = self.phase_one(&mut iterations)?;
        Ok(tab.primal())
    }

    pub fn solve(&mut self) -> SolveResult<T> {
        let n = self.nvars();
        let mut timers = std::mem::take(&mut self.timers);
        timers.reset();
        let mut iterations = 0u32;

        let state;
        let mut x = vec![T::nan(); n];

        timeit! {timers => "simplex"; {
            state = match self.phase_one(&mut iterations) {
                Err(s) => s,
                Ok(mut tab) => {
                    let mut cost = vec![T::zero(); tab.ncols()];
                    for j in 0..n {
                        cost[j] = self.c[j];
                        cost[n + j] = -self.c[j];
                    }
                    let outcome = tab.run(&cost, false, &self.settings, &mut iterations);
                    x = tab.primal();
                    match outcome {
                        PhaseOutcome::Optimal => SolverState::Optimal,
                        PhaseOutcome::Unbounded => SolverState::Unbounded,
                        PhaseOutcome::IterationLimit => SolverState::Feasible,
                    }
                }
            };
        }}

        tracing::debug!(%state, iterations, "simplex finished");

        let value = if state.is_feasible() {
            self.c.dot(&x)
        } else if state == SolverState::Unbounded {
            T::neg_infinity()
        } else {
            T::nan()
        };

        let solve_time = timers.total_time().as_secs_f64();
        self.timers = timers;

        SolveResult {
            state,
            value,
            x,
            multipliers: None,
            iterations,
            solve_time,
        }
    }
}

#[test]
fn test_simplex_small() {
    // min -x - y  s.t. x + 2y <= 4, 3x + y <= 6, x >= 0, y >= 0
    #[rustfmt::skip]
    let AI = Matrix::from(
        &[[ 1.,  2.],
          [ 3.,  1.],
          [-1.,  0.],
          [ 0., -1.]]);
    let BI = vec![4., 6., 0., 0.];
    let AE = Matrix::zeros((0, 2));

    let mut solver = SimplexSolver::new(&[-1., -1.], &AE, &[], &AI, &BI, LinearSettings::default());
    let result = solver.solve();
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.norm_inf_diff(&[1.6, 1.2]) < 1e-9);
    assert!(f64::abs(result.value + 2.8) < 1e-9);

    // drop the upper bounds: unbounded
    let AI = Matrix::from(&[[-1., 0.], [0., -1.]]);
    let mut solver =
        SimplexSolver::new(&[-1., -1.], &AE, &[], &AI, &[0., 0.], LinearSettings::default());
    assert_eq!(solver.solve().state, SolverState::Unbounded);

    // x >= 1 and x <= 0
    let AI = Matrix::from(&[[-1.], [1.]]);
    let mut solver = SimplexSolver::new(
        &[1.],
        &Matrix::zeros((0, 1)),
        &[],
        &AI,
        &[-1., 0.],
        LinearSettings::default(),
    );
    assert_eq!(solver.solve().state, SolverState::Infeasible);
}

#[test]
fn test_simplex_equality() {
    // min x + 2y s.t. x + y = 1, x,y >= 0  ->  (1, 0)
    let AE = Matrix::from(&[[1., 1.]]);
    let AI = Matrix::from(&[[-1., 0.], [0., -1.]]);
    let mut solver =
        SimplexSolver::new(&[1., 2.], &AE, &[1.], &AI, &[0., 0.], LinearSettings::default());
    let result = solver.solve();
    assert_eq!(result.state, SolverState::Optimal);
    assert!(result.x.norm_inf_diff(&[1., 0.]) < 1e-9);

    let x = solver.feasible_point().unwrap();
    assert!(f64::abs(x[0] + x[1] - 1.) < 1e-9);
}

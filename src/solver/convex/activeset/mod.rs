#![allow(non_snake_case)]

//! Primal active-set method for convex quadratic problems with
//! inequality constraints.
//!
//! The iterate stays feasible.  Each iteration solves the equality
//! constrained subproblem on the working set (equality rows plus the
//! included inequality rows) for a step and multipliers, then either
//! moves along the step up to the first blocking row, releases the row
//! with the most negative multiplier, or stops at an optimum.

mod direct;
mod iterative;
mod shrink;

use self::direct::DirectSchur;
use self::iterative::IterativeSchur;
use self::shrink::ShrinkRule;

use super::core::{Interruption, SolverCore};
use super::kkt::{solve_full_kkt, validate_structure, QFactor, QMode};
use super::stability::dual_ridge;
use super::ConvexSolver;
use crate::algebra::*;
use crate::solver::linear::{LinearSettings, SimplexSolver};
use crate::solver::{ConvexData, ConvexSettings, Multipliers, SolveResult, SolverState};
use crate::timers::*;
use enum_dispatch::*;

/// Solve of the reduced KKT system on the working set
#[enum_dispatch]
pub(crate) trait SchurSolve<T>
where
    T: FloatT,
{
    /// Solve for the step `p` and multipliers `lambda` of the working
    /// rows `keys` (rows of `A`).   `lambda` holds a starting guess on
    /// entry.   Returns `false` if the system could not be solved.
    #[allow(clippy::too_many_arguments)]
    fn solve_reduced(
        &mut self,
        qf: &QFactor<T>,
        data: &ConvexData<T>,
        keys: &[usize],
        A: &Matrix<T>,
        g: &[T],
        r: &[T],
        p: &mut [T],
        lambda: &mut [T],
        settings: &ConvexSettings<T>,
    ) -> bool;

    /// A row has left the working set
    fn release(&mut self, key: usize);

    /// Drop all cached state
    fn clear(&mut self);
}

#[enum_dispatch(SchurSolve<T>)]
#[derive(Debug)]
pub(crate) enum SchurSubsystem<T>
where
    T: FloatT,
{
    DirectSchur(DirectSchur<T>),
    IterativeSchur(IterativeSchur<T>),
}

enum Step {
    Continue,
    Optimal,
    Unbounded,
    Failed,
}

/// Active-set solver.   The reduced systems are solved by a dense Schur
/// complement factorization ([`new_direct`](Self::new_direct)) or by
/// conjugate gradient on the Schur complement
/// ([`new_iterative`](Self::new_iterative)).
#[derive(Debug)]
pub struct ActiveSetSolver<T>
where
    T: FloatT,
{
    core: SolverCore<T>,
    subsystem: SchurSubsystem<T>,
    qf: Option<QFactor<T>>,

    x: Vec<T>,
    /// inequality rows in the working set, in order of inclusion
    included: Vec<usize>,
    excluded: Vec<usize>,
    to_include: Option<usize>,
    lambda_eq: Vec<T>,
    lambda_ineq: Vec<T>,
    shrink_rule: ShrinkRule,
}

impl<T> ActiveSetSolver<T>
where
    T: FloatT,
{
    pub fn new_direct(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        Self::with_subsystem(
            data,
            settings,
            DirectSchur::default().into(),
            "active-set (direct)",
        )
    }

    pub fn new_iterative(data: ConvexData<T>, settings: ConvexSettings<T>) -> Self {
        Self::with_subsystem(
            data,
            settings,
            IterativeSchur::default().into(),
            "active-set (iterative)",
        )
    }

    fn with_subsystem(
        data: ConvexData<T>,
        settings: ConvexSettings<T>,
        subsystem: SchurSubsystem<T>,
        method: &'static str,
    ) -> Self {
        let (n, me, mi) = (data.nvars(), data.neq(), data.nineq());
        Self {
            core: SolverCore::new(data, settings, method),
            subsystem,
            qf: None,
            x: vec![T::zero(); n],
            included: Vec::with_capacity(n),
            excluded: Vec::with_capacity(mi),
            to_include: None,
            lambda_eq: vec![T::zero(); me],
            lambda_ineq: vec![T::zero(); mi],
            shrink_rule: ShrinkRule::default(),
        }
    }

    /// Inequality rows in the working set at the end of the last solve
    pub fn active_rows(&self) -> &[usize] {
        &self.included
    }

    fn include(&mut self, row: usize) {
        if let Some(pos) = self.excluded.iter().position(|&j| j == row) {
            self.excluded.remove(pos);
            self.included.push(row);
        }
    }

    fn exclude(&mut self, row: usize) {
        if let Some(pos) = self.included.iter().position(|&j| j == row) {
            self.included.remove(pos);
            self.excluded.push(row);
            self.lambda_ineq[row] = T::zero();
            let me = self.core.data.neq();
            self.subsystem.release(me + row);
        }
    }

    /// Finds a feasible starting point and seeds the working set.
    fn initialise(&mut self, start: Option<&[T]>, qf: &QFactor<T>) -> Result<(), SolverState> {
        let data = &self.core.data;
        let settings = &self.core.settings;
        let (n, me, mi) = (data.nvars(), data.neq(), data.nineq());

        let warm = start.filter(|x0| data.is_feasible(x0, settings.tol_feas));

        let x = match warm {
            Some(x0) => x0.to_vec(),
            None => {
                // the equality constrained minimiser, if it happens to be feasible
                let mut x = vec![T::zero(); n];
                let mut l = vec![T::zero(); me];
                let eq = data.select_rows(&(0..me).collect::<Vec<_>>());
                let candidate = super::kkt::solve_schur(qf, &eq, &data.C, &data.BE, &mut x, &mut l, settings)
                    && data.is_feasible(&x, settings.tol_feas);
                if candidate {
                    x
                } else {
                    let lp = LinearSettings::from_convex(settings);
                    let zeros = vec![T::zero(); n];
                    match SimplexSolver::from_convex_data(&zeros, data, lp).feasible_point() {
                        Ok(x) => x,
                        Err(SolverState::Infeasible) => return Err(SolverState::Infeasible),
                        Err(_) => return Err(SolverState::Failed),
                    }
                }
            }
        };

        let mut slack = vec![T::zero(); mi];
        data.inequality_slack(&x, &mut slack);
        let budget = n.saturating_sub(me);

        self.subsystem.clear();
        self.included.clear();
        self.excluded.clear();
        for (i, (&s, &b)) in slack.iter().zip(&data.BI).enumerate() {
            let tight = s <= settings.tol_feas * (T::one() + T::abs(b));
            if tight && self.included.len() < budget {
                self.included.push(i);
            } else {
                self.excluded.push(i);
            }
        }

        self.x = x;
        self.to_include = None;
        self.lambda_eq.set(T::zero());
        self.lambda_ineq.set(T::zero());
        self.shrink_rule = ShrinkRule::default();
        Ok(())
    }

    fn shrink(&mut self) -> bool {
        let rule = self.shrink_rule;
        self.shrink_rule = rule.toggle();
        match rule.choose(&self.core.data, &self.included, &self.lambda_ineq) {
            Some(row) => {
                tracing::debug!(row, ?rule, "working set shrunk");
                self.exclude(row);
                true
            }
            None => false,
        }
    }

    fn iterate(&mut self, qf: &QFactor<T>) -> Step {
        if let Some(row) = self.to_include.take() {
            self.include(row);
        }

        let data = &self.core.data;
        let settings = &self.core.settings;
        let (n, me) = (data.nvars(), data.neq());

        let keys: Vec<usize> = (0..me).chain(self.included.iter().map(|&i| me + i)).collect();
        let k = keys.len();
        let A = data.select_rows(&keys);

        let mut g = vec![T::zero(); n];
        data.gradient(&self.x, &mut g);

        // working row residuals, nominally zero
        let mut r = vec![T::zero(); k];
        for (ri, &key) in r.iter_mut().zip(&keys) {
            *ri = if key < me {
                data.BE[key] - data.AE.row_dot(key, &self.x)
            } else {
                data.BI[key - me] - data.AI.row_dot(key - me, &self.x)
            };
        }

        let mut p = vec![T::zero(); n];
        let mut lambda: Vec<T> = self
            .lambda_eq
            .iter()
            .copied()
            .chain(self.included.iter().map(|&i| self.lambda_ineq[i]))
            .collect();

        let mut solved = self
            .subsystem
            .solve_reduced(qf, data, &keys, &A, &g, &r, &mut p, &mut lambda, settings);
        if !solved {
            let exempt = settings.extended_precision_enable || qf.mode == QMode::Zero;
            let ridge = dual_ridge(&A, settings, exempt);
            solved = solve_full_kkt(&data.Q, &A, &g, &r, &mut p, &mut lambda, ridge);
        }

        if !solved {
            if self.included.is_empty() || !self.shrink() {
                return Step::Failed;
            }
            return Step::Continue;
        }

        self.lambda_eq.copy_from_slice(&lambda[..me]);
        for (pos, &i) in self.included.iter().enumerate() {
            self.lambda_ineq[i] = lambda[me + pos];
        }

        let pnorm = p.norm_inf();
        let xnorm = self.x.norm_inf();

        if pnorm <= settings.tol_step * (T::one() + xnorm) {
            // stationary on the working set
            self.core.info.step_length = T::zero();
            let release = self
                .included
                .iter()
                .copied()
                .filter(|&i| self.lambda_ineq[i] < -settings.tol_multiplier)
                .min_by(|&a, &b| {
                    self.lambda_ineq[a]
                        .partial_cmp(&self.lambda_ineq[b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            return match release {
                Some(row) => {
                    self.exclude(row);
                    Step::Continue
                }
                None => Step::Optimal,
            };
        }

        // a patched Q produces directions of zero curvature.  These
        // are followed to the first blocking row, if there is one.
        let mut curvature_free = false;
        if qf.is_patched() {
            let mut res = g.clone();
            data.Q.gemv(&mut res, &p, T::one(), T::one());
            A.gemv_t(&mut res, &lambda, T::one(), T::one());
            curvature_free = res.norm_inf() > settings.tol_feas.sqrt() * (T::one() + g.norm_inf());
        }

        // ratio test over rows outside the working set
        let pnorm2 = p.norm();
        let mut blocking: Option<(usize, T)> = None;
        for &j in &self.excluded {
            let d = data.AI.row_dot(j, &p);
            if d <= settings.tol_ratio * data.AI.row_norm(j) * pnorm2 {
                continue;
            }
            let slack = T::max(data.BI[j] - data.AI.row_dot(j, &self.x), T::zero());
            let ratio = slack / d;
            if blocking.map_or(true, |(_, best)| ratio < best) {
                blocking = Some((j, ratio));
            }
        }

        let alpha = match (blocking, curvature_free) {
            (None, true) => return Step::Unbounded,
            (None, false) => T::one(),
            (Some((_, ratio)), true) => ratio,
            (Some((_, ratio)), false) => T::min(ratio, T::one()),
        };

        if alpha > T::zero() {
            self.x.axpby(alpha, &p, T::one());
        }
        // a zero ratio also queues the row, so a degenerate step is not retried
        if let Some((j, ratio)) = blocking {
            if curvature_free || ratio < T::one() {
                self.to_include = Some(j);
            }
        }
        self.core.info.step_length = alpha;
        Step::Continue
    }

    fn run(
        &mut self,
        timers: &mut Timers,
        start: Option<&[T]>,
    ) -> (SolverState, Vec<T>, Option<Multipliers<T>>) {
        let n = self.core.data.nvars();
        let failure = |state| (state, vec![T::nan(); n], None);

        if self.core.settings.validate && !validate_structure(&self.core.data, &self.core.settings) {
            return failure(SolverState::Invalid);
        }

        let qf = match self.qf.take() {
            Some(qf) => qf,
            None => {
                let qf;
                timeit! {timers => "factor"; {
                    qf = QFactor::analyse(&self.core.data.Q, &self.core.settings);
                }}
                qf
            }
        };

        let outcome = self.run_with_factor(timers, start, &qf);
        self.qf = Some(qf);
        outcome
    }

    fn run_with_factor(
        &mut self,
        timers: &mut Timers,
        start: Option<&[T]>,
        qf: &QFactor<T>,
    ) -> (SolverState, Vec<T>, Option<Multipliers<T>>) {
        let n = self.core.data.nvars();

        if matches!(qf.mode, QMode::Zero | QMode::Indefinite) {
            // nothing to gain from the quadratic term: solve as a linear problem
            let data = &self.core.data;
            let lp = LinearSettings::from_convex(&self.core.settings);
            let result = SimplexSolver::from_convex_data(&data.C, data, lp).solve();
            self.core.info.iterations = result.iterations;
            return (result.state, result.x, None);
        }

        if let Err(state) = self.initialise(start, qf) {
            return (state, vec![T::nan(); n], None);
        }

        let mut state = SolverState::Feasible;
        timeit! {timers => "iterate"; {
            loop {
                if let Some(reason) = self.core.check_interruption(timers) {
                    tracing::debug!(?reason, "active-set stopped early");
                    if reason == Interruption::Callback {
                        tracing::info!("active-set solve interrupted");
                    }
                    break;
                }
                self.core.info.iterations += 1;

                let step = self.iterate(qf);

                self.core.info.objective = self.core.data.objective(&self.x);
                self.core.info.active = self.included.len();
                self.core.report();

                match step {
                    Step::Continue => {}
                    Step::Optimal => {
                        state = SolverState::Optimal;
                        break;
                    }
                    Step::Unbounded => {
                        state = SolverState::Unbounded;
                        break;
                    }
                    Step::Failed => {
                        state = SolverState::Failed;
                        break;
                    }
                }
            }
        }}

        if state.is_failure() {
            return (state, vec![T::nan(); n], None);
        }

        let multipliers = Multipliers {
            equalities: self.lambda_eq.clone(),
            inequalities: self.lambda_ineq.clone(),
        };
        (state, self.x.clone(), Some(multipliers))
    }
}

impl<T> ConvexSolver<T> for ActiveSetSolver<T>
where
    T: FloatT,
{
    fn core(&self) -> &SolverCore<T> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SolverCore<T> {
        &mut self.core
    }

    fn solve(&mut self, start: Option<&[T]>) -> SolveResult<T> {
        let mut timers = self.core.begin();
        let (state, x, multipliers) = self.run(&mut timers, start);
        self.core.finish(timers, state, x, multipliers)
    }

    fn dispose(&mut self) {
        self.subsystem.clear();
        self.qf = None;
        self.core.timers = None;
    }
}

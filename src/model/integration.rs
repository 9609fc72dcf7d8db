//! Translation between models and the numeric solvers.
//!
//! A [`SolverIntegration`] decides whether it can handle a model and
//! builds a [`ModelSolver`] for it.   [`ConvexIntegration`] targets the
//! [convex solver family](crate::solver::convex): fixed variables are
//! substituted out, every remaining variable becomes a column and every
//! finite bound of a variable or constraint expression becomes a row.

#![allow(non_snake_case)]

use super::context::NumberContext;
use super::entity::{clamp, ModelEntity};
use super::error::ModelError;
use super::options::Sense;
use super::result::{BoundSide, ModelResult, RowOrigin};
use super::scaling::{scale, scale_f64, unscale_f64};
use super::{Expression, Model};
use crate::algebra::Matrix;
use crate::solver::{
    ConvexData, ConvexSolver, ConvexSolverEngine, Multipliers, SolveResult, SolverState,
};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::Arc;

/// Builds numeric solvers for models
pub trait SolverIntegration: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// `true` if this integration can solve `model`
    fn is_capable(&self, model: &Model) -> bool;

    fn build(&self, model: &Model, sense: Sense) -> Result<ModelSolver, ModelError>;
}

/// An ordered list of solver integrations.   The first capable one is
/// used.
#[derive(Debug, Clone, Default)]
pub struct Integrations {
    integrations: Vec<Arc<dyn SolverIntegration>>,
}

impl Integrations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        Self::empty().with(ConvexIntegration)
    }

    pub fn with(mut self, integration: impl SolverIntegration + 'static) -> Self {
        self.integrations.push(Arc::new(integration));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn SolverIntegration>> {
        self.integrations.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    pub(crate) fn select(&self, model: &Model) -> Result<&dyn SolverIntegration, ModelError> {
        self.integrations
            .iter()
            .find(|i| i.is_capable(model))
            .map(|i| i.as_ref())
            .ok_or(ModelError::NoCapableIntegration)
    }
}

/// Mapping from a numeric row back to its origin
#[derive(Debug, Clone)]
struct RowMap {
    origin: RowOrigin,
    exponent: i32,
}

/// Solver handle built from a model.
///
/// Holds the numeric problem and everything needed to translate
/// results back.   It does not borrow the model.
pub struct ModelSolver {
    engine: Option<ConvexSolverEngine<f64>>,
    disposed: bool,
    infeasible: bool,
    columns: Vec<usize>,
    fixed: BTreeMap<usize, Decimal>,
    bounds: Vec<(Option<Decimal>, Option<Decimal>)>,
    objective: Expression,
    objective_exponent: i32,
    equalities: Vec<RowMap>,
    inequalities: Vec<RowMap>,
    bound_rows: HashMap<(usize, BoundSide), usize>,
    context: NumberContext,
}

impl Debug for ModelSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSolver")
            .field("method", &self.method())
            .field("disposed", &self.disposed)
            .field("infeasible", &self.infeasible)
            .field("columns", &self.columns)
            .field("equalities", &self.equalities.len())
            .field("inequalities", &self.inequalities.len())
            .finish()
    }
}

impl ModelSolver {
    /// Solve, optionally starting from one value per model variable
    pub fn solve(&mut self, start: Option<&[Decimal]>) -> Result<ModelResult, ModelError> {
        if self.disposed {
            return Err(ModelError::Disposed);
        }
        let nvars = self.bounds.len();
        if let Some(s) = start {
            if s.len() != nvars {
                return Err(ModelError::StartingPointLength {
                    expected: nvars,
                    found: s.len(),
                });
            }
        }
        if self.infeasible {
            return Ok(ModelResult::with_state(SolverState::Infeasible));
        }

        let result = match self.engine.as_mut() {
            Some(engine) => {
                let x0: Option<Vec<f64>> = start.map(|s| {
                    self.columns
                        .iter()
                        .map(|&j| s[j].to_f64().unwrap_or(0.0))
                        .collect()
                });
                engine.solve(x0.as_deref())
            }
            // every variable is fixed
            None => SolveResult {
                state: SolverState::Optimal,
                value: 0.0,
                x: Vec::new(),
                multipliers: Some(Multipliers::zeros(self.equalities.len(), self.inequalities.len())),
                iterations: 0,
                solve_time: 0.0,
            },
        };
        tracing::debug!(state = %result.state, iterations = result.iterations, "model solve");
        Ok(self.translate(&result))
    }

    /// Change the bounds of one variable in place.
    ///
    /// Returns `false`, leaving the solver unchanged, when the new bounds
    /// need rows that the numeric problem does not have (or make rows
    /// unnecessary).   The model must then be prepared again.
    pub fn update(
        &mut self,
        variable: usize,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
    ) -> Result<bool, ModelError> {
        if self.disposed {
            return Err(ModelError::Disposed);
        }
        if variable >= self.bounds.len() {
            return Err(ModelError::UnknownVariable(variable));
        }
        let Some(engine) = self.engine.as_mut() else {
            return Ok(false);
        };

        let mut updates = Vec::with_capacity(2);
        for (side, value) in [(BoundSide::Lower, lower), (BoundSide::Upper, upper)] {
            match (self.bound_rows.get(&(variable, side)), value) {
                (Some(&row), Some(v)) => {
                    let rhs = v.to_f64().unwrap_or(f64::NAN);
                    let rhs = if side == BoundSide::Lower { -rhs } else { rhs };
                    updates.push((row, rhs));
                }
                (None, None) => {}
                _ => return Ok(false),
            }
        }
        for (row, rhs) in updates {
            engine.update_inequality_rhs(row, rhs)?;
        }
        self.bounds[variable] = (lower, upper);
        Ok(true)
    }

    /// Release the numeric problem.   Later calls fail with
    /// [`ModelError::Disposed`].
    pub fn dispose(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.dispose();
        }
        self.disposed = true;
    }

    /// Name of the numeric solver in use
    pub fn method(&self) -> Option<&'static str> {
        self.engine.as_ref().map(|e| e.method())
    }

    fn translate(&self, result: &SolveResult<f64>) -> ModelResult {
        if !result.state.is_feasible() {
            return ModelResult {
                iterations: result.iterations,
                ..ModelResult::with_state(result.state)
            };
        }

        let column_of: HashMap<usize, usize> =
            self.columns.iter().enumerate().map(|(c, &j)| (j, c)).collect();
        let values: Vec<Decimal> = (0..self.bounds.len())
            .map(|j| {
                let raw = match (self.fixed.get(&j), column_of.get(&j)) {
                    (Some(&v), _) => v,
                    (None, Some(&c)) => result
                        .x
                        .get(c)
                        .and_then(|&x| Decimal::from_f64(x))
                        .unwrap_or(Decimal::ZERO),
                    (None, None) => Decimal::ZERO,
                };
                let (lower, upper) = self.bounds[j];
                self.context.enforce(clamp(raw, lower, upper))
            })
            .collect();

        let value = self.context.enforce(self.objective.evaluate(&values));

        let multipliers = result.multipliers.as_ref().map(|m| {
            let unscale = |lambda: f64, row: &RowMap| {
                let mu = unscale_f64(scale_f64(lambda, row.exponent), self.objective_exponent);
                Decimal::from_f64(mu)
                    .map(|d| self.context.enforce(d))
                    .unwrap_or(Decimal::ZERO)
            };
            let eq = self.equalities.iter().zip(m.equalities.iter());
            let ineq = self.inequalities.iter().zip(m.inequalities.iter());
            eq.chain(ineq)
                .map(|(row, &lambda)| (row.origin.clone(), unscale(lambda, row)))
                .collect()
        });

        ModelResult {
            state: result.state,
            value: Some(value),
            values,
            multipliers,
            iterations: result.iterations,
        }
    }
}

/// Integration with the convex solver family.   Handles continuous
/// models with linear constraints and a linear or quadratic objective.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvexIntegration;

/// `value * 10^exponent` as a float, NaN when it does not fit
fn scaled(value: Decimal, exponent: i32) -> f64 {
    scale(value, exponent)
        .and_then(|v| v.to_f64())
        .unwrap_or(f64::NAN)
}

/// Rows of the numeric problem under construction
struct Rows {
    n: usize,
    AE: Matrix<f64>,
    BE: Vec<f64>,
    AI: Matrix<f64>,
    BI: Vec<f64>,
    equalities: Vec<RowMap>,
    inequalities: Vec<RowMap>,
}

impl Rows {
    fn new(n: usize) -> Self {
        Self {
            n,
            AE: Matrix::zeros((0, n)),
            BE: Vec::new(),
            AI: Matrix::zeros((0, n)),
            BI: Vec::new(),
            equalities: Vec::new(),
            inequalities: Vec::new(),
        }
    }

    fn equality(&mut self, row: &[f64], rhs: f64, origin: RowOrigin, exponent: i32) {
        self.AE.push_row(row);
        self.BE.push(rhs);
        self.equalities.push(RowMap { origin, exponent });
    }

    /// Adds `row * x <= rhs` and returns its index
    fn inequality(&mut self, row: &[f64], rhs: f64, origin: RowOrigin, exponent: i32) -> usize {
        self.AI.push_row(row);
        self.BI.push(rhs);
        self.inequalities.push(RowMap { origin, exponent });
        self.BI.len() - 1
    }

    fn unit(&self, column: usize, value: f64) -> Vec<f64> {
        let mut row = vec![0.0; self.n];
        row[column] = value;
        row
    }
}

/// `false` if an expression without free variables violates its bounds
fn constant_satisfies(expr: &Expression, value: Decimal, context: &NumberContext) -> bool {
    let low_ok = expr
        .lower_limit()
        .and_then(|l| l.checked_sub(context.tolerance(l)))
        .map_or(true, |t| value >= t);
    let high_ok = expr
        .upper_limit()
        .and_then(|u| u.checked_add(context.tolerance(u)))
        .map_or(true, |t| value <= t);
    low_ok && high_ok
}

impl SolverIntegration for ConvexIntegration {
    fn name(&self) -> &'static str {
        "convex"
    }

    fn is_capable(&self, model: &Model) -> bool {
        let integer = model
            .variables()
            .iter()
            .any(|v| v.is_integer() && !v.is_fixed());
        let quadratic_constraint = model.constraints().any(|(_, e)| e.is_quadratic());
        !integer && !quadratic_constraint
    }

    fn build(&self, model: &Model, sense: Sense) -> Result<ModelSolver, ModelError> {
        let categories = model.categories();
        let columns = categories.free.clone();
        let fixed = categories.fixed.clone();
        let n = columns.len();
        let column_of: HashMap<usize, usize> =
            columns.iter().enumerate().map(|(c, &j)| (j, c)).collect();
        let feasibility = model.options().feasibility;
        let mut infeasible = model.is_infeasible();

        // objective
        let objective = model.objective();
        let compensated = objective.compensate(&fixed);
        let eo = compensated.adjustment_exponent();
        let sign = match sense {
            Sense::Minimise => 1.0,
            Sense::Maximise => -1.0,
        };
        let mut Q = Matrix::zeros((n, n));
        let mut C = vec![0.0; n];
        for ((i, j), q) in compensated.quadratic_factors() {
            if let (Some(&ci), Some(&cj)) = (column_of.get(&i), column_of.get(&j)) {
                let v = sign * scaled(q, eo);
                Q[(ci, cj)] += v;
                Q[(cj, ci)] += v;
            }
        }
        for (j, c) in compensated.linear_factors() {
            if let Some(&cj) = column_of.get(&j) {
                C[cj] += sign * scaled(c, eo);
            }
        }

        // variable bounds
        let mut rows = Rows::new(n);
        let mut bound_rows = HashMap::new();
        for (c, &j) in columns.iter().enumerate() {
            let var = &model.variables()[j];
            if let Some(u) = var.upper_limit() {
                let row = rows.unit(c, 1.0);
                let origin = RowOrigin::variable(j, BoundSide::Upper);
                let k = rows.inequality(&row, scaled(u, 0), origin, 0);
                bound_rows.insert((j, BoundSide::Upper), k);
            }
            if let Some(l) = var.lower_limit() {
                let row = rows.unit(c, -1.0);
                let origin = RowOrigin::variable(j, BoundSide::Lower);
                let k = rows.inequality(&row, -scaled(l, 0), origin, 0);
                bound_rows.insert((j, BoundSide::Lower), k);
            }
        }

        // constraint expressions
        for (name, expr) in model.constraints() {
            let compensated = expr.compensate(&fixed);
            let constant = compensated.constant_value();
            if compensated.linear().is_empty() {
                infeasible |= !constant_satisfies(expr, constant, &feasibility);
                continue;
            }
            let er = compensated.adjustment_exponent();
            let mut row = vec![0.0; n];
            for (j, c) in compensated.linear_factors() {
                if let Some(&cj) = column_of.get(&j) {
                    row[cj] = scaled(c, er);
                }
            }

            if let Some(level) = expr.bounds().level() {
                let origin = RowOrigin::expression(name, BoundSide::Level);
                rows.equality(&row, scaled(level - constant, er), origin, er);
                continue;
            }
            if let Some(u) = expr.upper_limit() {
                let origin = RowOrigin::expression(name, BoundSide::Upper);
                rows.inequality(&row, scaled(u - constant, er), origin, er);
            }
            if let Some(l) = expr.lower_limit() {
                let negated: Vec<f64> = row.iter().map(|v| -v).collect();
                let origin = RowOrigin::expression(name, BoundSide::Lower);
                rows.inequality(&negated, -scaled(l - constant, er), origin, er);
            }
        }

        let Rows {
            AE,
            BE,
            AI,
            BI,
            equalities,
            inequalities,
            ..
        } = rows;
        tracing::debug!(
            columns = n,
            equalities = BE.len(),
            inequalities = BI.len(),
            fixed = fixed.len(),
            "convex integration"
        );

        let engine = if n > 0 {
            let data = ConvexData::new(Q, C, AE, BE, AI, BI)?;
            Some(ConvexSolverEngine::new(data, model.options().convex.clone()))
        } else {
            None
        };

        let bounds = model
            .variables()
            .iter()
            .map(|v| (v.lower_limit(), v.upper_limit()))
            .collect();

        Ok(ModelSolver {
            engine,
            disposed: false,
            infeasible,
            columns,
            fixed,
            bounds,
            objective,
            objective_exponent: eo,
            equalities,
            inequalities,
            bound_rows,
            context: model.options().solution,
        })
    }
}

use super::entity::ModelEntity;
use super::error::ModelError;
use super::integration::ModelSolver;
use super::options::{ModelOptions, Sense};
use super::presolve::{self, Categories};
use super::result::ModelResult;
use super::{Expression, Variable};
use crate::solver::SolverState;
use rust_decimal::Decimal;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// An optimisation model: variables, named expressions and the options
/// controlling presolve and solving.
#[derive(Debug, Clone, Default)]
pub struct Model {
    variables: Vec<Variable>,
    expressions: BTreeMap<String, Expression>,
    options: ModelOptions,
    infeasible: bool,
    categories: Option<Categories>,
}

impl Model {
    pub fn new(options: ModelOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ModelOptions {
        &mut self.options
    }

    /// Add a variable.   Its index is the number of variables added
    /// before it.
    pub fn add_variable(&mut self, name: impl Into<String>) -> &mut Variable {
        let index = self.variables.len();
        self.variables
            .push(Variable::new(index, name.into(), self.options.limits));
        self.categories = None;
        &mut self.variables[index]
    }

    /// Add an empty expression
    pub fn add_expression(&mut self, name: impl Into<String>) -> Result<&mut Expression, ModelError> {
        let name = name.into();
        let limits = self.options.limits;
        match self.expressions.entry(name) {
            Entry::Occupied(e) => Err(ModelError::DuplicateExpression(e.key().clone())),
            Entry::Vacant(e) => {
                let name = e.key().clone();
                Ok(e.insert(Expression::new(name, limits)))
            }
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, index: usize) -> Option<&Variable> {
        self.variables.get(index)
    }

    pub fn variable_mut(&mut self, index: usize) -> Option<&mut Variable> {
        self.categories = None;
        self.variables.get_mut(index)
    }

    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.expressions.get(name)
    }

    pub fn expression_mut(&mut self, name: &str) -> Option<&mut Expression> {
        self.expressions.get_mut(name)
    }

    pub fn expressions(&self) -> impl Iterator<Item = (&String, &Expression)> {
        self.expressions.iter()
    }

    /// Constraint expressions not yet found redundant
    pub fn constraints(&self) -> impl Iterator<Item = (&String, &Expression)> {
        self.expressions
            .iter()
            .filter(|(_, e)| e.is_constraint() && !e.is_redundant())
    }

    /// Variables that appear in at least one expression
    pub fn referenced_variables(&self) -> BTreeSet<usize> {
        presolve::referenced(&self.expressions)
    }

    /// Once set by presolve or validation this stays set
    pub fn is_infeasible(&self) -> bool {
        self.infeasible
    }

    /// The objective: every weighted variable and expression, each
    /// multiplied by its weight.   Built fresh on every call.
    pub fn objective(&self) -> Expression {
        let mut objective = Expression::new("objective".into(), self.options.limits);
        let mut constant = Decimal::ZERO;
        for v in self.variables.iter() {
            if let Some(w) = v.contribution_weight() {
                objective.add(v.index(), w);
            }
        }
        for e in self.expressions.values() {
            let Some(w) = e.contribution_weight() else {
                continue;
            };
            for (j, c) in e.linear_factors() {
                objective.add(j, w * c);
            }
            for ((i, j), c) in e.quadratic_factors() {
                objective.add_quadratic(i, j, w * c);
            }
            constant += w * e.constant_value();
        }
        objective.constant(constant);
        objective
    }

    /// Free, positive, negative and integer variables
    pub fn categories(&self) -> Categories {
        match self.categories {
            Some(ref c) => c.clone(),
            None => Categories::of(&self.variables),
        }
    }

    /// `true` if every variable and expression has ordered bounds and
    /// every expression refers to existing variables
    pub fn validate(&self) -> bool {
        let mut valid = true;
        for v in self.variables.iter().filter(|v| !v.validate()) {
            tracing::debug!(variable = v.index(), "lower bound above upper bound");
            valid = false;
        }
        for (name, e) in self.expressions.iter() {
            if !e.validate() {
                tracing::debug!(expression = %name, "lower bound above upper bound");
                valid = false;
            }
            if e.variables().any(|j| j >= self.variables.len()) {
                tracing::debug!(expression = %name, "unknown variable");
                valid = false;
            }
        }
        valid
    }

    /// Drop every integer restriction
    pub fn relax(&mut self) {
        for v in self.variables.iter_mut() {
            v.relax();
        }
        self.categories = None;
    }

    /// Simplify the model with the configured rules.   Returns `true` if
    /// anything changed; a second call right after returns `false`.
    pub fn presolve(&mut self) -> bool {
        if self.infeasible {
            return false;
        }
        let outcome = presolve::presolve(
            &mut self.variables,
            &mut self.expressions,
            &self.options.presolve_rules,
            self.options.feasibility,
            self.options.presolve_max_sweeps,
        );
        tracing::debug!(
            sweeps = outcome.sweeps,
            changed = outcome.changed,
            infeasible = outcome.infeasible,
            "presolve finished"
        );
        self.infeasible |= outcome.infeasible;
        self.categories = Some(Categories::of(&self.variables));
        outcome.changed
    }

    /// Validate, presolve (if enabled) and build a solver for `sense`
    pub fn prepare(&mut self, sense: Sense) -> Result<ModelSolver, ModelError> {
        self.simplify()?;
        self.build(sense)
    }

    fn simplify(&mut self) -> Result<(), ModelError> {
        if let Some(j) = self
            .expressions
            .values()
            .flat_map(|e| e.variables())
            .find(|&j| j >= self.variables.len())
        {
            return Err(ModelError::UnknownVariable(j));
        }
        if !self.validate() {
            self.infeasible = true;
        }
        if self.options.presolve_enable {
            self.presolve();
        }
        Ok(())
    }

    fn build(&self, sense: Sense) -> Result<ModelSolver, ModelError> {
        let integration = self.options.integrations.select(self)?;
        tracing::debug!(integration = integration.name(), ?sense, "building solver");
        integration.build(self, sense)
    }

    pub fn minimise(&mut self) -> Result<ModelResult, ModelError> {
        self.optimise(Sense::Minimise)
    }

    pub fn maximise(&mut self) -> Result<ModelResult, ModelError> {
        self.optimise(Sense::Maximise)
    }

    fn optimise(&mut self, sense: Sense) -> Result<ModelResult, ModelError> {
        self.simplify()?;
        if self.infeasible {
            return Ok(ModelResult::with_state(SolverState::Infeasible));
        }
        let mut solver = self.build(sense)?;
        let result = solver.solve(None)?;
        solver.dispose();
        if result.state.is_feasible() {
            for (v, &value) in self.variables.iter_mut().zip(result.values.iter()) {
                v.set_value(Some(value));
            }
        }
        Ok(result)
    }
}

//! Model simplification before the numeric solve.
//!
//! A [`PresolveRule`] inspects one expression, one variable or the whole
//! model and tightens bounds, fixes variables or marks expressions
//! redundant or infeasible.   Rules run in ascending [`order`] and the
//! sweep is repeated until nothing changes.
//!
//! [`order`]: PresolveRule::order

use super::context::NumberContext;
use super::entity::ModelEntity;
use super::{Expression, Variable};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::sync::Arc;

mod bounds;
mod objective;
mod redundancy;
mod remaining;

pub use objective::*;
pub use redundancy::*;
pub use remaining::*;

pub(crate) use bounds::*;

/// What a rule is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleTarget {
    /// each active expression in turn
    Expression,
    /// each variable in turn
    Variable,
    /// the model as a whole, once per sweep
    Model,
}

/// Mutable view of the model handed to the rules
pub struct PresolveScope<'a> {
    pub variables: &'a mut [Variable],
    pub context: NumberContext,
}

/// A presolve rule.   Each `apply_*` returns `true` if it changed
/// anything.
pub trait PresolveRule: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Rules run in ascending order
    fn order(&self) -> i32;

    fn target(&self) -> RuleTarget;

    fn apply_expression(&self, _expr: &mut Expression, _scope: &mut PresolveScope) -> bool {
        false
    }

    fn apply_variable(
        &self,
        _var: &mut Variable,
        _referenced: &BTreeSet<usize>,
        _context: &NumberContext,
    ) -> bool {
        false
    }

    fn apply_model(
        &self,
        _expressions: &mut BTreeMap<String, Expression>,
        _scope: &mut PresolveScope,
    ) -> bool {
        false
    }
}

/// An ordered list of presolve rules
#[derive(Debug, Clone, Default)]
pub struct PresolveRules {
    rules: Vec<Arc<dyn PresolveRule>>,
}

impl PresolveRules {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The rules run by default.   [`SimilarExpressions`] is not among
    /// them.
    pub fn standard() -> Self {
        Self::empty()
            .with(ObjectiveLinearisation)
            .with(ZeroRemaining)
            .with(OneRemaining)
            .with(TwoRemaining)
            .with(MultipleRemaining)
            .with(RedundantConstraint)
            .with(IntegerRounding)
            .with(UnreferencedVariable)
    }

    /// Add a rule, keeping the list sorted by order
    pub fn with(mut self, rule: impl PresolveRule + 'static) -> Self {
        self.push(Arc::new(rule));
        self
    }

    pub fn push(&mut self, rule: Arc<dyn PresolveRule>) {
        let at = self.rules.partition_point(|r| r.order() <= rule.order());
        self.rules.insert(at, rule);
    }

    /// Remove every rule called `name`
    pub fn without(mut self, name: &str) -> Self {
        self.rules.retain(|r| r.name() != name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PresolveRule>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Summary of one run of [`presolve`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct PresolveOutcome {
    pub changed: bool,
    pub infeasible: bool,
    pub sweeps: u32,
}

pub(crate) fn referenced(expressions: &BTreeMap<String, Expression>) -> BTreeSet<usize> {
    expressions.values().flat_map(|e| e.variables()).collect()
}

fn is_active(expr: &Expression) -> bool {
    !expr.is_redundant() && !expr.is_infeasible()
}

/// Apply `rules` until a full sweep changes nothing or `max_sweeps` is
/// reached, then re-check every redundant expression and every variable
/// for infeasibility.
pub(crate) fn presolve(
    variables: &mut [Variable],
    expressions: &mut BTreeMap<String, Expression>,
    rules: &PresolveRules,
    context: NumberContext,
    max_sweeps: u32,
) -> PresolveOutcome {
    let mut outcome = PresolveOutcome::default();

    while outcome.sweeps < max_sweeps {
        let mut changed = false;
        for rule in rules.iter() {
            match rule.target() {
                RuleTarget::Expression => {
                    let mut scope = PresolveScope {
                        variables: &mut *variables,
                        context,
                    };
                    for (name, expr) in expressions.iter_mut() {
                        if !is_active(expr) {
                            continue;
                        }
                        if rule.apply_expression(expr, &mut scope) {
                            tracing::debug!(rule = rule.name(), expression = %name, "presolve");
                            changed = true;
                        }
                        if expr.is_infeasible() {
                            tracing::debug!(rule = rule.name(), expression = %name, "infeasible");
                        }
                    }
                }
                RuleTarget::Variable => {
                    let refs = referenced(expressions);
                    for var in variables.iter_mut() {
                        if rule.apply_variable(var, &refs, &context) {
                            tracing::debug!(rule = rule.name(), variable = var.index(), "presolve");
                            changed = true;
                        }
                    }
                }
                RuleTarget::Model => {
                    let mut scope = PresolveScope {
                        variables: &mut *variables,
                        context,
                    };
                    if rule.apply_model(expressions, &mut scope) {
                        tracing::debug!(rule = rule.name(), "presolve");
                        changed = true;
                    }
                }
            }
        }
        outcome.sweeps += 1;
        outcome.changed |= changed;
        if !changed || expressions.values().any(|e| e.is_infeasible()) {
            break;
        }
    }

    // redundant expressions may have become infeasible through later
    // tightening of their variables
    for (name, expr) in expressions.iter_mut() {
        if expr.is_redundant() && !expr.is_infeasible() && !check_satisfiable(expr, variables, &context) {
            tracing::debug!(expression = %name, "redundant expression infeasible");
            expr.set_infeasible(true);
        }
    }

    outcome.infeasible = expressions.values().any(|e| e.is_infeasible())
        || variables.iter().any(|v| !bounds_consistent(v, &context));
    if outcome.infeasible {
        tracing::debug!("model infeasible after presolve");
    }
    outcome
}

/// `false` if the bounds of `var` are crossed by more than the tolerance
pub(crate) fn bounds_consistent(var: &Variable, context: &NumberContext) -> bool {
    match (var.lower_limit(), var.upper_limit()) {
        (Some(l), Some(u)) => l <= u || !context.is_different(l, u),
        _ => true,
    }
}

/// `false` when the range an expression can take under the current
/// variable bounds misses its own bounds entirely
fn check_satisfiable(expr: &Expression, variables: &[Variable], context: &NumberContext) -> bool {
    let Some(view) = LinearView::of(expr, variables) else {
        return true;
    };
    let (min, max) = view.range(variables);
    let low_ok = match (expr.lower_limit(), view.lower, max) {
        (Some(bound), Some(l), Some(m)) => l
            .checked_sub(context.tolerance(bound))
            .map_or(true, |t| m >= t),
        _ => true,
    };
    let high_ok = match (expr.upper_limit(), view.upper, min) {
        (Some(bound), Some(u), Some(m)) => u
            .checked_add(context.tolerance(bound))
            .map_or(true, |t| m <= t),
        _ => true,
    };
    low_ok && high_ok
}

/// Partition of the variables used when building solver data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    /// not fixed
    pub free: Vec<usize>,
    /// lower bound at least zero
    pub positive: Vec<usize>,
    /// upper bound at most zero
    pub negative: Vec<usize>,
    pub integer: Vec<usize>,
    /// fixed variables and their values
    pub fixed: BTreeMap<usize, Decimal>,
}

impl Categories {
    pub fn of(variables: &[Variable]) -> Self {
        let mut c = Self::default();
        for v in variables {
            let i = v.index();
            match v.bounds().level() {
                Some(level) => {
                    c.fixed.insert(i, level);
                }
                None => c.free.push(i),
            }
            if v.is_positive() {
                c.positive.push(i);
            }
            if v.is_negative() {
                c.negative.push(i);
            }
            if v.is_integer() {
                c.integer.push(i);
            }
        }
        c
    }
}

use super::{PresolveRule, PresolveScope, RuleTarget};
use crate::model::context::NumberContext;
use crate::model::entity::{clamp, ModelEntity};
use crate::model::{Expression, Variable};
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Moves the objective contribution of a purely linear expression onto
/// the weights of its variables and clears the expression's weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectiveLinearisation;

impl PresolveRule for ObjectiveLinearisation {
    fn name(&self) -> &'static str {
        "objective-linearisation"
    }

    fn order(&self) -> i32 {
        0
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        let Some(weight) = expr.contribution_weight() else {
            return false;
        };
        if !expr.is_linear() || !expr.constant_value().is_zero() {
            return false;
        }
        if expr.linear_factors().any(|(j, _)| j >= scope.variables.len()) {
            return false;
        }
        for (j, c) in expr.linear_factors() {
            let var = &mut scope.variables[j];
            let w = var.contribution_weight().unwrap_or(Decimal::ZERO) + weight * c;
            var.bounds_mut().set_weight(Some(w));
        }
        expr.bounds_mut().set_weight(None);
        true
    }
}

/// Fixes a variable that no expression refers to and that does not
/// contribute to the objective.   It is pinned at zero, or at the bound
/// nearest zero when zero is out of range.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnreferencedVariable;

impl PresolveRule for UnreferencedVariable {
    fn name(&self) -> &'static str {
        "unreferenced-variable"
    }

    fn order(&self) -> i32 {
        90
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Variable
    }

    fn apply_variable(
        &self,
        var: &mut Variable,
        referenced: &BTreeSet<usize>,
        _context: &NumberContext,
    ) -> bool {
        if referenced.contains(&var.index()) || var.is_objective() || var.is_fixed() {
            return false;
        }
        if !var.validate() {
            return false;
        }
        let level = clamp(Decimal::ZERO, var.lower_limit(), var.upper_limit());
        var.level(level);
        true
    }
}

//! Rules keyed on the number of variables of a linear constraint that
//! are not yet fixed.

use super::{divide_bounds, term_bounds, term_range, tighten, LinearView};
use super::{PresolveRule, PresolveScope, RuleTarget};
use crate::model::entity::ModelEntity;
use crate::model::Expression;
use rust_decimal::Decimal;

fn constraint_view(expr: &Expression, scope: &PresolveScope) -> Option<LinearView> {
    if !expr.is_constraint() {
        return None;
    }
    LinearView::of(expr, scope.variables)
}

/// Every variable is fixed.   The constraint is redundant, or
/// infeasible if the fixed values violate it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroRemaining;

impl PresolveRule for ZeroRemaining {
    fn name(&self) -> &'static str {
        "zero-remaining"
    }

    fn order(&self) -> i32 {
        10
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        let Some(view) = constraint_view(expr, scope) else {
            return false;
        };
        if !view.remaining.is_empty() {
            return false;
        }
        let tol = scope.context.tolerance(view.fixed);
        let feasible = view.lower.map_or(true, |l| l <= tol) && view.upper.map_or(true, |u| u >= -tol);
        expr.set_redundant(true);
        expr.set_infeasible(!feasible);
        true
    }
}

/// A single variable remains.   The constraint becomes a bound on that
/// variable and is marked redundant.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneRemaining;

impl PresolveRule for OneRemaining {
    fn name(&self) -> &'static str {
        "one-remaining"
    }

    fn order(&self) -> i32 {
        20
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        let Some(view) = constraint_view(expr, scope) else {
            return false;
        };
        let &[(j, c)] = view.remaining.as_slice() else {
            return false;
        };
        let (lo, hi) = divide_bounds(c, view.lower, view.upper);
        let result = tighten(&mut scope.variables[j], lo, hi, &scope.context);
        if result.infeasible {
            expr.set_infeasible(true);
        } else {
            expr.set_redundant(true);
        }
        true
    }
}

/// Two variables remain.   Each one's bounds are tightened using the
/// range of the other.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoRemaining;

impl PresolveRule for TwoRemaining {
    fn name(&self) -> &'static str {
        "two-remaining"
    }

    fn order(&self) -> i32 {
        30
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        let Some(view) = constraint_view(expr, scope) else {
            return false;
        };
        if view.remaining.len() != 2 {
            return false;
        }
        let mut changed = false;
        for &(j, c) in view.remaining.iter() {
            let (lo, hi) = term_bounds(&view, scope.variables, j);
            let (lo, hi) = divide_bounds(c, lo, hi);
            let result = tighten(&mut scope.variables[j], lo, hi, &scope.context);
            changed |= result.changed;
            if result.infeasible {
                expr.set_infeasible(true);
                return true;
            }
        }
        changed
    }
}

/// Three or more variables remain.   When no term can be negative (or
/// none positive) a binary variable whose coefficient alone would break
/// the opposite bound is fixed at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultipleRemaining;

impl PresolveRule for MultipleRemaining {
    fn name(&self) -> &'static str {
        "multiple-remaining"
    }

    fn order(&self) -> i32 {
        40
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        let Some(view) = constraint_view(expr, scope) else {
            return false;
        };
        if view.remaining.len() < 3 {
            return false;
        }
        let eps = scope.context.epsilon();
        let ranges: Vec<_> = view
            .remaining
            .iter()
            .map(|&(j, c)| term_range(c, &scope.variables[j]))
            .collect();

        let never_negative = ranges.iter().all(|(lo, _)| lo.map_or(false, |l| l >= Decimal::ZERO));
        let never_positive = ranges.iter().all(|(_, hi)| hi.map_or(false, |h| h <= Decimal::ZERO));

        let mut to_fix = Vec::new();
        if never_negative {
            if let Some(upper) = view.upper {
                for &(j, c) in view.remaining.iter() {
                    if !scope.variables[j].is_binary() || c <= Decimal::ZERO {
                        continue;
                    }
                    let (others_min, _) = view.range_except(scope.variables, j);
                    if others_min.map_or(false, |m| c + m > upper + eps) {
                        to_fix.push(j);
                    }
                }
            }
        }
        if never_positive {
            if let Some(lower) = view.lower {
                for &(j, c) in view.remaining.iter() {
                    if !scope.variables[j].is_binary() || c >= Decimal::ZERO {
                        continue;
                    }
                    let (_, others_max) = view.range_except(scope.variables, j);
                    if others_max.map_or(false, |m| c + m < lower - eps) {
                        to_fix.push(j);
                    }
                }
            }
        }

        for &j in to_fix.iter() {
            scope.variables[j].level(Decimal::ZERO);
        }
        !to_fix.is_empty()
    }
}

use super::{LinearView, PresolveRule, PresolveScope, RuleTarget};
use crate::model::entity::ModelEntity;
use crate::model::Expression;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Marks a constraint redundant when the bounds of its variables already
/// imply its own bounds, and infeasible when they rule them out.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedundantConstraint;

impl PresolveRule for RedundantConstraint {
    fn name(&self) -> &'static str {
        "redundant-constraint"
    }

    fn order(&self) -> i32 {
        50
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        if !expr.is_constraint() {
            return false;
        }
        let Some(view) = LinearView::of(expr, scope.variables) else {
            return false;
        };
        let (min, max) = view.range(scope.variables);
        let context = scope.context;
        let violates_lower = match (expr.lower_limit(), view.lower, max) {
            (Some(bound), Some(l), Some(m)) => l
                .checked_sub(context.tolerance(bound))
                .map_or(false, |t| m < t),
            _ => false,
        };
        let violates_upper = match (expr.upper_limit(), view.upper, min) {
            (Some(bound), Some(u), Some(m)) => u
                .checked_add(context.tolerance(bound))
                .map_or(false, |t| m > t),
            _ => false,
        };
        if violates_lower || violates_upper {
            expr.set_infeasible(true);
            return true;
        }

        let lower_implied = match (view.lower, min) {
            (None, _) => true,
            (Some(l), Some(m)) => m >= l,
            _ => false,
        };
        let upper_implied = match (view.upper, max) {
            (None, _) => true,
            (Some(u), Some(m)) => m <= u,
            _ => false,
        };
        if lower_implied && upper_implied {
            expr.set_redundant(true);
            return true;
        }
        false
    }
}

/// Decimal places beyond which coefficients are not considered
const MAX_SCALE: u32 = 8;

/// Largest scaled integer coefficient considered
const MAX_NUMERATOR: i128 = 1_000_000_000_000;

fn gcd(mut a: i128, mut b: i128) -> i128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.abs()
}

/// For a constraint over integer variables only, every achievable value
/// is a multiple of the greatest common divisor `g` of its coefficients.
/// The bounds are rounded inwards to multiples of `g` and the expression
/// is flagged integral.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerRounding;

impl IntegerRounding {
    /// Greatest common divisor of the coefficients as a decimal
    fn divisor(coefficients: impl Iterator<Item = Decimal> + Clone) -> Option<Decimal> {
        let scale = coefficients.clone().map(|c| c.normalize().scale()).max()?;
        if scale > MAX_SCALE {
            return None;
        }
        let mut g = 0_i128;
        for c in coefficients {
            let mut c = c.normalize();
            c.rescale(scale);
            let k = c.mantissa();
            if k.abs() > MAX_NUMERATOR {
                return None;
            }
            g = gcd(g, k);
        }
        if g == 0 {
            return None;
        }
        Some(Decimal::from_i128_with_scale(g, scale))
    }
}

impl PresolveRule for IntegerRounding {
    fn name(&self) -> &'static str {
        "integer-rounding"
    }

    fn order(&self) -> i32 {
        60
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Expression
    }

    fn apply_expression(&self, expr: &mut Expression, scope: &mut PresolveScope) -> bool {
        if !expr.is_constraint() || expr.is_integer() {
            return false;
        }
        let Some(view) = LinearView::of(expr, scope.variables) else {
            return false;
        };
        if view.remaining.is_empty()
            || view
                .remaining
                .iter()
                .any(|&(j, _)| !scope.variables[j].is_integer())
        {
            return false;
        }
        let Some(unit) = Self::divisor(view.remaining.iter().map(|&(_, c)| c)) else {
            return false;
        };
        let eps = scope.context.epsilon();

        let lower = view
            .lower
            .and_then(|l| Some(((l - eps).checked_div(unit)?).ceil() * unit + view.fixed));
        let upper = view
            .upper
            .and_then(|u| Some(((u + eps).checked_div(unit)?).floor() * unit + view.fixed));

        if let (Some(l), Some(u)) = (lower, upper) {
            if l > u {
                expr.set_infeasible(true);
                return true;
            }
        }
        let bounds = expr.bounds_mut();
        if view.lower.is_some() {
            bounds.lower = lower.or(bounds.lower);
        }
        if view.upper.is_some() {
            bounds.upper = upper.or(bounds.upper);
        }
        expr.set_integer(true);
        true
    }
}

/// Merges constraints over the same variables whose coefficients are
/// scalar multiples of one another.   The weaker one is marked redundant.
/// Not part of [`PresolveRules::standard`](super::PresolveRules::standard).
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarExpressions;

impl SimilarExpressions {
    /// `r` such that `b = r * a`, if one exists
    fn ratio(a: &Expression, b: &Expression) -> Option<Decimal> {
        if a.linear().len() != b.linear().len() || a.linear().is_empty() {
            return None;
        }
        let mut ratio = None;
        for ((ja, ca), (jb, cb)) in a.linear_factors().zip(b.linear_factors()) {
            if ja != jb {
                return None;
            }
            let r = cb.checked_div(ca)?;
            match ratio {
                None => ratio = Some(r),
                Some(q) if q == r => {}
                Some(_) => return None,
            }
        }
        ratio
    }

    fn eligible(e: &Expression) -> bool {
        e.is_constraint()
            && e.is_linear()
            && e.constant_value().is_zero()
            && !e.is_redundant()
            && !e.is_infeasible()
    }
}

impl PresolveRule for SimilarExpressions {
    fn name(&self) -> &'static str {
        "similar-expressions"
    }

    fn order(&self) -> i32 {
        100
    }

    fn target(&self) -> RuleTarget {
        RuleTarget::Model
    }

    fn apply_model(
        &self,
        expressions: &mut BTreeMap<String, Expression>,
        scope: &mut PresolveScope,
    ) -> bool {
        let names: Vec<String> = expressions
            .iter()
            .filter(|(_, e)| Self::eligible(e))
            .map(|(n, _)| n.clone())
            .collect();

        let mut changed = false;
        for (i, keep) in names.iter().enumerate() {
            for other in names[i + 1..].iter() {
                let (Some(a), Some(b)) = (expressions.get(keep), expressions.get(other)) else {
                    continue;
                };
                if !Self::eligible(a) || !Self::eligible(b) {
                    continue;
                }
                let Some(r) = Self::ratio(a, b) else {
                    continue;
                };
                // bounds of `b` expressed on `a`
                let (lo, hi) = super::divide_bounds(r, b.lower_limit(), b.upper_limit());
                let lower = match (a.lower_limit(), lo) {
                    (Some(x), Some(y)) => Some(x.max(y)),
                    (x, y) => x.or(y),
                };
                let upper = match (a.upper_limit(), hi) {
                    (Some(x), Some(y)) => Some(x.min(y)),
                    (x, y) => x.or(y),
                };
                let crossed = match (lower, upper) {
                    (Some(l), Some(u)) => scope.context.is_different(l, u) && l > u,
                    _ => false,
                };

                if let Some(a) = expressions.get_mut(keep) {
                    let bounds = a.bounds_mut();
                    bounds.lower = lower;
                    bounds.upper = upper;
                    if crossed {
                        a.set_infeasible(true);
                    }
                }
                if let Some(b) = expressions.get_mut(other) {
                    b.set_redundant(true);
                }
                changed = true;
            }
        }
        changed
    }
}

use crate::model::context::NumberContext;
use crate::model::entity::{clamp, ModelEntity};
use crate::model::{Expression, Variable};
use rust_decimal::Decimal;

/// A linear constraint with fixed variables folded into its bounds:
/// `lower <= sum(c_j * x_j for remaining j) <= upper`.
#[derive(Debug, Clone)]
pub(crate) struct LinearView {
    /// constant plus the contribution of fixed variables
    pub fixed: Decimal,
    /// non-fixed variables and their coefficients
    pub remaining: Vec<(usize, Decimal)>,
    pub lower: Option<Decimal>,
    pub upper: Option<Decimal>,
}

impl LinearView {
    /// `None` for quadratic expressions or on overflow
    pub fn of(expr: &Expression, variables: &[Variable]) -> Option<Self> {
        if expr.is_quadratic() {
            return None;
        }
        let mut fixed = expr.constant_value();
        let mut remaining = Vec::new();
        for (j, c) in expr.linear_factors() {
            let var = variables.get(j)?;
            match var.bounds().level() {
                Some(v) => fixed = fixed.checked_add(c.checked_mul(v)?)?,
                None => remaining.push((j, c)),
            }
        }
        let lower = match expr.lower_limit() {
            Some(l) => Some(l.checked_sub(fixed)?),
            None => None,
        };
        let upper = match expr.upper_limit() {
            Some(u) => Some(u.checked_sub(fixed)?),
            None => None,
        };
        Some(Self {
            fixed,
            remaining,
            lower,
            upper,
        })
    }

    /// Range of the remaining sum, `None` meaning unbounded on that side
    pub fn range(&self, variables: &[Variable]) -> (Option<Decimal>, Option<Decimal>) {
        self.range_except(variables, usize::MAX)
    }

    /// Range of the remaining sum without the term for `skip`
    pub fn range_except(
        &self,
        variables: &[Variable],
        skip: usize,
    ) -> (Option<Decimal>, Option<Decimal>) {
        let mut min = Some(Decimal::ZERO);
        let mut max = Some(Decimal::ZERO);
        for &(j, c) in self.remaining.iter().filter(|(j, _)| *j != skip) {
            let (lo, hi) = term_range(c, &variables[j]);
            min = add(min, lo);
            max = add(max, hi);
        }
        (min, max)
    }
}

fn add(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_add(b?)
}

fn sub(a: Option<Decimal>, b: Option<Decimal>) -> Option<Decimal> {
    a?.checked_sub(b?)
}

/// Range of `c * x` over the bounds of `x`
pub(crate) fn term_range(c: Decimal, var: &Variable) -> (Option<Decimal>, Option<Decimal>) {
    let lo = var.lower_limit().and_then(|l| c.checked_mul(l));
    let hi = var.upper_limit().and_then(|u| c.checked_mul(u));
    if c.is_sign_negative() {
        (hi, lo)
    } else {
        (lo, hi)
    }
}

/// Bounds on `x` implied by `lower <= c * x <= upper`
pub(crate) fn divide_bounds(
    c: Decimal,
    lower: Option<Decimal>,
    upper: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    let lo = lower.and_then(|l| l.checked_div(c));
    let hi = upper.and_then(|u| u.checked_div(c));
    if c.is_sign_negative() {
        (hi, lo)
    } else {
        (lo, hi)
    }
}

/// Bounds on term `c * x_j` implied by the rest of the expression
pub(crate) fn term_bounds(
    view: &LinearView,
    variables: &[Variable],
    j: usize,
) -> (Option<Decimal>, Option<Decimal>) {
    let (others_min, others_max) = view.range_except(variables, j);
    (sub(view.lower, others_max), sub(view.upper, others_min))
}

/// Result of tightening the bounds of one variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Tightening {
    pub changed: bool,
    pub infeasible: bool,
}

/// Intersect the bounds of `var` with `[lo, hi]`.
///
/// A range narrower than the tolerance fixes the variable.   Otherwise
/// the derived bounds are rounded outwards to the context scale, and to
/// whole numbers for integer variables.
pub(crate) fn tighten(
    var: &mut Variable,
    lo: Option<Decimal>,
    hi: Option<Decimal>,
    context: &NumberContext,
) -> Tightening {
    let eps = context.epsilon();
    let old_lower = var.lower_limit();
    let old_upper = var.upper_limit();

    if let (Some(l), Some(u)) = (lo, hi) {
        if !context.is_different(l, u) {
            // unrounded, so the constraint that fixed it holds exactly
            let level = if var.is_integer() { l.round() } else { l };
            let fits = old_lower.map_or(true, |ol| level >= ol - eps)
                && old_upper.map_or(true, |ou| level <= ou + eps);
            if !fits {
                return Tightening {
                    changed: false,
                    infeasible: true,
                };
            }
            let level = clamp(level, old_lower, old_upper);
            if var.bounds().level() == Some(level) {
                return Tightening::default();
            }
            var.level(level);
            return Tightening {
                changed: true,
                infeasible: false,
            };
        }
    }

    let mut lo = lo.map(|l| context.floor(l));
    let mut hi = hi.map(|u| context.ceil(u));
    if var.is_integer() {
        lo = lo.map(|l| (l - eps).ceil());
        hi = hi.map(|u| (u + eps).floor());
    }

    let mut result = Tightening::default();
    if let Some(l) = lo {
        if old_lower.map_or(true, |ol| l > ol + eps) {
            var.lower(l);
            result.changed = true;
        }
    }
    if let Some(u) = hi {
        if old_upper.map_or(true, |ou| u < ou - eps) {
            var.upper(u);
            result.changed = true;
        }
    }
    if let (Some(l), Some(u)) = (var.lower_limit(), var.upper_limit()) {
        if l > u {
            if context.is_different(l, u) {
                result.infeasible = true;
            } else {
                var.level(l.min(u));
            }
        } else if l < u && !context.is_different(l, u) {
            var.level(l);
        }
    }
    result
}

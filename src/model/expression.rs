use super::coefficients::Coefficients;
use super::entity::{EntityBounds, Limits, ModelEntity};
use super::scaling;
use super::variable::Variable;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Anything that identifies a variable: its index or the variable itself
pub trait VariableKey {
    fn variable_index(&self) -> usize;
}

impl VariableKey for usize {
    fn variable_index(&self) -> usize {
        *self
    }
}

impl VariableKey for &Variable {
    fn variable_index(&self) -> usize {
        self.index()
    }
}

/// A named linear or quadratic function of the model variables.
///
/// Bounds turn the expression into a constraint and a weight makes it
/// contribute to the objective.   The quadratic part is keyed by ordered
/// index pairs: setting `(i, j)` says nothing about `(j, i)`.
#[derive(Debug, Clone)]
pub struct Expression {
    name: String,
    bounds: EntityBounds,
    constant: Option<Decimal>,
    linear: Coefficients<usize>,
    quadratic: Coefficients<(usize, usize)>,
    integer: bool,
    redundant: bool,
    infeasible: bool,
    exponent: OnceLock<i32>,
}

impl Expression {
    pub(crate) fn new(name: String, limits: Limits) -> Self {
        Self {
            name,
            bounds: EntityBounds::new(limits),
            constant: None,
            linear: Coefficients::new(),
            quadratic: Coefficients::new(),
            integer: false,
            redundant: false,
            infeasible: false,
            exponent: OnceLock::new(),
        }
    }

    fn touched(&mut self) {
        self.exponent.take();
    }

    /// Set the linear coefficient of `var`, zero removes it
    pub fn set(&mut self, var: impl VariableKey, value: impl Into<Decimal>) -> &mut Self {
        self.linear.set(var.variable_index(), value.into());
        self.touched();
        self
    }

    /// Add to the linear coefficient of `var`
    pub fn add(&mut self, var: impl VariableKey, value: impl Into<Decimal>) -> &mut Self {
        self.linear.add(var.variable_index(), value.into());
        self.touched();
        self
    }

    /// Set the coefficient of `row * col`, zero removes it
    pub fn set_quadratic(
        &mut self,
        row: impl VariableKey,
        col: impl VariableKey,
        value: impl Into<Decimal>,
    ) -> &mut Self {
        let key = (row.variable_index(), col.variable_index());
        self.quadratic.set(key, value.into());
        self.touched();
        self
    }

    /// Add to the coefficient of `row * col`
    pub fn add_quadratic(
        &mut self,
        row: impl VariableKey,
        col: impl VariableKey,
        value: impl Into<Decimal>,
    ) -> &mut Self {
        let key = (row.variable_index(), col.variable_index());
        self.quadratic.add(key, value.into());
        self.touched();
        self
    }

    /// Set the constant term, zero clears it
    pub fn constant(&mut self, value: impl Into<Decimal>) -> &mut Self {
        let value = value.into();
        self.constant = if value.is_zero() { None } else { Some(value) };
        self
    }

    pub fn get(&self, var: impl VariableKey) -> Decimal {
        self.linear.get(&var.variable_index())
    }

    pub fn get_quadratic(&self, row: impl VariableKey, col: impl VariableKey) -> Decimal {
        self.quadratic
            .get(&(row.variable_index(), col.variable_index()))
    }

    pub fn constant_value(&self) -> Decimal {
        self.constant.unwrap_or(Decimal::ZERO)
    }

    pub fn linear_factors(&self) -> impl Iterator<Item = (usize, Decimal)> + '_ {
        self.linear.iter().map(|(&k, &v)| (k, v))
    }

    pub fn quadratic_factors(&self) -> impl Iterator<Item = ((usize, usize), Decimal)> + '_ {
        self.quadratic.iter().map(|(&k, &v)| (k, v))
    }

    pub fn linear(&self) -> &Coefficients<usize> {
        &self.linear
    }

    pub fn quadratic(&self) -> &Coefficients<(usize, usize)> {
        &self.quadratic
    }

    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty()
    }

    /// `true` if any quadratic factor is present
    pub fn is_quadratic(&self) -> bool {
        !self.quadratic.is_empty()
    }

    /// Every variable index this expression refers to
    pub fn variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.linear
            .keys()
            .copied()
            .chain(self.quadratic.keys().flat_map(|&(i, j)| [i, j]))
    }

    pub fn is_redundant(&self) -> bool {
        self.redundant
    }

    pub fn is_infeasible(&self) -> bool {
        self.infeasible
    }

    pub(crate) fn set_integer(&mut self, flag: bool) {
        self.integer = flag;
        self.touched();
    }

    pub(crate) fn set_redundant(&mut self, flag: bool) {
        self.redundant = flag;
    }

    pub(crate) fn set_infeasible(&mut self, flag: bool) {
        self.infeasible = flag;
    }

    /// Copy sharing the coefficient tables with `self` until either side
    /// modifies them
    pub fn shallow_copy(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Copy with coefficient tables of its own
    pub fn deep_copy(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            linear: self.linear.deep_copy(),
            quadratic: self.quadratic.deep_copy(),
            ..self.clone()
        }
    }

    /// Value of the expression with `values[i]` for variable `i`.
    /// Missing variables count as zero.
    pub fn evaluate(&self, values: &[Decimal]) -> Decimal {
        let at = |i: usize| values.get(i).copied().unwrap_or(Decimal::ZERO);
        let mut sum = self.constant_value();
        for (&j, &c) in self.linear.iter() {
            sum += c * at(j);
        }
        for (&(i, j), &c) in self.quadratic.iter() {
            sum += c * at(i) * at(j);
        }
        sum
    }

    /// Power of ten applied to this expression's coefficients when
    /// sent to a floating point solver.   Zero for integer expressions.
    pub fn adjustment_exponent(&self) -> i32 {
        *self.exponent.get_or_init(|| {
            if self.integer {
                return 0;
            }
            let range = [self.linear.magnitude_range(), self.quadratic.magnitude_range()]
                .into_iter()
                .flatten()
                .reduce(|(h0, l0), (h1, l1)| (h0.max(h1), l0.min(l1)));
            match range {
                Some((largest, smallest)) => scaling::adjustment_exponent(largest, smallest),
                None => 0,
            }
        })
    }

    /// Copy with every variable in `fixed` replaced by its value
    pub fn compensate(&self, fixed: &BTreeMap<usize, Decimal>) -> Self {
        if fixed.is_empty() || !self.variables().any(|j| fixed.contains_key(&j)) {
            return self.shallow_copy(self.name.clone());
        }
        let mut out = Self::new(self.name.clone(), self.bounds.limits);
        out.bounds = self.bounds.clone();
        out.integer = self.integer;
        out.redundant = self.redundant;
        out.infeasible = self.infeasible;

        let mut constant = self.constant_value();
        for (&j, &c) in self.linear.iter() {
            match fixed.get(&j) {
                Some(&v) => constant += c * v,
                None => out.linear.add(j, c),
            }
        }
        for (&(i, j), &c) in self.quadratic.iter() {
            match (fixed.get(&i), fixed.get(&j)) {
                (Some(&vi), Some(&vj)) => constant += c * vi * vj,
                (Some(&vi), None) => out.linear.add(j, c * vi),
                (None, Some(&vj)) => out.linear.add(i, c * vj),
                (None, None) => out.quadratic.add((i, j), c),
            }
        }
        out.constant(constant);
        out
    }
}

impl ModelEntity for Expression {
    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self) -> &EntityBounds {
        &self.bounds
    }

    fn bounds_mut(&mut self) -> &mut EntityBounds {
        &mut self.bounds
    }

    fn is_integer(&self) -> bool {
        self.integer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_expression_factors() {
        let x = Variable::new(0, "x".into(), Limits::default());
        let mut e = Expression::new("e".into(), Limits::default());

        e.set(&x, 2).add(1, dec!(0.5)).add(1, dec!(0.5));
        e.set_quadratic(&x, 1, 3).constant(4);
        assert_eq!(e.get(0), dec!(2));
        assert_eq!(e.get(1), dec!(1));
        assert_eq!(e.get_quadratic(0, 1), dec!(3));
        assert_eq!(e.get_quadratic(1, 0), Decimal::ZERO);
        assert!(e.is_quadratic());

        // 4 + 2*1 + 1*2 + 3*1*2
        assert_eq!(e.evaluate(&[dec!(1), dec!(2)]), dec!(14));

        e.set(0, 0);
        assert_eq!(e.linear().len(), 1);
    }

    #[test]
    fn test_copies() {
        let mut e = Expression::new("e".into(), Limits::default());
        e.set(0, 1).set(1, 2).upper(10);

        let mut s = e.shallow_copy("s");
        assert!(s.linear().is_shared_with(e.linear()));
        s.lower(1);
        assert!(s.linear().is_shared_with(e.linear()));
        assert_eq!(e.lower_limit(), None);

        s.set(2, 5);
        assert!(!s.linear().is_shared_with(e.linear()));
        assert_eq!(e.get(2), Decimal::ZERO);

        let d = e.deep_copy("d");
        assert!(!d.linear().is_shared_with(e.linear()));
        assert_eq!(d.get(1), dec!(2));
    }

    #[test]
    fn test_compensate() {
        let mut e = Expression::new("e".into(), Limits::default());
        e.set(0, 1).set(1, 2).set_quadratic(0, 1, 3).set_quadratic(1, 1, 1);

        let fixed = BTreeMap::from([(1, dec!(2))]);
        let c = e.compensate(&fixed);
        // x0 + 4 + 6*x0 + 4
        assert_eq!(c.get(0), dec!(7));
        assert_eq!(c.get(1), Decimal::ZERO);
        assert_eq!(c.constant_value(), dec!(8));
        assert!(c.is_linear());
        assert_eq!(
            c.evaluate(&[dec!(1.5)]),
            e.evaluate(&[dec!(1.5), dec!(2)])
        );
    }

    #[test]
    fn test_exponent_cache() {
        let mut e = Expression::new("e".into(), Limits::default());
        e.set(0, 1000);
        assert_eq!(e.adjustment_exponent(), -3);
        e.set(0, dec!(0.001));
        assert_eq!(e.adjustment_exponent(), 3);
        e.set_integer(true);
        assert_eq!(e.adjustment_exponent(), 0);
    }
}

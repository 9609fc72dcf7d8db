use super::entity::{EntityBounds, Limits, ModelEntity};
use rust_decimal::Decimal;

/// A decision variable.
///
/// Created through [`Model::add_variable`](crate::model::Model::add_variable);
/// its index is its position in the model and never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    index: usize,
    name: String,
    bounds: EntityBounds,
    integer: bool,
    value: Option<Decimal>,
}

impl Variable {
    pub(crate) fn new(index: usize, name: String, limits: Limits) -> Self {
        Self {
            index,
            name,
            bounds: EntityBounds::new(limits),
            integer: false,
            value: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Restrict the variable to integer values
    pub fn integer(&mut self, flag: bool) -> &mut Self {
        self.integer = flag;
        self
    }

    /// Integer variable bounded to `[0, 1]`
    pub fn binary(&mut self) -> &mut Self {
        self.integer(true).lower(0).upper(1)
    }

    pub fn is_binary(&self) -> bool {
        self.integer
            && self.bounds.lower == Some(Decimal::ZERO)
            && self.bounds.upper == Some(Decimal::ONE)
    }

    /// Current value, from a solution or from presolve
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    pub fn set_value(&mut self, value: Option<Decimal>) {
        self.value = value;
    }

    /// Lower bound is at least zero
    pub fn is_positive(&self) -> bool {
        self.bounds.lower.map_or(false, |l| !l.is_sign_negative())
    }

    /// Upper bound is at most zero
    pub fn is_negative(&self) -> bool {
        self.bounds
            .upper
            .map_or(false, |u| u.is_sign_negative() || u.is_zero())
    }

    /// Drop the integer restriction
    pub fn relax(&mut self) {
        self.integer = false;
    }
}

impl ModelEntity for Variable {
    fn name(&self) -> &str {
        &self.name
    }

    fn bounds(&self) -> &EntityBounds {
        &self.bounds
    }

    fn bounds_mut(&mut self) -> &mut EntityBounds {
        &mut self.bounds
    }

    fn on_fixed(&mut self, level: Decimal) {
        self.value = Some(level);
    }

    fn is_integer(&self) -> bool {
        self.integer
    }
}

#[test]
fn test_variable_bounds() {
    use rust_decimal_macros::dec;

    let mut x = Variable::new(3, "x".into(), Limits::default());
    assert_eq!(x.index(), 3);
    assert!(!x.is_constraint());

    x.lower(dec!(1.5)).upper(2.5).weight(0);
    assert_eq!(x.lower_limit(), Some(dec!(1.5)));
    assert_eq!(x.upper_limit(), Some(dec!(2.5)));
    assert!(!x.is_objective());
    assert!(x.validate());
    assert!(x.is_positive());

    x.lower(3);
    assert!(!x.validate());

    x.upper(3);
    assert!(x.is_fixed());
    assert_eq!(x.value(), Some(dec!(3)));

    x.binary();
    assert!(x.is_binary());
    x.relax();
    assert!(!x.is_integer());

    x.upper(1e20);
    assert_eq!(x.upper_limit(), None);
}

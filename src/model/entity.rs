use num_traits::FromPrimitive;
use rust_decimal::Decimal;

/// Magnitude thresholds used to normalise bound and weight values.
///
/// A value at least as large as `largest` means "no limit" and a value
/// no larger than `smallest` is taken to be exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub largest: Decimal,
    pub smallest: Decimal,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            largest: Decimal::from(1_000_000_000_000_000_i64),
            smallest: Decimal::new(1, 15),
        }
    }
}

impl Limits {
    /// Normalise an exact value
    pub fn normalise(&self, value: Decimal) -> Option<Decimal> {
        let magnitude = value.abs();
        if magnitude >= self.largest {
            None
        } else if magnitude <= self.smallest {
            Some(Decimal::ZERO)
        } else {
            Some(value)
        }
    }

    /// Normalise a binary floating point value
    pub fn normalise_f64(&self, value: f64) -> Option<Decimal> {
        if !value.is_finite() {
            return None;
        }
        match Decimal::from_f64(value) {
            Some(d) => self.normalise(d),
            // does not fit in a decimal, so it is far beyond `largest`
            None => None,
        }
    }
}

/// Values accepted by the bound and weight setters.
///
/// A [`Decimal`] is taken as given.   Every other type is normalised
/// against the model's [`Limits`], and `None` clears the limit.
pub trait IntoLimit {
    fn into_limit(self, limits: &Limits) -> Option<Decimal>;
}

impl IntoLimit for Decimal {
    fn into_limit(self, _limits: &Limits) -> Option<Decimal> {
        Some(self)
    }
}

impl IntoLimit for f64 {
    fn into_limit(self, limits: &Limits) -> Option<Decimal> {
        limits.normalise_f64(self)
    }
}

impl IntoLimit for f32 {
    fn into_limit(self, limits: &Limits) -> Option<Decimal> {
        limits.normalise_f64(self as f64)
    }
}

macro_rules! impl_into_limit_int {
    ($($t:ty),+) => {
        $(
            impl IntoLimit for $t {
                fn into_limit(self, limits: &Limits) -> Option<Decimal> {
                    limits.normalise(Decimal::from(self))
                }
            }
        )+
    };
}
impl_into_limit_int!(i32, i64, u32, u64, usize);

impl<V: IntoLimit> IntoLimit for Option<V> {
    fn into_limit(self, limits: &Limits) -> Option<Decimal> {
        self.and_then(|v| v.into_limit(limits))
    }
}

/// Bounds and objective weight carried by every model entity
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityBounds {
    pub(crate) lower: Option<Decimal>,
    pub(crate) upper: Option<Decimal>,
    pub(crate) weight: Option<Decimal>,
    pub(crate) limits: Limits,
}

impl EntityBounds {
    pub(crate) fn new(limits: Limits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn lower(&self) -> Option<Decimal> {
        self.lower
    }

    pub fn upper(&self) -> Option<Decimal> {
        self.upper
    }

    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// The common level when both bounds are set and equal
    pub fn level(&self) -> Option<Decimal> {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) if l == u => Some(l),
            _ => None,
        }
    }

    /// `false` when both bounds are set and out of order
    pub fn is_valid(&self) -> bool {
        match (self.lower, self.upper) {
            (Some(l), Some(u)) => l <= u,
            _ => true,
        }
    }

    /// Sets the weight, with zero meaning "no contribution"
    pub(crate) fn set_weight(&mut self, weight: Option<Decimal>) {
        self.weight = weight.filter(|w| !w.is_zero());
    }
}

/// A model entity with bounds and an objective weight.
///
/// Implemented by [`Variable`](crate::model::Variable) and
/// [`Expression`](crate::model::Expression).   The setters accept
/// anything that implements [`IntoLimit`] and can be chained.
pub trait ModelEntity {
    fn name(&self) -> &str;
    fn bounds(&self) -> &EntityBounds;
    fn bounds_mut(&mut self) -> &mut EntityBounds;

    /// Called whenever the entity becomes fixed at `level`
    fn on_fixed(&mut self, _level: Decimal) {}

    fn is_integer(&self) -> bool;

    fn lower(&mut self, value: impl IntoLimit) -> &mut Self
    where
        Self: Sized,
    {
        let limits = *self.bounds().limits();
        self.bounds_mut().lower = value.into_limit(&limits);
        self.check_fixed();
        self
    }

    fn upper(&mut self, value: impl IntoLimit) -> &mut Self
    where
        Self: Sized,
    {
        let limits = *self.bounds().limits();
        self.bounds_mut().upper = value.into_limit(&limits);
        self.check_fixed();
        self
    }

    /// Sets both bounds to `value`
    fn level(&mut self, value: impl IntoLimit) -> &mut Self
    where
        Self: Sized,
    {
        let limits = *self.bounds().limits();
        let level = value.into_limit(&limits);
        let bounds = self.bounds_mut();
        bounds.lower = level;
        bounds.upper = level;
        self.check_fixed();
        self
    }

    fn weight(&mut self, value: impl IntoLimit) -> &mut Self
    where
        Self: Sized,
    {
        let limits = *self.bounds().limits();
        let weight = value.into_limit(&limits);
        self.bounds_mut().set_weight(weight);
        self
    }

    fn lower_limit(&self) -> Option<Decimal> {
        self.bounds().lower
    }

    fn upper_limit(&self) -> Option<Decimal> {
        self.bounds().upper
    }

    fn contribution_weight(&self) -> Option<Decimal> {
        self.bounds().weight
    }

    fn is_lower_limited(&self) -> bool {
        self.bounds().lower.is_some()
    }

    fn is_upper_limited(&self) -> bool {
        self.bounds().upper.is_some()
    }

    fn is_fixed(&self) -> bool {
        self.bounds().level().is_some()
    }

    fn is_constraint(&self) -> bool {
        self.is_lower_limited() || self.is_upper_limited()
    }

    fn is_objective(&self) -> bool {
        self.bounds().weight.is_some()
    }

    /// `true` when the bounds are consistently ordered
    fn validate(&self) -> bool {
        self.bounds().is_valid()
    }

    #[doc(hidden)]
    fn check_fixed(&mut self) {
        if let Some(level) = self.bounds().level() {
            self.on_fixed(level);
        }
    }
}

/// `x` is at most `limit`, with `None` meaning no limit
pub(crate) fn below(x: Decimal, limit: Option<Decimal>) -> bool {
    limit.map_or(true, |u| x <= u)
}

/// `x` is at least `limit`, with `None` meaning no limit
pub(crate) fn above(x: Decimal, limit: Option<Decimal>) -> bool {
    limit.map_or(true, |l| x >= l)
}

pub(crate) fn clamp(x: Decimal, lower: Option<Decimal>, upper: Option<Decimal>) -> Decimal {
    let mut x = x;
    if let Some(l) = lower {
        if x < l {
            x = l;
        }
    }
    if let Some(u) = upper {
        if x > u {
            x = u;
        }
    }
    x
}

/// Sign of a decimal as -1, 0 or 1
pub(crate) fn signum(x: Decimal) -> i32 {
    if x.is_zero() {
        0
    } else if x.is_positive() {
        1
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limits() {
        let limits = Limits::default();
        assert_eq!(1e20_f64.into_limit(&limits), None);
        assert_eq!((-1e16_f64).into_limit(&limits), None);
        assert_eq!(1e-20_f64.into_limit(&limits), Some(Decimal::ZERO));
        assert_eq!(f64::NAN.into_limit(&limits), None);
        assert_eq!(2.5_f64.into_limit(&limits), Some(dec!(2.5)));
        assert_eq!(i64::MAX.into_limit(&limits), None);
        assert_eq!(7.into_limit(&limits), Some(dec!(7)));

        // exact decimals pass through
        let tiny = Decimal::new(1, 20);
        assert_eq!(tiny.into_limit(&limits), Some(tiny));
        assert_eq!(None::<f64>.into_limit(&limits), None);
    }

    #[test]
    fn test_clamp() {
        let x = clamp(dec!(5), Some(dec!(0)), Some(dec!(3)));
        assert_eq!(x, dec!(3));
        let x = clamp(dec!(-1), Some(dec!(0)), None);
        assert_eq!(x, dec!(0));
        assert!(below(dec!(1), None));
        assert!(!above(dec!(1), Some(dec!(2))));
        assert_eq!(signum(dec!(-0.1)), -1);
    }
}

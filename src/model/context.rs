use rust_decimal::{Decimal, RoundingStrategy};

/// Rounding rules for model values: a number of significant digits and a
/// number of decimal places, applied with one rounding strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberContext {
    /// significant digits
    pub precision: u32,
    /// decimal places
    pub scale: u32,
    pub strategy: RoundingStrategy,
}

impl NumberContext {
    pub const fn new(precision: u32, scale: u32) -> Self {
        Self {
            precision,
            scale,
            strategy: RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Context used by presolve when comparing bounds and levels
    pub const fn feasibility() -> Self {
        Self::new(12, 8)
    }

    /// Context used when reporting solution values
    pub const fn solution() -> Self {
        Self::new(12, 14)
    }

    pub fn enforce(&self, value: Decimal) -> Decimal {
        let v = value.round_dp_with_strategy(self.scale, self.strategy);
        v.round_sf_with_strategy(self.precision, self.strategy)
            .unwrap_or(v)
            .normalize()
    }

    /// Smallest difference this context distinguishes
    pub fn epsilon(&self) -> Decimal {
        Decimal::new(1, self.scale.min(28))
    }

    /// Tolerance for comparisons against a value of the given magnitude,
    /// `epsilon * (1 + |magnitude|)`
    pub fn tolerance(&self, magnitude: Decimal) -> Decimal {
        let eps = self.epsilon();
        magnitude
            .abs()
            .checked_add(Decimal::ONE)
            .and_then(|m| m.checked_mul(eps))
            .unwrap_or(Decimal::MAX)
    }

    pub fn is_zero(&self, value: Decimal) -> bool {
        self.enforce(value).is_zero()
    }

    /// `true` unless `a` and `b` agree in this context
    pub fn is_different(&self, a: Decimal, b: Decimal) -> bool {
        match a.checked_sub(b) {
            Some(d) => !self.is_zero(d),
            None => true,
        }
    }

    /// `a` rounded down to this context's scale
    pub fn floor(&self, a: Decimal) -> Decimal {
        a.round_dp_with_strategy(self.scale, RoundingStrategy::ToNegativeInfinity)
    }

    /// `a` rounded up to this context's scale
    pub fn ceil(&self, a: Decimal) -> Decimal {
        a.round_dp_with_strategy(self.scale, RoundingStrategy::ToPositiveInfinity)
    }
}

impl Default for NumberContext {
    fn default() -> Self {
        Self::feasibility()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_number_context() {
        let ctx = NumberContext::new(4, 2);
        assert_eq!(ctx.enforce(dec!(3.14159)), dec!(3.14));
        assert_eq!(ctx.enforce(dec!(12345.678)), dec!(12350));
        assert!(ctx.is_zero(dec!(0.004)));
        assert!(!ctx.is_different(dec!(1.001), dec!(1.002)));
        assert!(ctx.is_different(dec!(1.00), dec!(1.02)));
        assert_eq!(ctx.floor(dec!(-1.005)), dec!(-1.01));
        assert_eq!(ctx.ceil(dec!(1.001)), dec!(1.01));
        assert_eq!(ctx.epsilon(), dec!(0.01));
        assert_eq!(ctx.tolerance(dec!(-9)), dec!(0.1));
        assert_eq!(ctx.tolerance(dec!(0)), dec!(0.01));
    }
}

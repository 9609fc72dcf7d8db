//! Power-of-ten scaling of entity data sent to the floating point
//! solvers.
//!
//! Each entity derives an adjustment exponent `e` from its coefficient
//! magnitudes.   Values are multiplied by `10^e` on the way into a solver
//! and by `10^-e` on the way back.

use rust_decimal::Decimal;

/// How many decades the smallest coefficient may trail the largest
/// before it stops influencing the exponent
pub const RANGE: i32 = 16;

/// Largest exponent magnitude ever applied
pub const MAX_EXPONENT: i32 = 24;

/// Decimal exponent of `x`, i.e. `floor(log10(|x|))`
pub(crate) fn decade(x: Decimal) -> i32 {
    let mut mantissa = x.mantissa().unsigned_abs();
    if mantissa == 0 {
        return 0;
    }
    let mut digits = 0;
    while mantissa > 0 {
        mantissa /= 10;
        digits += 1;
    }
    digits - 1 - x.scale() as i32
}

/// Exponent that centres the decades of `largest` and `smallest` on zero
pub fn adjustment_exponent(largest: Decimal, smallest: Decimal) -> i32 {
    if largest.is_zero() {
        return 0;
    }
    let hi = decade(largest);
    let lo = decade(smallest).max(hi - RANGE);
    let negated_midpoint = -((hi + lo) as f64) / 2.0;
    (negated_midpoint.round() as i32).clamp(-MAX_EXPONENT, MAX_EXPONENT)
}

fn power_of_ten(exponent: i32) -> Decimal {
    if exponent >= 0 {
        Decimal::from_i128_with_scale(10_i128.pow(exponent as u32), 0)
    } else {
        Decimal::new(1, (-exponent) as u32)
    }
}

/// `value * 10^exponent`, `None` on overflow
pub fn scale(value: Decimal, exponent: i32) -> Option<Decimal> {
    if exponent == 0 {
        return Some(value);
    }
    let factor = power_of_ten(exponent.clamp(-28, 28));
    value.checked_mul(factor).map(|v| v.normalize())
}

/// `value * 10^-exponent`, `None` on overflow
pub fn unscale(value: Decimal, exponent: i32) -> Option<Decimal> {
    scale(value, -exponent)
}

pub fn scale_f64(value: f64, exponent: i32) -> f64 {
    value * 10_f64.powi(exponent)
}

pub fn unscale_f64(value: f64, exponent: i32) -> f64 {
    value / 10_f64.powi(exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_adjustment_exponent() {
        assert_eq!(adjustment_exponent(Decimal::ZERO, Decimal::ZERO), 0);
        assert_eq!(adjustment_exponent(dec!(1), dec!(1)), 0);
        assert_eq!(adjustment_exponent(dec!(1000), dec!(1000)), -3);
        assert_eq!(adjustment_exponent(dec!(0.001), dec!(0.001)), 3);
        // centred between the decades
        assert_eq!(adjustment_exponent(dec!(100), dec!(0.01)), 0);
        assert_eq!(decade(dec!(0.05)), -2);
        assert_eq!(decade(dec!(999)), 2);
    }

    #[test]
    fn test_scale_unscale() {
        let v = dec!(123.456);
        assert_eq!(scale(v, 2), Some(dec!(12345.6)));
        assert_eq!(unscale(dec!(12345.6), 2), Some(v));
        assert_eq!(scale(Decimal::MAX, 3), None);

        let f = scale_f64(1.5, -3);
        assert!((unscale_f64(f, -3) - 1.5).abs() < 1e-15);
    }
}

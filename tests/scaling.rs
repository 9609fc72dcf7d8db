use mathprog::model::scaling::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_scaling_exact_round_trip() {
    for exponent in -12..=12 {
        let value = dec!(1.2345678901);
        let scaled = scale(value, exponent).unwrap();
        assert_eq!(unscale(scaled, exponent), Some(value));
    }
}

#[test]
fn test_scaling_magnitudes() {
    for k in 0..=24u32 {
        // 10^-12 through 10^12
        let value = Decimal::new(1, k) * Decimal::from(1_000_000_000_000_i64);
        let exponent = adjustment_exponent(value, value);
        let scaled = scale(value, exponent).unwrap();
        assert_eq!(scaled, Decimal::ONE);
        assert_eq!(unscale(scaled, exponent), Some(value));
    }
}

#[test]
fn test_adjustment_exponent() {
    // already centred
    assert_eq!(adjustment_exponent(dec!(1000000), dec!(0.000001)), 0);
    assert_eq!(adjustment_exponent(dec!(1000), dec!(1000)), -3);
    // the spread is capped at sixteen decades
    let huge = Decimal::from(1_000_000_000_000_i64);
    let tiny = Decimal::new(1, 12);
    assert_eq!(adjustment_exponent(huge, tiny), -4);
}

#[test]
fn test_float_scaling() {
    let x = 3.0e-7;
    assert!((unscale_f64(scale_f64(x, 7), 7) - x).abs() < 1e-20);
    assert!((scale_f64(x, 7) - 3.0).abs() < 1e-12);
}

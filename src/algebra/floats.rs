#![allow(non_snake_case)]
use num_traits::{Float, FromPrimitive, NumAssign, ToPrimitive};
use rust_decimal::Decimal;
use std::fmt::{Debug, Display, LowerExp};

/// Floating point type used by the numeric solvers.
///
/// The convex and linear solvers are generic over `FloatT`, which in
/// practice means `f32` or `f64`.   Model data is held as exact decimals
/// and crosses into `FloatT` only at the solver boundary, through
/// [`DecimalConversion`].
pub trait FloatT:
    'static
    + Send
    + Sync
    + Float
    + NumAssign
    + Default
    + FromPrimitive
    + Display
    + LowerExp
    + Debug
    + Sized
{
}

impl<T> FloatT for T where
    T: 'static
        + Send
        + Sync
        + Float
        + NumAssign
        + Default
        + FromPrimitive
        + Display
        + LowerExp
        + Debug
        + Sized
{
}

/// Conversion between [`FloatT`] and [`Decimal`].
///
/// Conversion to a decimal keeps every binary digit of the float, so a
/// round trip is exact.   Either direction fails for values outside the
/// other type's range and for infinities and NaN.
pub trait DecimalConversion: Sized {
    fn to_decimal(self) -> Option<Decimal>;
    fn from_decimal(value: Decimal) -> Option<Self>;
}

impl<T: FloatT> DecimalConversion for T {
    fn to_decimal(self) -> Option<Decimal> {
        self.to_f64().and_then(Decimal::from_f64_retain)
    }

    fn from_decimal(value: Decimal) -> Option<Self> {
        value.to_f64().and_then(T::from_f64)
    }
}

/// Conversion of primitive constants to [`FloatT`]
///
/// Lets constants be written `(2.0).as_T()` and supplies the builder
/// defaults of the [solver settings](crate::solver::ConvexSettings).
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_FloatT {
    ($ty:ty, $ident:ident) => {
        impl<T> AsFloatT<T> for $ty
        where
            T: FromPrimitive + 'static,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::$ident(*self).unwrap()
            }
        }
    };
}
impl_as_FloatT!(u32, from_u32);
impl_as_FloatT!(usize, from_usize);
impl_as_FloatT!(i32, from_i32);
impl_as_FloatT!(f64, from_f64);

#[test]
fn test_decimal_conversion() {
    let x = 0.1_f64;
    let d = x.to_decimal().unwrap();
    // every binary digit is kept, so this is not exactly 0.1
    assert_ne!(d, Decimal::new(1, 1));
    assert_eq!(f64::from_decimal(d), Some(x));

    assert_eq!(f64::NAN.to_decimal(), None);
    assert_eq!(1e40_f64.to_decimal(), None);
    assert_eq!(f32::from_decimal(Decimal::new(25, 1)), Some(2.5_f32));
}

use super::FloatT;

/// Dense vector operations used by the solvers, implemented on slices of
/// [`FloatT`](crate::algebra::FloatT).
///
/// Operations that modify `self` return it so calls can be chained.
pub trait VectorMath {
    type T;

    fn copy_from(&mut self, src: &Self) -> &mut Self;

    /// Every element set to `c`
    fn set(&mut self, c: Self::T) -> &mut Self;

    fn scale(&mut self, c: Self::T) -> &mut Self;

    fn negate(&mut self) -> &mut Self;

    /// `self[i] *= y[i]`
    fn hadamard(&mut self, y: &Self) -> &mut Self;

    fn dot(&self, y: &Self) -> Self::T;

    /// Euclidean distance from `self` to `y`
    fn dist(&self, y: &Self) -> Self::T;

    fn norm(&self) -> Self::T;

    /// Largest magnitude, NaN if any element is NaN
    fn norm_inf(&self) -> Self::T;

    /// Largest absolute elementwise difference
    fn norm_inf_diff(&self, b: &Self) -> Self::T;

    fn minimum(&self) -> Self::T;

    fn maximum(&self) -> Self::T;

    /// `false` if any element is infinite or NaN
    fn is_finite(&self) -> bool;

    /// `self = a*x + b*self`
    fn axpby(&mut self, a: Self::T, x: &Self, b: Self::T) -> &mut Self;
}

/// Matrix-vector products for dense matrices of
/// [`FloatT`](crate::algebra::FloatT)
pub trait MatrixVectorMultiply {
    type T: FloatT;

    /// `y = a*self*x + b*y`
    fn gemv(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);

    /// `y = a*self'*x + b*y`
    fn gemv_t(&self, y: &mut [Self::T], x: &[Self::T], a: Self::T, b: Self::T);
}

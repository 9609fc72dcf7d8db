use super::{FloatT, VectorMath};
use itertools::izip;
use std::iter::zip;

impl<T: FloatT> VectorMath for [T] {
    type T = T;

    fn copy_from(&mut self, src: &[T]) -> &mut Self {
        self.copy_from_slice(src);
        self
    }

    fn set(&mut self, c: T) -> &mut Self {
        self.fill(c);
        self
    }

    fn scale(&mut self, c: T) -> &mut Self {
        self.iter_mut().for_each(|x| *x *= c);
        self
    }

    fn negate(&mut self) -> &mut Self {
        self.iter_mut().for_each(|x| *x = -*x);
        self
    }

    fn hadamard(&mut self, y: &[T]) -> &mut Self {
        zip(&mut *self, y).for_each(|(x, y)| *x *= *y);
        self
    }

    fn dot(&self, y: &[T]) -> T {
        assert_eq!(self.len(), y.len());
        zip(self, y).fold(T::zero(), |acc, (&x, &y)| acc + x * y)
    }

    fn dist(&self, y: &Self) -> T {
        zip(self, y)
            .fold(T::zero(), |acc, (&x, &y)| acc + (x - y) * (x - y))
            .sqrt()
    }

    fn norm(&self) -> T {
        self.dot(self).sqrt()
    }

    fn norm_inf(&self) -> T {
        let mut out = T::zero();
        for v in self.iter().map(|v| v.abs()) {
            if v.is_nan() {
                return T::nan();
            }
            out = T::max(out, v);
        }
        out
    }

    fn norm_inf_diff(&self, b: &[T]) -> T {
        zip(self, b).fold(T::zero(), |acc, (&x, &y)| T::max(acc, T::abs(x - y)))
    }

    fn minimum(&self) -> T {
        self.iter().fold(T::infinity(), |r, &s| T::min(r, s))
    }

    fn maximum(&self) -> T {
        self.iter().fold(-T::infinity(), |r, &s| T::max(r, s))
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|x| x.is_finite())
    }

    fn axpby(&mut self, a: T, x: &[T], b: T) -> &mut Self {
        assert_eq!(self.len(), x.len());
        for (y, &x) in izip!(&mut *self, x) {
            *y = a * x + b * (*y);
        }
        self
    }
}

#[test]
fn test_vector_ops() {
    let mut x = vec![1., -2., 3.];
    let y = vec![2., 2., 2.];

    assert_eq!(x.dot(&y), 4.);
    assert_eq!(x.norm_inf(), 3.);
    assert_eq!(x.minimum(), -2.);
    assert_eq!(x.maximum(), 3.);
    assert_eq!(x.dist(&[1., 2., 0.]), 5.);

    // search step: x + 0.5*d
    x.axpby(0.5, &y, 1.);
    assert_eq!(x, vec![2., -1., 4.]);
    assert_eq!(x.norm_inf_diff(&[2., -1., 5.]), 1.);

    x.set(0.).hadamard(&y);
    assert!(x.norm() == 0.);
    assert!(![1., f64::NAN].is_finite());
    assert!([1., f64::NAN].norm_inf().is_nan());
}

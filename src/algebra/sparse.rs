use crate::algebra::FloatT;

/// A sparse row vector holding only its structural nonzeros.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseRow<T> {
    /// column indices, in increasing order
    pub indices: Vec<usize>,
    /// values corresponding to `indices`
    pub values: Vec<T>,
}

impl<T> SparseRow<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Overwrite `self` with the nonzeros of a dense row.
    pub fn assign_dense(&mut self, dense: &[T]) {
        self.indices.clear();
        self.values.clear();
        for (j, &v) in dense.iter().enumerate() {
            if v != T::zero() {
                self.indices.push(j);
                self.values.push(v);
            }
        }
    }

    pub fn from_dense(dense: &[T]) -> Self {
        let mut row = Self::new();
        row.assign_dense(dense);
        row
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Dot product with a dense vector
    pub fn dot(&self, x: &[T]) -> T {
        self.indices
            .iter()
            .zip(&self.values)
            .fold(T::zero(), |acc, (&j, &v)| acc + v * x[j])
    }

    /// Dot product with another sparse row (both sorted)
    pub fn dot_sparse(&self, other: &SparseRow<T>) -> T {
        let (mut p, mut q) = (0, 0);
        let mut out = T::zero();
        while p < self.nnz() && q < other.nnz() {
            match self.indices[p].cmp(&other.indices[q]) {
                std::cmp::Ordering::Less => p += 1,
                std::cmp::Ordering::Greater => q += 1,
                std::cmp::Ordering::Equal => {
                    out += self.values[p] * other.values[q];
                    p += 1;
                    q += 1;
                }
            }
        }
        out
    }

    /// `y += a * self`
    pub fn axpy_into(&self, a: T, y: &mut [T]) {
        for (&j, &v) in self.indices.iter().zip(&self.values) {
            y[j] += a * v;
        }
    }

    pub fn norm(&self) -> T {
        self.values.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.values.clear();
    }
}

/// A pool of dense work vectors that are recycled rather than
/// reallocated when rows leave the active set.
#[derive(Debug, Default)]
pub struct RowPool<T> {
    free: Vec<Vec<T>>,
    allocated: usize,
}

impl<T> RowPool<T>
where
    T: FloatT,
{
    pub fn new() -> Self {
        Self {
            free: Vec::new(),
            allocated: 0,
        }
    }

    /// A zeroed vector of length `n`, reusing a released buffer if one is available.
    pub fn acquire(&mut self, n: usize) -> Vec<T> {
        match self.free.pop() {
            Some(mut v) => {
                v.clear();
                v.resize(n, T::zero());
                v
            }
            None => {
                self.allocated += 1;
                vec![T::zero(); n]
            }
        }
    }

    pub fn release(&mut self, v: Vec<T>) {
        self.free.push(v);
    }

    /// Number of buffers ever allocated by this pool
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn clear(&mut self) {
        self.free.clear();
    }
}

#[test]
fn test_sparse_row() {
    let a = SparseRow::from_dense(&[0., 2., 0., -1.]);
    let b = SparseRow::from_dense(&[1., 1., 0., 1.]);
    assert_eq!(a.nnz(), 2);
    assert_eq!(a.dot(&[1., 1., 1., 1.]), 1.);
    assert_eq!(a.dot_sparse(&b), 1.);

    let mut y = vec![0.; 4];
    a.axpy_into(2., &mut y);
    assert_eq!(y, vec![0., 4., 0., -2.]);

    let mut pool = RowPool::<f64>::new();
    let v = pool.acquire(3);
    pool.release(v);
    let w = pool.acquire(5);
    assert_eq!(w.len(), 5);
    assert_eq!(pool.allocated(), 1);
}

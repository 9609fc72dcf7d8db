use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A sparse, copy-on-write coefficient table.
///
/// Cloning shares the underlying map.   The first mutation through a
/// handle whose map is shared gives that handle a private copy, so a
/// shallow copy never observes changes made through its source and
/// vice versa.   Zero coefficients are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coefficients<K: Ord + Clone> {
    map: Arc<BTreeMap<K, Decimal>>,
}

impl<K: Ord + Clone> Default for Coefficients<K> {
    fn default() -> Self {
        Self {
            map: Arc::new(BTreeMap::new()),
        }
    }
}

impl<K: Ord + Clone> Coefficients<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coefficient for `key`, zero if absent
    pub fn get(&self, key: &K) -> Decimal {
        self.map.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Set the coefficient for `key`.   Zero removes the entry.
    pub fn set(&mut self, key: K, value: Decimal) {
        if value.is_zero() {
            if self.map.contains_key(&key) {
                Arc::make_mut(&mut self.map).remove(&key);
            }
        } else {
            Arc::make_mut(&mut self.map).insert(key, value);
        }
    }

    /// Add `value` to the coefficient for `key`
    pub fn add(&mut self, key: K, value: Decimal) {
        let sum = self.get(&key) + value;
        self.set(key, sum);
    }

    pub fn remove(&mut self, key: &K) -> Option<Decimal> {
        if self.map.contains_key(key) {
            Arc::make_mut(&mut self.map).remove(key)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        if !self.map.is_empty() {
            self.map = Arc::new(BTreeMap::new());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Decimal)> {
        self.map.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// A handle with its own copy of the map
    pub fn deep_copy(&self) -> Self {
        Self {
            map: Arc::new((*self.map).clone()),
        }
    }

    /// `true` when both handles currently share one map
    pub fn is_shared_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.map, &other.map)
    }

    /// Largest and smallest non-zero magnitudes
    pub(crate) fn magnitude_range(&self) -> Option<(Decimal, Decimal)> {
        self.map.values().fold(None, |acc, v| {
            let m = v.abs();
            match acc {
                None => Some((m, m)),
                Some((hi, lo)) => Some((hi.max(m), lo.min(m))),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_copy_on_write() {
        let mut a = Coefficients::<usize>::new();
        a.set(0, dec!(1.5));
        a.set(3, dec!(-2));

        let mut b = a.clone();
        assert!(b.is_shared_with(&a));

        b.set(1, dec!(4));
        assert!(!b.is_shared_with(&a));
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 3);
        assert_eq!(a.get(&1), Decimal::ZERO);

        let c = a.deep_copy();
        assert!(!c.is_shared_with(&a));
        assert_eq!(c, a);
    }

    #[test]
    fn test_zero_removes() {
        let mut a = Coefficients::<(usize, usize)>::new();
        a.set((0, 1), dec!(3));
        a.add((0, 1), dec!(-3));
        assert!(a.is_empty());
        assert!(a.remove(&(0, 1)).is_none());

        a.set((2, 2), dec!(0.001));
        a.set((1, 2), dec!(-100));
        assert_eq!(a.magnitude_range(), Some((dec!(100), dec!(0.001))));
    }
}

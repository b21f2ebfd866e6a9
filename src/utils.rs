//! Utility types shared across the engine.

use std::cmp::Ordering;

/// A wrapper around `f64` that implements `Ord` by using `total_cmp`.
///
/// Record values can hold floating-point numbers, and sort, reduce, and join
/// all need a total order over them. `OrdF64` supplies the `Ord` that `f64`
/// itself withholds.
///
/// # Examples
///
/// ```
/// use tableflow::OrdF64;
///
/// let mut scores = vec![OrdF64(0.33), OrdF64(1.5), OrdF64(0.0)];
/// scores.sort();
/// assert_eq!(scores.first().unwrap().0, 0.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrdF64(pub f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for OrdF64 {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<OrdF64> for f64 {
    fn from(value: OrdF64) -> Self {
        value.0
    }
}

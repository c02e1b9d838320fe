//! Element types stored in tensors.
//!
//! A component is either a single `f64` or a [`DataVector`] holding one value
//! per grid point. The evaluator only needs a ring-like interface: addition,
//! multiplication, negation, and a way to build constants shaped like an
//! existing value (a `DataVector` zero must have the right length).

use std::fmt::Debug;
use std::ops::{Deref, DerefMut};

/// Values that can live in a tensor and take part in sums of products.
pub trait Component: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Zero with the same shape as `self`
    fn zero_like(&self) -> Self;

    /// Broadcast a scalar to the shape of `like`
    fn splat_like(value: f64, like: &Self) -> Self;

    /// `self + other`
    fn sum_with(&self, other: &Self) -> Self;

    /// `self * other`
    fn product_with(&self, other: &Self) -> Self;

    /// `-self`
    fn negated(&self) -> Self;

    /// `self += other`
    fn accumulate(&mut self, other: &Self) {
        *self = self.sum_with(other);
    }
}

impl Component for f64 {
    fn zero_like(&self) -> Self {
        0.0
    }

    fn splat_like(value: f64, _like: &Self) -> Self {
        value
    }

    fn sum_with(&self, other: &Self) -> Self {
        self + other
    }

    fn product_with(&self, other: &Self) -> Self {
        self * other
    }

    fn negated(&self) -> Self {
        -self
    }

    fn accumulate(&mut self, other: &Self) {
        *self += other;
    }
}

// ============================================================================
// DataVector
// ============================================================================

/// A field of values, one per grid point, with pointwise arithmetic.
///
/// Operands of one arithmetic operation must have equal lengths.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataVector(Vec<f64>);

impl DataVector {
    /// `len` points, all set to `value`
    pub fn new(len: usize, value: f64) -> Self {
        Self(vec![value; len])
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        assert_eq!(
            self.0.len(),
            other.0.len(),
            "DataVector operands must have equal lengths"
        );
        Self(self.0.iter().zip(&other.0).map(|(&x, &y)| f(x, y)).collect())
    }
}

impl From<Vec<f64>> for DataVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl FromIterator<f64> for DataVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Deref for DataVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl DerefMut for DataVector {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl Component for DataVector {
    fn zero_like(&self) -> Self {
        Self::new(self.0.len(), 0.0)
    }

    fn splat_like(value: f64, like: &Self) -> Self {
        Self::new(like.0.len(), value)
    }

    fn sum_with(&self, other: &Self) -> Self {
        self.zip_with(other, |x, y| x + y)
    }

    fn product_with(&self, other: &Self) -> Self {
        self.zip_with(other, |x, y| x * y)
    }

    fn negated(&self) -> Self {
        Self(self.0.iter().map(|x| -x).collect())
    }

    fn accumulate(&mut self, other: &Self) {
        assert_eq!(
            self.0.len(),
            other.0.len(),
            "DataVector operands must have equal lengths"
        );
        for (x, y) in self.0.iter_mut().zip(&other.0) {
            *x += y;
        }
    }
}

//! Arbitraries for primitive values: integers, floats, booleans, constants.

use std::fmt;

use num_traits::{FromPrimitive, PrimInt, ToPrimitive};

use crate::arbitrary::Arbitrary;
use crate::error::PropertyError;
use crate::rng::RandomSource;

/// Arbitrary for integers in an inclusive range, generic over the primitive
/// integer types.
#[derive(Debug, Clone)]
pub struct IntArbitrary<T> {
    min: T,
    max: T,
    target: T,
}

/// Integers uniform in `[min, max]`, shrinking toward 0 when the range
/// contains it, otherwise toward the bound nearer 0.
///
/// Panics if `min > max`.
pub fn int<T>(min: T, max: T) -> IntArbitrary<T>
where
    T: PrimInt + fmt::Debug,
{
    assert!(
        min <= max,
        "int: min {:?} must not exceed max {:?}",
        min,
        max
    );
    let zero = T::zero();
    let target = if min <= zero && zero <= max {
        zero
    } else if min > zero {
        min
    } else {
        max
    };
    IntArbitrary { min, max, target }
}

/// Arbitrary-precision-flavored integers: the widest primitive range.
pub fn bigint(min: i128, max: i128) -> IntArbitrary<i128> {
    int(min, max)
}

impl<T> Arbitrary<T> for IntArbitrary<T>
where
    T: PrimInt + FromPrimitive + ToPrimitive + fmt::Debug + 'static,
{
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError> {
        let lo = self.min.to_f64().unwrap_or(f64::MIN);
        let hi = self.max.to_f64().unwrap_or(f64::MAX);
        let span = (hi - lo) + 1.0;
        let raw = lo + (source.draw() * span).floor();
        let value = T::from_f64(raw).unwrap_or(self.target);
        // Float rounding can nudge the extremes out of range.
        Ok(value.clamp(self.min, self.max))
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let two = T::one() + T::one();
        let mut candidates = Vec::new();
        if *value == self.target {
            return Box::new(candidates.into_iter());
        }
        // The target itself first, then values ever closer to the input:
        // halving the remaining gap each time lets repeated rounds home in
        // on a decision boundary.
        candidates.push(self.target);
        // checked_sub: |value - target| can exceed the signed type's range
        // (e.g. the full i64 domain); halve each side separately then.
        let (half_distance, downward) = if *value > self.target {
            match value.checked_sub(&self.target) {
                Some(distance) => (distance / two, true),
                None => (*value / two - self.target / two, true),
            }
        } else {
            match self.target.checked_sub(value) {
                Some(distance) => (distance / two, false),
                None => (self.target / two - *value / two, false),
            }
        };
        let mut delta = half_distance;
        while delta > T::zero() {
            candidates.push(if downward {
                *value - delta
            } else {
                *value + delta
            });
            delta = delta / two;
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &T) -> f64 {
        value.to_f64().map(f64::abs).unwrap_or(f64::MAX)
    }
}

/// Arbitrary for floats in a half-open range.
#[derive(Debug, Clone)]
pub struct FloatArbitrary {
    min: f64,
    max: f64,
    target: f64,
}

/// Floats uniform in `[min, max)`, shrinking toward 0 when the range
/// contains it, otherwise toward `min`.
///
/// Panics if the bounds are non-finite or the range is empty.
pub fn float(min: f64, max: f64) -> FloatArbitrary {
    assert!(
        min.is_finite() && max.is_finite(),
        "float: bounds must be finite"
    );
    assert!(min < max, "float: min {} must be below max {}", min, max);
    let target = if min <= 0.0 && 0.0 < max { 0.0 } else { min };
    FloatArbitrary { min, max, target }
}

/// Cap on float bisection rounds; the target itself is yielded afterwards.
const FLOAT_SHRINK_ROUNDS: usize = 20;

impl Arbitrary<f64> for FloatArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<f64, PropertyError> {
        Ok(self.min + source.draw() * (self.max - self.min))
    }

    fn shrink(&self, value: &f64) -> Box<dyn Iterator<Item = f64>> {
        let mut candidates = Vec::new();
        if *value == self.target {
            return Box::new(candidates.into_iter());
        }
        candidates.push(self.target);
        let mut delta = (*value - self.target) / 2.0;
        for _ in 0..FLOAT_SHRINK_ROUNDS {
            let candidate = *value - delta;
            if candidate == *value || candidate == self.target {
                break;
            }
            candidates.push(candidate);
            delta /= 2.0;
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &f64) -> f64 {
        value.abs()
    }
}

/// Arbitrary for booleans; `true` shrinks to `false`.
#[derive(Debug, Clone)]
pub struct BoolArbitrary;

pub fn boolean() -> BoolArbitrary {
    BoolArbitrary
}

impl Arbitrary<bool> for BoolArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<bool, PropertyError> {
        Ok(source.draw() < 0.5)
    }

    fn shrink(&self, value: &bool) -> Box<dyn Iterator<Item = bool>> {
        if *value {
            Box::new(std::iter::once(false))
        } else {
            Box::new(std::iter::empty())
        }
    }

    fn score(&self, value: &bool) -> f64 {
        if *value { 1.0 } else { 0.0 }
    }
}

/// Arbitrary that always produces the same value. Cannot be shrunk.
#[derive(Debug, Clone)]
pub struct ConstantArbitrary<T> {
    value: T,
}

pub fn constant<T: Clone>(value: T) -> ConstantArbitrary<T> {
    ConstantArbitrary { value }
}

impl<T: Clone + 'static> Arbitrary<T> for ConstantArbitrary<T> {
    fn generate(&self, _source: &mut RandomSource) -> Result<T, PropertyError> {
        Ok(self.value.clone())
    }

    fn shrink(&self, _value: &T) -> Box<dyn Iterator<Item = T>> {
        Box::new(std::iter::empty())
    }

    fn score(&self, _value: &T) -> f64 {
        0.0
    }
}

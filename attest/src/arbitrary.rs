//! The arbitrary abstraction: a paired generator and shrinker for a value
//! domain.

use serde::Serialize;

use crate::error::PropertyError;
use crate::rng::RandomSource;

/// A generator/shrinker pair for values of type `T`.
///
/// Arbitraries are immutable: they are built once at test-definition time
/// and reused across every trial. Composite arbitraries own their children
/// by value, so the only virtual boundary is this trait itself.
///
/// Contract:
/// - `generate` is total apart from consuming draws; it fails only when a
///   retrying generator (filter, unique collections) exhausts its budget.
/// - `shrink` yields a finite sequence of candidates, each a legal value of
///   the same domain (bounds-respecting) and smaller by the domain's
///   partial order. Shrinkers need not be exhaustive, only make monotonic
///   progress toward a fixed point.
/// - `score` ranks candidates within one shrink round: absolute magnitude
///   for numbers, length for strings and collections, serialized size for
///   composites. Ties are broken by evaluation order (first seen wins), and
///   downstream shrink results are pinned to that behavior.
pub trait Arbitrary<T> {
    /// Generate one value, consuming draws from `source`.
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError>;

    /// Produce shrink candidates for `value`, smallest-progress first.
    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>>;

    /// Rank a value for same-round candidate selection (smaller is better).
    fn score(&self, value: &T) -> f64;
}

/// A heap-allocated, type-erased arbitrary.
pub type BoxedArbitrary<T> = Box<dyn Arbitrary<T>>;

impl<T, A: Arbitrary<T> + ?Sized> Arbitrary<T> for Box<A> {
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError> {
        (**self).generate(source)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        (**self).shrink(value)
    }

    fn score(&self, value: &T) -> f64 {
        (**self).score(value)
    }
}

/// Score a composite value by the length of its compact JSON rendering.
pub fn serialized_score<T: Serialize>(value: &T) -> f64 {
    serde_json::to_string(value)
        .map(|rendered| rendered.len() as f64)
        .unwrap_or(f64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_score_grows_with_structure() {
        let small = vec![1];
        let large = vec![1, 2, 3, 4, 5];
        assert!(serialized_score(&small) < serialized_score(&large));
    }

    #[test]
    fn boxed_arbitrary_delegates() {
        use crate::primitives::int;
        let boxed: BoxedArbitrary<i64> = Box::new(int(1i64, 5));
        let mut source = RandomSource::new(1);
        let value = boxed.generate(&mut source).unwrap();
        assert!((1..=5).contains(&value));
        assert_eq!(boxed.score(&3), 3.0);
    }
}

//! Combinators that build arbitraries out of other arbitraries.

use std::marker::PhantomData;

use serde::Serialize;

use crate::arbitrary::{serialized_score, Arbitrary, BoxedArbitrary};
use crate::error::PropertyError;
use crate::rng::RandomSource;

/// Arbitrary for heterogeneous tuples, one inner arbitrary per position.
pub struct TupleArbitrary<A> {
    inner: A,
}

/// A tuple of arbitraries generating a tuple of values. Shrinking
/// substitutes one position at a time, holding the rest fixed.
pub fn tuple<A>(inner: A) -> TupleArbitrary<A> {
    TupleArbitrary { inner }
}

macro_rules! tuple_arbitrary {
    ($($arb:ident $value:ident $index:tt),+) => {
        impl<$($value,)+ $($arb,)+> Arbitrary<($($value,)+)> for TupleArbitrary<($($arb,)+)>
        where
            $($value: Clone + Serialize + 'static,)+
            $($arb: Arbitrary<$value>,)+
        {
            fn generate(
                &self,
                source: &mut RandomSource,
            ) -> Result<($($value,)+), PropertyError> {
                Ok(($(self.inner.$index.generate(source)?,)+))
            }

            fn shrink(
                &self,
                value: &($($value,)+),
            ) -> Box<dyn Iterator<Item = ($($value,)+)>> {
                let mut candidates = Vec::new();
                $(
                    for replacement in self.inner.$index.shrink(&value.$index) {
                        let mut next = value.clone();
                        next.$index = replacement;
                        candidates.push(next);
                    }
                )+
                Box::new(candidates.into_iter())
            }

            fn score(&self, value: &($($value,)+)) -> f64 {
                serialized_score(value)
            }
        }
    };
}

tuple_arbitrary!(A0 T0 0, A1 T1 1);
tuple_arbitrary!(A0 T0 0, A1 T1 1, A2 T2 2);
tuple_arbitrary!(A0 T0 0, A1 T1 1, A2 T2 2, A3 T3 3);

/// Arbitrary choosing uniformly among alternatives.
pub struct OneOfArbitrary<T> {
    choices: Vec<BoxedArbitrary<T>>,
}

/// Pick one of `choices` uniformly per trial.
///
/// Panics if `choices` is empty.
pub fn one_of<T>(choices: Vec<BoxedArbitrary<T>>) -> OneOfArbitrary<T> {
    assert!(!choices.is_empty(), "one_of: requires at least one choice");
    OneOfArbitrary { choices }
}

impl<T: 'static> Arbitrary<T> for OneOfArbitrary<T> {
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError> {
        let index = ((source.draw() * self.choices.len() as f64) as usize)
            .min(self.choices.len() - 1);
        self.choices[index].generate(source)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        // The producing alternative is unknown; offer every alternative's
        // shrinks and let the runner's re-check filter the rest out.
        let mut candidates = Vec::new();
        for choice in &self.choices {
            candidates.extend(choice.shrink(value));
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &T) -> f64 {
        self.choices[0].score(value)
    }
}

/// Arbitrary choosing among alternatives with relative weights.
pub struct WeightedOneOfArbitrary<T> {
    choices: Vec<(f64, BoxedArbitrary<T>)>,
    total: f64,
}

/// Pick among `choices` with probability proportional to each weight.
///
/// Panics if `choices` is empty or any weight is non-finite or not
/// strictly positive.
pub fn weighted_one_of<T>(choices: Vec<(f64, BoxedArbitrary<T>)>) -> WeightedOneOfArbitrary<T> {
    assert!(
        !choices.is_empty(),
        "weighted_one_of: requires at least one choice"
    );
    let mut total = 0.0;
    for (weight, _) in &choices {
        assert!(
            weight.is_finite() && *weight > 0.0,
            "weighted_one_of: weight {} must be finite and positive",
            weight
        );
        total += weight;
    }
    WeightedOneOfArbitrary { choices, total }
}

impl<T: 'static> Arbitrary<T> for WeightedOneOfArbitrary<T> {
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError> {
        let threshold = source.draw() * self.total;
        let mut cumulative = 0.0;
        for (weight, choice) in &self.choices {
            cumulative += weight;
            if threshold < cumulative {
                return choice.generate(source);
            }
        }
        // Rounding can leave threshold at the very top of the range.
        self.choices[self.choices.len() - 1].1.generate(source)
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let mut candidates = Vec::new();
        for (_, choice) in &self.choices {
            candidates.extend(choice.shrink(value));
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &T) -> f64 {
        self.choices[0].1.score(value)
    }
}

/// Arbitrary producing `None` with a fixed probability.
#[derive(Debug, Clone)]
pub struct OptionalArbitrary<T, A> {
    item: A,
    absent_probability: f64,
    _marker: PhantomData<T>,
}

/// `Option<T>`: `None` with probability `absent_probability`, otherwise a
/// generated `Some`.
///
/// Panics if the probability is outside `[0, 1]`.
pub fn optional<T, A: Arbitrary<T>>(item: A, absent_probability: f64) -> OptionalArbitrary<T, A> {
    assert!(
        (0.0..=1.0).contains(&absent_probability),
        "optional: absent_probability {} must be within [0, 1]",
        absent_probability
    );
    OptionalArbitrary {
        item,
        absent_probability,
        _marker: PhantomData,
    }
}

impl<T, A> Arbitrary<Option<T>> for OptionalArbitrary<T, A>
where
    T: Clone + 'static,
    A: Arbitrary<T>,
{
    fn generate(&self, source: &mut RandomSource) -> Result<Option<T>, PropertyError> {
        if source.draw() < self.absent_probability {
            Ok(None)
        } else {
            Ok(Some(self.item.generate(source)?))
        }
    }

    fn shrink(&self, value: &Option<T>) -> Box<dyn Iterator<Item = Option<T>>> {
        match value {
            None => Box::new(std::iter::empty()),
            Some(inner) => {
                // None is the smallest option, so it goes first.
                let mut candidates = vec![None];
                candidates.extend(self.item.shrink(inner).map(Some));
                Box::new(candidates.into_iter())
            }
        }
    }

    fn score(&self, value: &Option<T>) -> f64 {
        match value {
            None => 0.0,
            Some(inner) => 1.0 + self.item.score(inner),
        }
    }
}

/// Arbitrary applying a one-way transformation to an inner arbitrary.
pub struct MapArbitrary<T, U, A, F> {
    item: A,
    to: F,
    _marker: PhantomData<(T, U)>,
}

/// Transform generated values with `to`. Without an inverse the mapped
/// arbitrary cannot shrink; use [`map_with_inverse`] when one exists.
pub fn map<T, U, A, F>(item: A, to: F) -> MapArbitrary<T, U, A, F>
where
    A: Arbitrary<T>,
    F: Fn(T) -> U,
{
    MapArbitrary {
        item,
        to,
        _marker: PhantomData,
    }
}

impl<T, U, A, F> Arbitrary<U> for MapArbitrary<T, U, A, F>
where
    T: 'static,
    U: Serialize + 'static,
    A: Arbitrary<T>,
    F: Fn(T) -> U,
{
    fn generate(&self, source: &mut RandomSource) -> Result<U, PropertyError> {
        Ok((self.to)(self.item.generate(source)?))
    }

    fn shrink(&self, _value: &U) -> Box<dyn Iterator<Item = U>> {
        Box::new(std::iter::empty())
    }

    fn score(&self, value: &U) -> f64 {
        serialized_score(value)
    }
}

/// Arbitrary applying an invertible transformation to an inner arbitrary.
pub struct MapWithInverseArbitrary<T, U, A, F, G> {
    item: A,
    to: F,
    from: G,
    _marker: PhantomData<(T, U)>,
}

/// Transform generated values with `to` and shrink through `from`: map the
/// value back, shrink in the inner domain, map each candidate forward.
pub fn map_with_inverse<T, U, A, F, G>(
    item: A,
    to: F,
    from: G,
) -> MapWithInverseArbitrary<T, U, A, F, G>
where
    A: Arbitrary<T>,
    F: Fn(T) -> U,
    G: Fn(&U) -> T,
{
    MapWithInverseArbitrary {
        item,
        to,
        from,
        _marker: PhantomData,
    }
}

impl<T, U, A, F, G> Arbitrary<U> for MapWithInverseArbitrary<T, U, A, F, G>
where
    T: 'static,
    U: Serialize + 'static,
    A: Arbitrary<T>,
    F: Fn(T) -> U,
    G: Fn(&U) -> T,
{
    fn generate(&self, source: &mut RandomSource) -> Result<U, PropertyError> {
        Ok((self.to)(self.item.generate(source)?))
    }

    fn shrink(&self, value: &U) -> Box<dyn Iterator<Item = U>> {
        let inner = (self.from)(value);
        let candidates: Vec<U> = self.item.shrink(&inner).map(&self.to).collect();
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &U) -> f64 {
        serialized_score(value)
    }
}

/// Arbitrary retrying an inner arbitrary until a predicate accepts.
pub struct FilterArbitrary<T, A, P> {
    item: A,
    predicate: P,
    max_attempts: u32,
    _marker: PhantomData<T>,
}

/// Keep generating until `predicate` accepts, up to `max_attempts` tries
/// per value; exhaustion is a generation error.
///
/// Panics if `max_attempts` is zero.
pub fn filter<T, A, P>(item: A, predicate: P, max_attempts: u32) -> FilterArbitrary<T, A, P>
where
    A: Arbitrary<T>,
    P: Fn(&T) -> bool,
{
    assert!(max_attempts >= 1, "filter: max_attempts must be positive");
    FilterArbitrary {
        item,
        predicate,
        max_attempts,
        _marker: PhantomData,
    }
}

impl<T, A, P> Arbitrary<T> for FilterArbitrary<T, A, P>
where
    T: 'static,
    A: Arbitrary<T>,
    P: Fn(&T) -> bool,
{
    fn generate(&self, source: &mut RandomSource) -> Result<T, PropertyError> {
        for _ in 0..self.max_attempts {
            let candidate = self.item.generate(source)?;
            if (self.predicate)(&candidate) {
                return Ok(candidate);
            }
        }
        Err(PropertyError::generation(format!(
            "filter: predicate not satisfied after {} attempts",
            self.max_attempts
        )))
    }

    fn shrink(&self, value: &T) -> Box<dyn Iterator<Item = T>> {
        let candidates: Vec<T> = self
            .item
            .shrink(value)
            .filter(|candidate| (self.predicate)(candidate))
            .collect();
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &T) -> f64 {
        self.item.score(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{constant, int};

    #[test]
    fn tuple_generates_and_shrinks_per_position() {
        let arbitrary = tuple((int(1i64, 10), int(-5i64, 5)));
        let mut source = RandomSource::new(7);
        let (a, b) = arbitrary.generate(&mut source).unwrap();
        assert!((1..=10).contains(&a));
        assert!((-5..=5).contains(&b));

        let value = (10i64, 4i64);
        for (x, y) in arbitrary.shrink(&value) {
            let changed = usize::from(x != value.0) + usize::from(y != value.1);
            assert_eq!(changed, 1);
        }
    }

    #[test]
    fn triple_tuple_works() {
        let arbitrary = tuple((int(0i64, 3), int(0i64, 3), int(0i64, 3)));
        let mut source = RandomSource::new(2);
        let value = arbitrary.generate(&mut source).unwrap();
        assert!(value.0 <= 3 && value.1 <= 3 && value.2 <= 3);
    }

    #[test]
    fn one_of_draws_from_each_choice() {
        let arbitrary = one_of(vec![
            Box::new(int(0i64, 0)) as BoxedArbitrary<i64>,
            Box::new(int(100i64, 100)),
        ]);
        let mut source = RandomSource::new(19);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..200 {
            match arbitrary.generate(&mut source).unwrap() {
                0 => seen_low = true,
                100 => seen_high = true,
                other => panic!("unexpected value {}", other),
            }
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    #[should_panic(expected = "at least one choice")]
    fn one_of_rejects_empty() {
        one_of(Vec::<BoxedArbitrary<i64>>::new());
    }

    #[test]
    fn weighted_one_of_prefers_heavy_choice() {
        let arbitrary = weighted_one_of(vec![
            (99.0, Box::new(int(1i64, 1)) as BoxedArbitrary<i64>),
            (1.0, Box::new(int(2i64, 2))),
        ]);
        let mut source = RandomSource::new(5);
        let ones = (0..500)
            .filter(|_| arbitrary.generate(&mut source).unwrap() == 1)
            .count();
        assert!(ones > 450);
    }

    #[test]
    #[should_panic(expected = "finite and positive")]
    fn weighted_one_of_rejects_zero_weight() {
        weighted_one_of(vec![(0.0, Box::new(int(1i64, 2)) as BoxedArbitrary<i64>)]);
    }

    #[test]
    fn optional_yields_both_variants_and_shrinks_to_none_first() {
        let arbitrary = optional(int(1i64, 9), 0.5);
        let mut source = RandomSource::new(3);
        let mut seen_none = false;
        let mut seen_some = false;
        for _ in 0..100 {
            match arbitrary.generate(&mut source).unwrap() {
                None => seen_none = true,
                Some(v) => {
                    assert!((1..=9).contains(&v));
                    seen_some = true;
                }
            }
        }
        assert!(seen_none && seen_some);

        let candidates: Vec<Option<i64>> = arbitrary.shrink(&Some(8)).collect();
        assert_eq!(candidates.first(), Some(&None));
        assert!(arbitrary.shrink(&None).next().is_none());
    }

    #[test]
    #[should_panic(expected = "within [0, 1]")]
    fn optional_rejects_bad_probability() {
        optional(int(1i64, 2), 1.5);
    }

    #[test]
    fn map_transforms_but_cannot_shrink() {
        let arbitrary = map(int(1i64, 5), |n| format!("item-{}", n));
        let mut source = RandomSource::new(9);
        let value = arbitrary.generate(&mut source).unwrap();
        assert!(value.starts_with("item-"));
        assert!(arbitrary.shrink(&value).next().is_none());
    }

    #[test]
    fn map_with_inverse_shrinks_through_the_inner_domain() {
        let arbitrary = map_with_inverse(
            int(1i64, 100),
            |n| n * 2,
            |doubled: &i64| doubled / 2,
        );
        let candidates: Vec<i64> = arbitrary.shrink(&200).collect();
        assert!(!candidates.is_empty());
        assert_eq!(candidates.first(), Some(&2));
        assert!(candidates.iter().all(|c| c % 2 == 0));
    }

    #[test]
    fn filter_retries_until_accepted() {
        let arbitrary = filter(int(0i64, 100), |n| n % 2 == 0, 50);
        let mut source = RandomSource::new(13);
        for _ in 0..100 {
            let value = arbitrary.generate(&mut source).unwrap();
            assert_eq!(value % 2, 0);
        }
    }

    #[test]
    fn filter_exhaustion_is_a_generation_error() {
        let arbitrary = filter(constant(3i64), |n| *n != 3, 10);
        let mut source = RandomSource::new(1);
        let result = arbitrary.generate(&mut source);
        match result {
            Err(PropertyError::Generation { message }) => {
                assert!(message.contains("10 attempts"));
            }
            other => panic!("expected generation error, got {:?}", other),
        }
    }

    #[test]
    fn filter_shrink_candidates_still_satisfy_the_predicate() {
        let arbitrary = filter(int(0i64, 100), |n| *n >= 10, 50);
        for candidate in arbitrary.shrink(&96) {
            assert!(candidate >= 10);
        }
    }
}

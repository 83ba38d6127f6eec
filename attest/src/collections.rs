//! Arbitraries for strings and collections.
//!
//! Every collection combines two shrink strategies: a length/size shrink
//! (halving toward the configured minimum, yielding each candidate prefix
//! or subset) and an element-wise shrink (substituting one position's
//! shrink at a time, holding the rest fixed). Unique collections enforce
//! uniqueness at generation (bounded retry, 20 attempts per slot) and at
//! shrink time (candidates that would reintroduce a duplicate are dropped).

use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use crate::arbitrary::{serialized_score, Arbitrary, BoxedArbitrary};
use crate::error::PropertyError;
use crate::rng::RandomSource;

/// Retry budget per slot when a unique collection rejects duplicates.
const UNIQUE_RETRY_ATTEMPTS: u32 = 20;

/// Candidate lengths for a value of length `len` with lower bound `min`:
/// the minimum first, then lengths ever closer to `len`, halving the
/// remaining gap each time so repeated rounds can home in on a boundary.
fn shrink_lengths(len: usize, min: usize) -> Vec<usize> {
    let mut lengths = Vec::new();
    if len <= min {
        return lengths;
    }
    lengths.push(min);
    let mut delta = (len - min) / 2;
    while delta > 0 {
        lengths.push(len - delta);
        delta /= 2;
    }
    lengths
}

fn draw_length(source: &mut RandomSource, min: usize, max: usize) -> usize {
    let span = (max - min + 1) as f64;
    min + (source.draw() * span) as usize
}

fn exhausted_unique(kind: &str, reached: usize, min: usize) -> PropertyError {
    PropertyError::generation(format!(
        "{}: could not satisfy minimum size {} (reached {} after {} attempts per slot)",
        kind, min, reached, UNIQUE_RETRY_ATTEMPTS
    ))
}

/// Arbitrary for printable-ASCII strings with a bounded length.
#[derive(Debug, Clone)]
pub struct StringArbitrary {
    min_len: usize,
    max_len: usize,
}

/// Strings of printable ASCII, length uniform in `[min_len, max_len]`.
///
/// Panics if `min_len > max_len`.
pub fn string(min_len: usize, max_len: usize) -> StringArbitrary {
    assert!(
        min_len <= max_len,
        "string: min_len {} must not exceed max_len {}",
        min_len,
        max_len
    );
    StringArbitrary { min_len, max_len }
}

fn draw_char(source: &mut RandomSource) -> char {
    // Printable ASCII, ' ' through '~'.
    let code = 32 + (source.draw() * 95.0) as u32;
    char::from_u32(code.min(126)).unwrap_or('a')
}

fn char_shrinks(c: char) -> Vec<char> {
    ['a', '0', ' ']
        .into_iter()
        .filter(|candidate| *candidate != c)
        .collect()
}

impl Arbitrary<String> for StringArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<String, PropertyError> {
        let length = draw_length(source, self.min_len, self.max_len);
        Ok((0..length).map(|_| draw_char(source)).collect())
    }

    fn shrink(&self, value: &String) -> Box<dyn Iterator<Item = String>> {
        let chars: Vec<char> = value.chars().collect();
        let mut candidates = Vec::new();
        for length in shrink_lengths(chars.len(), self.min_len) {
            candidates.push(chars[..length].iter().collect());
        }
        for (index, &c) in chars.iter().enumerate() {
            for replacement in char_shrinks(c) {
                let mut next = chars.clone();
                next[index] = replacement;
                candidates.push(next.into_iter().collect());
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &String) -> f64 {
        value.chars().count() as f64
    }
}

/// Arbitrary for vectors of an inner arbitrary's values.
#[derive(Debug, Clone)]
pub struct ArrayArbitrary<T, A> {
    item: A,
    min_len: usize,
    max_len: usize,
    _marker: PhantomData<T>,
}

/// `Vec<T>` with length uniform in `[min_len, max_len]`.
///
/// Panics if `min_len > max_len`.
pub fn array<T, A: Arbitrary<T>>(item: A, min_len: usize, max_len: usize) -> ArrayArbitrary<T, A> {
    assert!(
        min_len <= max_len,
        "array: min_len {} must not exceed max_len {}",
        min_len,
        max_len
    );
    ArrayArbitrary {
        item,
        min_len,
        max_len,
        _marker: PhantomData,
    }
}

impl<T, A> Arbitrary<Vec<T>> for ArrayArbitrary<T, A>
where
    T: Clone + 'static,
    A: Arbitrary<T>,
{
    fn generate(&self, source: &mut RandomSource) -> Result<Vec<T>, PropertyError> {
        let length = draw_length(source, self.min_len, self.max_len);
        let mut values = Vec::with_capacity(length);
        for _ in 0..length {
            values.push(self.item.generate(source)?);
        }
        Ok(values)
    }

    fn shrink(&self, value: &Vec<T>) -> Box<dyn Iterator<Item = Vec<T>>> {
        let mut candidates = Vec::new();
        for length in shrink_lengths(value.len(), self.min_len) {
            candidates.push(value[..length].to_vec());
        }
        for index in 0..value.len() {
            for replacement in self.item.shrink(&value[index]) {
                let mut next = value.clone();
                next[index] = replacement;
                candidates.push(next);
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &Vec<T>) -> f64 {
        value.len() as f64
    }
}

/// Arbitrary for vectors with pairwise-distinct elements.
#[derive(Debug, Clone)]
pub struct UniqueArrayArbitrary<T, A> {
    item: A,
    min_len: usize,
    max_len: usize,
    _marker: PhantomData<T>,
}

/// `Vec<T>` without duplicates, length uniform in `[min_len, max_len]`.
///
/// Panics if `min_len > max_len`.
pub fn unique_array<T, A>(item: A, min_len: usize, max_len: usize) -> UniqueArrayArbitrary<T, A>
where
    T: PartialEq,
    A: Arbitrary<T>,
{
    assert!(
        min_len <= max_len,
        "unique_array: min_len {} must not exceed max_len {}",
        min_len,
        max_len
    );
    UniqueArrayArbitrary {
        item,
        min_len,
        max_len,
        _marker: PhantomData,
    }
}

impl<T, A> Arbitrary<Vec<T>> for UniqueArrayArbitrary<T, A>
where
    T: Clone + PartialEq + 'static,
    A: Arbitrary<T>,
{
    fn generate(&self, source: &mut RandomSource) -> Result<Vec<T>, PropertyError> {
        let target = draw_length(source, self.min_len, self.max_len);
        let mut values: Vec<T> = Vec::with_capacity(target);
        while values.len() < target {
            let mut accepted = false;
            for _ in 0..UNIQUE_RETRY_ATTEMPTS {
                let candidate = self.item.generate(source)?;
                if !values.contains(&candidate) {
                    values.push(candidate);
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                if values.len() >= self.min_len {
                    break;
                }
                return Err(exhausted_unique("unique_array", values.len(), self.min_len));
            }
        }
        Ok(values)
    }

    fn shrink(&self, value: &Vec<T>) -> Box<dyn Iterator<Item = Vec<T>>> {
        let mut candidates = Vec::new();
        // Prefixes of a duplicate-free vector stay duplicate-free.
        for length in shrink_lengths(value.len(), self.min_len) {
            candidates.push(value[..length].to_vec());
        }
        for index in 0..value.len() {
            for replacement in self.item.shrink(&value[index]) {
                let duplicate = value
                    .iter()
                    .enumerate()
                    .any(|(other, existing)| other != index && *existing == replacement);
                if duplicate {
                    continue;
                }
                let mut next = value.clone();
                next[index] = replacement;
                candidates.push(next);
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &Vec<T>) -> f64 {
        value.len() as f64
    }
}

/// Arbitrary for ordered sets.
#[derive(Debug, Clone)]
pub struct SetArbitrary<T, A> {
    item: A,
    min_size: usize,
    max_size: usize,
    _marker: PhantomData<T>,
}

/// `BTreeSet<T>` with size uniform in `[min_size, max_size]`.
///
/// Panics if `min_size > max_size`.
pub fn set<T, A>(item: A, min_size: usize, max_size: usize) -> SetArbitrary<T, A>
where
    T: Ord,
    A: Arbitrary<T>,
{
    assert!(
        min_size <= max_size,
        "set: min_size {} must not exceed max_size {}",
        min_size,
        max_size
    );
    SetArbitrary {
        item,
        min_size,
        max_size,
        _marker: PhantomData,
    }
}

impl<T, A> Arbitrary<BTreeSet<T>> for SetArbitrary<T, A>
where
    T: Clone + Ord + 'static,
    A: Arbitrary<T>,
{
    fn generate(&self, source: &mut RandomSource) -> Result<BTreeSet<T>, PropertyError> {
        let target = draw_length(source, self.min_size, self.max_size);
        let mut values = BTreeSet::new();
        while values.len() < target {
            let mut accepted = false;
            for _ in 0..UNIQUE_RETRY_ATTEMPTS {
                if values.insert(self.item.generate(source)?) {
                    accepted = true;
                    break;
                }
            }
            if !accepted {
                if values.len() >= self.min_size {
                    break;
                }
                return Err(exhausted_unique("set", values.len(), self.min_size));
            }
        }
        Ok(values)
    }

    fn shrink(&self, value: &BTreeSet<T>) -> Box<dyn Iterator<Item = BTreeSet<T>>> {
        let elements: Vec<T> = value.iter().cloned().collect();
        let mut candidates = Vec::new();
        for size in shrink_lengths(elements.len(), self.min_size) {
            candidates.push(elements[..size].iter().cloned().collect());
        }
        for element in &elements {
            for replacement in self.item.shrink(element) {
                if value.contains(&replacement) {
                    continue;
                }
                let mut next = value.clone();
                next.remove(element);
                next.insert(replacement);
                candidates.push(next);
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &BTreeSet<T>) -> f64 {
        value.len() as f64
    }
}

/// Arbitrary for maps with generated keys and values.
#[derive(Debug, Clone)]
pub struct DictionaryArbitrary<K, V, AK, AV> {
    key: AK,
    value: AV,
    min_size: usize,
    max_size: usize,
    _marker: PhantomData<(K, V)>,
}

/// `BTreeMap<K, V>` with size uniform in `[min_size, max_size]` and
/// duplicate keys rejected during generation.
///
/// Panics if `min_size > max_size`.
pub fn dictionary<K, V, AK, AV>(
    key: AK,
    value: AV,
    min_size: usize,
    max_size: usize,
) -> DictionaryArbitrary<K, V, AK, AV>
where
    K: Ord,
    AK: Arbitrary<K>,
    AV: Arbitrary<V>,
{
    assert!(
        min_size <= max_size,
        "dictionary: min_size {} must not exceed max_size {}",
        min_size,
        max_size
    );
    DictionaryArbitrary {
        key,
        value,
        min_size,
        max_size,
        _marker: PhantomData,
    }
}

impl<K, V, AK, AV> Arbitrary<BTreeMap<K, V>> for DictionaryArbitrary<K, V, AK, AV>
where
    K: Clone + Ord + 'static,
    V: Clone + 'static,
    AK: Arbitrary<K>,
    AV: Arbitrary<V>,
{
    fn generate(&self, source: &mut RandomSource) -> Result<BTreeMap<K, V>, PropertyError> {
        let target = draw_length(source, self.min_size, self.max_size);
        let mut entries = BTreeMap::new();
        while entries.len() < target {
            let mut accepted = false;
            for _ in 0..UNIQUE_RETRY_ATTEMPTS {
                let key = self.key.generate(source)?;
                if entries.contains_key(&key) {
                    continue;
                }
                let value = self.value.generate(source)?;
                entries.insert(key, value);
                accepted = true;
                break;
            }
            if !accepted {
                if entries.len() >= self.min_size {
                    break;
                }
                return Err(exhausted_unique("dictionary", entries.len(), self.min_size));
            }
        }
        Ok(entries)
    }

    fn shrink(&self, value: &BTreeMap<K, V>) -> Box<dyn Iterator<Item = BTreeMap<K, V>>> {
        let entries: Vec<(K, V)> = value
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut candidates = Vec::new();
        for size in shrink_lengths(entries.len(), self.min_size) {
            candidates.push(entries[..size].iter().cloned().collect());
        }
        for (key, existing) in &entries {
            for replacement in self.value.shrink(existing) {
                let mut next = value.clone();
                next.insert(key.clone(), replacement);
                candidates.push(next);
            }
            for replacement_key in self.key.shrink(key) {
                if value.contains_key(&replacement_key) {
                    continue;
                }
                let mut next = value.clone();
                next.remove(key);
                next.insert(replacement_key, existing.clone());
                candidates.push(next);
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &BTreeMap<K, V>) -> f64 {
        value.len() as f64
    }
}

/// Arbitrary for a fixed set of named fields.
pub struct RecordArbitrary<V> {
    fields: Vec<(String, BoxedArbitrary<V>)>,
}

/// A map with a fixed key set, one arbitrary per field; shrinking
/// substitutes one field's shrink at a time.
pub fn record<V>(fields: Vec<(&str, BoxedArbitrary<V>)>) -> RecordArbitrary<V> {
    RecordArbitrary {
        fields: fields
            .into_iter()
            .map(|(name, arbitrary)| (name.to_string(), arbitrary))
            .collect(),
    }
}

impl<V> Arbitrary<BTreeMap<String, V>> for RecordArbitrary<V>
where
    V: Clone + serde::Serialize + 'static,
{
    fn generate(&self, source: &mut RandomSource) -> Result<BTreeMap<String, V>, PropertyError> {
        let mut values = BTreeMap::new();
        for (name, arbitrary) in &self.fields {
            values.insert(name.clone(), arbitrary.generate(source)?);
        }
        Ok(values)
    }

    fn shrink(&self, value: &BTreeMap<String, V>) -> Box<dyn Iterator<Item = BTreeMap<String, V>>> {
        let mut candidates = Vec::new();
        for (name, arbitrary) in &self.fields {
            let Some(current) = value.get(name) else {
                continue;
            };
            for replacement in arbitrary.shrink(current) {
                let mut next = value.clone();
                next.insert(name.clone(), replacement);
                candidates.push(next);
            }
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &BTreeMap<String, V>) -> f64 {
        serialized_score(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{boolean, int};

    #[test]
    fn shrink_lengths_start_at_the_minimum_and_close_in() {
        assert_eq!(shrink_lengths(10, 0), vec![0, 5, 8, 9]);
        assert_eq!(shrink_lengths(10, 2), vec![2, 6, 8, 9]);
        assert_eq!(shrink_lengths(1, 0), vec![0]);
        assert_eq!(shrink_lengths(3, 3), Vec::<usize>::new());
    }

    #[test]
    fn string_respects_length_bounds() {
        let arbitrary = string(2, 8);
        let mut source = RandomSource::new(13);
        for _ in 0..200 {
            let value = arbitrary.generate(&mut source).unwrap();
            assert!((2..=8).contains(&value.len()));
            assert!(value.chars().all(|c| (' '..='~').contains(&c)));
        }
    }

    #[test]
    fn string_shrinks_to_minimum_length() {
        let arbitrary = string(0, 16);
        let mut source = RandomSource::new(3);
        let value = loop {
            let candidate = arbitrary.generate(&mut source).unwrap();
            if candidate.len() > 2 {
                break candidate;
            }
        };
        let candidates: Vec<String> = arbitrary.shrink(&value).collect();
        assert!(candidates.iter().any(|c| c.is_empty()));
        for candidate in &candidates {
            assert!(candidate.len() <= 16);
        }
    }

    #[test]
    fn array_shrink_is_bounds_closed() {
        let arbitrary = array(int(1i64, 9), 1, 6);
        let value = vec![9, 4, 7];
        for candidate in arbitrary.shrink(&value) {
            assert!(!candidate.is_empty() && candidate.len() <= 6);
            assert!(candidate.iter().all(|v| (1..=9).contains(v)));
        }
    }

    #[test]
    fn unique_array_never_duplicates() {
        let arbitrary = unique_array(int(0i64, 30), 0, 12);
        for seed in 1..50u32 {
            let mut source = RandomSource::new(seed);
            let value = arbitrary.generate(&mut source).unwrap();
            for (i, a) in value.iter().enumerate() {
                assert!(!value[i + 1..].contains(a), "duplicate in {:?}", value);
            }
        }
    }

    #[test]
    fn unique_array_errors_when_domain_too_small() {
        // Two booleans exist; a minimum of three distinct values cannot be met.
        let arbitrary = unique_array(boolean(), 3, 5);
        let mut source = RandomSource::new(1);
        let result = arbitrary.generate(&mut source);
        assert!(matches!(result, Err(PropertyError::Generation { .. })));
    }

    #[test]
    fn unique_array_shrink_filters_duplicates() {
        let arbitrary = unique_array(int(0i64, 10), 0, 6);
        let value = vec![5, 2, 0];
        for candidate in arbitrary.shrink(&value) {
            for (i, a) in candidate.iter().enumerate() {
                assert!(!candidate[i + 1..].contains(a));
            }
        }
    }

    #[test]
    fn set_generation_and_shrink_stay_unique() {
        let arbitrary = set(int(0i64, 40), 2, 10);
        let mut source = RandomSource::new(17);
        let value = arbitrary.generate(&mut source).unwrap();
        assert!((2..=10).contains(&value.len()));
        for candidate in arbitrary.shrink(&value) {
            assert!(candidate.len() >= 2);
        }
    }

    #[test]
    fn dictionary_keys_are_unique_and_bounded() {
        let arbitrary = dictionary(int(0i64, 50), string(0, 4), 1, 8);
        for seed in 1..30u32 {
            let mut source = RandomSource::new(seed);
            let value = arbitrary.generate(&mut source).unwrap();
            assert!((1..=8).contains(&value.len()));
        }
    }

    #[test]
    fn dictionary_shrink_preserves_key_uniqueness() {
        let arbitrary = dictionary(int(0i64, 9), int(0i64, 9), 0, 4);
        let mut source = RandomSource::new(23);
        let value = arbitrary.generate(&mut source).unwrap();
        for candidate in arbitrary.shrink(&value) {
            assert!(candidate.len() <= value.len());
        }
    }

    #[test]
    fn record_generates_every_field_and_shrinks_one_at_a_time() {
        let arbitrary = record(vec![
            ("count", Box::new(int(1i64, 100)) as BoxedArbitrary<i64>),
            ("retries", Box::new(int(0i64, 5)) as BoxedArbitrary<i64>),
        ]);
        let mut source = RandomSource::new(31);
        let value = arbitrary.generate(&mut source).unwrap();
        assert_eq!(value.len(), 2);
        assert!(value.contains_key("count"));
        for candidate in arbitrary.shrink(&value) {
            let changed = candidate
                .iter()
                .filter(|(k, v)| value.get(*k) != Some(v))
                .count();
            assert_eq!(changed, 1);
        }
    }
}

//! Arbitraries for structured domain values: UUIDs, email addresses,
//! timestamps.

use chrono::{DateTime, Utc};

use crate::arbitrary::Arbitrary;
use crate::error::PropertyError;
use crate::primitives::{int, IntArbitrary};
use crate::rng::RandomSource;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Position of the version nibble in the canonical 8-4-4-4-12 rendering.
const UUID_VERSION_INDEX: usize = 14;
/// Position of the variant nibble.
const UUID_VARIANT_INDEX: usize = 19;

/// Arbitrary for random (version 4) UUIDs in canonical lowercase form.
#[derive(Debug, Clone)]
pub struct UuidArbitrary;

/// Version-4 UUID strings, e.g. `"1a2b3c4d-5e6f-4a0b-9c8d-0f1e2d3c4b5a"`.
pub fn uuid() -> UuidArbitrary {
    UuidArbitrary
}

fn hex_nibble(source: &mut RandomSource) -> u8 {
    HEX[((source.draw() * 16.0) as usize).min(15)]
}

impl Arbitrary<String> for UuidArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<String, PropertyError> {
        let mut out = Vec::with_capacity(36);
        for group_len in [8usize, 4, 4, 4, 12] {
            if !out.is_empty() {
                out.push(b'-');
            }
            for _ in 0..group_len {
                out.push(hex_nibble(source));
            }
        }
        // Pin the version and constrain the variant to 8..=b.
        out[UUID_VERSION_INDEX] = b'4';
        out[UUID_VARIANT_INDEX] = HEX[8 + ((source.draw() * 4.0) as usize).min(3)];
        Ok(String::from_utf8(out).unwrap_or_default())
    }

    fn shrink(&self, value: &String) -> Box<dyn Iterator<Item = String>> {
        let bytes = value.as_bytes();
        if bytes.len() != 36 {
            return Box::new(std::iter::empty());
        }
        let minimal = "00000000-0000-4000-8000-000000000000".to_string();
        let mut candidates = Vec::new();
        // Zero one dash-separated segment at a time, keeping the version
        // and variant nibbles intact.
        let segments = [(0usize, 8usize), (9, 13), (14, 18), (19, 23), (24, 36)];
        for (start, end) in segments {
            let mut next = bytes.to_vec();
            let mut changed = false;
            for index in start..end {
                if index == UUID_VERSION_INDEX {
                    continue;
                }
                let replacement = if index == UUID_VARIANT_INDEX {
                    b'8'
                } else {
                    b'0'
                };
                if next[index] != replacement {
                    next[index] = replacement;
                    changed = true;
                }
            }
            if changed {
                candidates.push(String::from_utf8(next).unwrap_or_default());
            }
        }
        if *value != minimal {
            candidates.push(minimal);
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &String) -> f64 {
        value
            .chars()
            .filter(|c| c.is_ascii_hexdigit() && *c != '0')
            .count() as f64
    }
}

const EMAIL_TLDS: [&str; 4] = ["com", "org", "net", "io"];

/// Arbitrary for plausible email addresses.
#[derive(Debug, Clone)]
pub struct EmailArbitrary;

/// Email addresses of the shape `local@domain.tld`: a lowercase
/// alphanumeric local part starting with a letter, a lowercase domain,
/// and a common top-level domain.
pub fn email() -> EmailArbitrary {
    EmailArbitrary
}

fn lowercase_letter(source: &mut RandomSource) -> char {
    (b'a' + ((source.draw() * 26.0) as u8).min(25)) as char
}

fn lowercase_alnum(source: &mut RandomSource) -> char {
    let index = ((source.draw() * 36.0) as usize).min(35);
    if index < 26 {
        (b'a' + index as u8) as char
    } else {
        (b'0' + (index - 26) as u8) as char
    }
}

fn split_email(value: &str) -> Option<(&str, &str, &str)> {
    let (local, rest) = value.split_once('@')?;
    let (domain, tld) = rest.rsplit_once('.')?;
    if local.is_empty() || domain.is_empty() || tld.is_empty() {
        return None;
    }
    Some((local, domain, tld))
}

impl Arbitrary<String> for EmailArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<String, PropertyError> {
        let local_len = 1 + (source.draw() * 12.0) as usize;
        let mut local = String::with_capacity(local_len);
        local.push(lowercase_letter(source));
        for _ in 1..local_len {
            local.push(lowercase_alnum(source));
        }

        let domain_len = 1 + (source.draw() * 10.0) as usize;
        let domain: String = (0..domain_len).map(|_| lowercase_letter(source)).collect();

        let tld = EMAIL_TLDS[((source.draw() * EMAIL_TLDS.len() as f64) as usize)
            .min(EMAIL_TLDS.len() - 1)];
        Ok(format!("{}@{}.{}", local, domain, tld))
    }

    fn shrink(&self, value: &String) -> Box<dyn Iterator<Item = String>> {
        let Some((local, domain, tld)) = split_email(value) else {
            return Box::new(std::iter::empty());
        };
        let mut candidates = Vec::new();
        // Halve the local part, then the domain, then simplify the TLD,
        // keeping the @ and . structure intact throughout.
        let mut len = local.len() / 2;
        while len >= 1 {
            candidates.push(format!("{}@{}.{}", &local[..len], domain, tld));
            if len == 1 {
                break;
            }
            len /= 2;
        }
        let mut len = domain.len() / 2;
        while len >= 1 {
            candidates.push(format!("{}@{}.{}", local, &domain[..len], tld));
            if len == 1 {
                break;
            }
            len /= 2;
        }
        if tld != "com" {
            candidates.push(format!("{}@{}.com", local, domain));
        }
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &String) -> f64 {
        value.chars().count() as f64
    }
}

/// Arbitrary for UTC timestamps, uniform at millisecond precision.
#[derive(Debug, Clone)]
pub struct DateArbitrary {
    millis: IntArbitrary<i64>,
}

/// Timestamps uniform in `[min, max]` at millisecond precision, shrinking
/// the way integers do over the underlying epoch milliseconds.
///
/// Panics if `min > max` (via the integer range underneath).
pub fn date(min: DateTime<Utc>, max: DateTime<Utc>) -> DateArbitrary {
    DateArbitrary {
        millis: int(min.timestamp_millis(), max.timestamp_millis()),
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, PropertyError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        PropertyError::generation(format!("date: {} ms is outside the representable range", millis))
    })
}

impl Arbitrary<DateTime<Utc>> for DateArbitrary {
    fn generate(&self, source: &mut RandomSource) -> Result<DateTime<Utc>, PropertyError> {
        from_millis(self.millis.generate(source)?)
    }

    fn shrink(&self, value: &DateTime<Utc>) -> Box<dyn Iterator<Item = DateTime<Utc>>> {
        let candidates: Vec<DateTime<Utc>> = self
            .millis
            .shrink(&value.timestamp_millis())
            .filter_map(|millis| DateTime::from_timestamp_millis(millis))
            .collect();
        Box::new(candidates.into_iter())
    }

    fn score(&self, value: &DateTime<Utc>) -> f64 {
        self.millis.score(&value.timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn is_canonical_uuid(value: &str) -> bool {
        let bytes = value.as_bytes();
        if bytes.len() != 36 {
            return false;
        }
        for (index, byte) in bytes.iter().enumerate() {
            let expected_dash = matches!(index, 8 | 13 | 18 | 23);
            if expected_dash != (*byte == b'-') {
                return false;
            }
            if !expected_dash && !byte.is_ascii_hexdigit() {
                return false;
            }
        }
        bytes[UUID_VERSION_INDEX] == b'4' && matches!(bytes[UUID_VARIANT_INDEX], b'8'..=b'b')
    }

    #[test]
    fn uuid_is_canonical_version_four() {
        let arbitrary = uuid();
        let mut source = RandomSource::new(41);
        for _ in 0..100 {
            let value = arbitrary.generate(&mut source).unwrap();
            assert!(is_canonical_uuid(&value), "bad uuid {}", value);
        }
    }

    #[test]
    fn uuid_shrinks_stay_canonical_and_reach_the_minimum() {
        let arbitrary = uuid();
        let mut source = RandomSource::new(6);
        let value = arbitrary.generate(&mut source).unwrap();
        let candidates: Vec<String> = arbitrary.shrink(&value).collect();
        assert!(candidates
            .iter()
            .any(|c| c == "00000000-0000-4000-8000-000000000000"));
        for candidate in &candidates {
            assert!(is_canonical_uuid(candidate), "bad shrink {}", candidate);
        }
    }

    #[test]
    fn minimal_uuid_shrinks_no_further() {
        let arbitrary = uuid();
        let minimal = "00000000-0000-4000-8000-000000000000".to_string();
        assert!(arbitrary.shrink(&minimal).next().is_none());
    }

    #[test]
    fn email_has_expected_shape() {
        let arbitrary = email();
        let mut source = RandomSource::new(27);
        for _ in 0..100 {
            let value = arbitrary.generate(&mut source).unwrap();
            let (local, domain, tld) = split_email(&value).expect("shape");
            assert!(local.chars().next().unwrap().is_ascii_lowercase());
            assert!(local.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
            assert!(domain.chars().all(|c| c.is_ascii_lowercase()));
            assert!(EMAIL_TLDS.contains(&tld));
        }
    }

    #[test]
    fn email_shrinks_keep_the_structure() {
        let arbitrary = email();
        let value = "longlocalpart@widedomain.org".to_string();
        let candidates: Vec<String> = arbitrary.shrink(&value).collect();
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert!(split_email(candidate).is_some(), "bad shrink {}", candidate);
        }
        assert!(candidates.iter().any(|c| c.ends_with(".com")));
        assert!(candidates.iter().any(|c| c.starts_with("l@")));
    }

    #[test]
    fn date_stays_within_bounds() {
        let min = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let max = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let arbitrary = date(min, max);
        let mut source = RandomSource::new(15);
        for _ in 0..200 {
            let value = arbitrary.generate(&mut source).unwrap();
            assert!(value >= min && value <= max);
        }
    }

    #[test]
    fn date_shrinks_toward_the_lower_bound() {
        let min = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let max = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        let arbitrary = date(min, max);
        let value = Utc.with_ymd_and_hms(2023, 6, 15, 12, 0, 0).unwrap();
        let candidates: Vec<DateTime<Utc>> = arbitrary.shrink(&value).collect();
        assert_eq!(candidates.first(), Some(&min));
        for candidate in &candidates {
            assert!(*candidate >= min && *candidate <= max);
        }
    }
}

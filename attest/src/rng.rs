//! Deterministic random source with independent-substream forking.
//!
//! Every trial, and every parameter generated inside a trial, draws from its
//! own forked stream. Forking consumes exactly one draw from the parent, so
//! however many draws a sub-generator makes, the parent's subsequent draws
//! are unaffected. That isolation is what makes seeded runs replayable.

use std::time::{SystemTime, UNIX_EPOCH};

/// Replacement state for the all-zero seed, which is a fixed point of the
/// xorshift transform.
const ZERO_SEED_REMAP: u32 = 0x9E37_79B9;

/// A deterministic pseudo-random stream backed by 32-bit xorshift state.
///
/// The transform is a pure integer permutation, so a given seed produces the
/// same draw sequence on every target. [`RandomSource`] also implements
/// [`rand::RngCore`], which lets it drive any rand-based API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSource {
    state: u32,
}

impl RandomSource {
    /// Create a source from an explicit seed.
    ///
    /// Seed 0 is remapped to a fixed nonzero constant; the all-zero state
    /// would otherwise never leave zero.
    pub fn new(seed: u32) -> Self {
        let state = if seed == 0 { ZERO_SEED_REMAP } else { seed };
        Self { state }
    }

    /// Create a source seeded from the current time.
    pub fn from_entropy() -> Self {
        Self::new(seed_from_time())
    }

    fn next_state(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Draw the next value in `[0, 1)`.
    pub fn draw(&mut self) -> f64 {
        f64::from(self.next_state()) / (f64::from(u32::MAX) + 1.0)
    }

    /// Fork an independent child stream, consuming exactly one draw from
    /// this source to seed it.
    ///
    /// The drawn state is scrambled before it becomes the child's seed;
    /// seeding with the raw state would make the child an exact copy of
    /// the parent's own subsequent stream.
    pub fn fork(&mut self) -> RandomSource {
        RandomSource::new(scramble(self.next_state()))
    }
}

/// 32-bit avalanche mix (xor-shift-multiply), decorrelating a forked
/// child's seed from the parent's state.
fn scramble(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7FEB_352D);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846C_A68B);
    x ^= x >> 16;
    x
}

impl rand::RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.next_state()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_state());
        let lo = u64::from(self.next_state());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = self.next_state().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Derive a seed from the system clock, for runs that do not pin one.
pub fn seed_from_time() -> u32 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.subsec_nanos() ^ (now.as_secs() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RandomSource::new(12345);
        let mut b = RandomSource::new(12345);
        for _ in 0..100 {
            assert_eq!(a.draw().to_bits(), b.draw().to_bits());
        }
    }

    #[test]
    fn draws_stay_in_unit_interval() {
        let mut source = RandomSource::new(7);
        for _ in 0..1000 {
            let v = source.draw();
            assert!((0.0..1.0).contains(&v), "draw out of range: {}", v);
        }
    }

    #[test]
    fn zero_seed_is_not_degenerate() {
        let mut source = RandomSource::new(0);
        let first = source.draw();
        let second = source.draw();
        assert_ne!(first, second);
        assert_ne!(first, 0.0);
    }

    #[test]
    fn fork_isolates_child_from_parent() {
        // Draining the child must not perturb the parent's own stream.
        let mut parent = RandomSource::new(99);
        let mut reference = RandomSource::new(99);

        let mut child = parent.fork();
        for _ in 0..50 {
            child.draw();
        }

        reference.fork();
        for _ in 0..20 {
            assert_eq!(parent.draw().to_bits(), reference.draw().to_bits());
        }
    }

    #[test]
    fn fork_and_parent_diverge() {
        let mut disagreements = 0;
        for seed in 1..200u32 {
            let mut parent = RandomSource::new(seed);
            let mut child = parent.fork();
            let mut parent_again = RandomSource::new(seed);
            parent_again.fork();
            if child.draw() != parent_again.draw() {
                disagreements += 1;
            }
        }
        assert!(disagreements > 190, "forked streams track the parent");
    }

    #[test]
    fn fork_does_not_copy_the_parent_stream() {
        // A child seeded with the parent's raw state would replay the
        // parent's own subsequent draws one-for-one.
        let mut parent = RandomSource::new(12345);
        let mut child = parent.fork();
        assert_ne!(child, parent);
        for _ in 0..10 {
            assert_ne!(child.draw().to_bits(), parent.clone().draw().to_bits());
            parent.draw();
        }
    }

    #[test]
    fn rng_core_interop() {
        use rand::RngCore;
        let mut source = RandomSource::new(42);
        let mut bytes = [0u8; 7];
        source.fill_bytes(&mut bytes);
        assert_ne!(bytes, [0u8; 7]);
        let _ = source.next_u64();
    }
}

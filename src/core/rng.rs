//! Deterministic Random Number Generator
//!
//! Uses Xorshift128+ for fast, high-quality, deterministic randomness.
//! Given the same seed, produces identical sequences on all platforms,
//! which is what makes full match replay from a command log possible.

use serde::{Serialize, Deserialize};
use sha2::{Sha256, Digest};

/// One roll of the two movement dice (one d6, one d4).
///
/// `sum` routes movement to an area; `difference` is attack damage.
/// Ephemeral: retained on the match only as "last roll" for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// Six-sided die face (1-6)
    pub d6: u8,
    /// Four-sided die face (1-4)
    pub d4: u8,
    /// d6 + d4 (2-10)
    pub sum: u8,
    /// |d6 - d4| (0-5)
    pub difference: u8,
}

/// Deterministic PRNG using the Xorshift128+ algorithm.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG produces the exact same sequence of
/// values on any platform. The engine derives a fresh instance per
/// command from the match seed plus the applied-event counter, so the
/// randomness of any past command can be re-derived exactly.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeterministicRng {
    state: [u64; 2],
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl DeterministicRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG from a string seed (the match-level seed format).
    pub fn from_seed_str(seed: &str) -> Self {
        Self::new(hash_seed_str(seed, 0))
    }

    /// Create the RNG for one command.
    ///
    /// Derived from the match seed combined with the applied-event counter
    /// at the time the command is processed. Re-deriving at any past
    /// counter value reproduces that command's randomness exactly.
    pub fn for_command(seed: &str, events_applied: u64) -> Self {
        Self::new(hash_seed_str(seed, events_applied))
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a uniform float in [0, 1).
    ///
    /// Uses the upper 53 bits so the mapping to f64 is exact.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Generate a random integer in range [0, max).
    #[inline]
    pub fn next_int(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // Simple modulo - bias is negligible for the small ranges
        // (dice faces, deck indices) this engine draws.
        (self.next_u64() % max as u64) as u32
    }

    /// Generate a random integer in range [min, max] inclusive.
    #[inline]
    pub fn int_range(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let range = (max - min + 1) as u32;
        min + self.next_int(range) as i32
    }

    /// Roll a six-sided die.
    #[inline]
    pub fn roll_d6(&mut self) -> u8 {
        self.int_range(1, 6) as u8
    }

    /// Roll a four-sided die.
    #[inline]
    pub fn roll_d4(&mut self) -> u8 {
        self.int_range(1, 4) as u8
    }

    /// Roll both movement dice.
    pub fn roll_dice(&mut self) -> DiceRoll {
        let d6 = self.roll_d6();
        let d4 = self.roll_d4();
        DiceRoll {
            d6,
            d4,
            sum: d6 + d4,
            difference: d6.abs_diff(d4),
        }
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_int((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Return a shuffled copy of a vector.
    pub fn shuffled<T>(&mut self, mut items: Vec<T>) -> Vec<T> {
        self.shuffle(&mut items);
        items
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_int(slice.len() as u32) as usize;
            Some(&slice[idx])
        }
    }

    /// Sample `count` distinct elements without replacement.
    ///
    /// Returns all elements (in original order) if `count >= len`.
    pub fn choose_many<T: Clone>(&mut self, slice: &[T], count: usize) -> Vec<T> {
        if count >= slice.len() {
            return slice.to_vec();
        }
        let mut available: Vec<T> = slice.to_vec();
        let mut result = Vec::with_capacity(count);
        for _ in 0..count {
            let idx = self.next_int(available.len() as u32) as usize;
            result.push(available.remove(idx));
        }
        result
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> [u64; 2] {
        self.state
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a 64-bit seed from the match seed string and a draw counter.
///
/// Domain-separated so unrelated uses of the same string can never
/// collide with command seeds.
fn hash_seed_str(seed: &str, counter: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(b"UMBRA_MATCH_SEED_V1");
    hasher.update(seed.as_bytes());
    hasher.update(counter.to_le_bytes());
    let hash = hasher.finalize();
    u64::from_le_bytes(hash[0..8].try_into().expect("sha256 output is 32 bytes"))
}

// =============================================================================
// TESTS
// =============================================================================

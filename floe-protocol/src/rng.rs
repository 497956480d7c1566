//! Uniform random draws for transaction-id generation.

use rand::distributions::uniform::SampleUniform;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Source of uniformly-distributed random integers.
///
/// Owns a ChaCha20 generator seeded once from OS entropy. Not meant as a
/// security primitive, but transaction ids drawn from it are uniform over
/// their full 96 bits.
pub struct RandomSource {
    rng: ChaCha20Rng,
}

impl RandomSource {
    /// Seeds the generator from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Seeds the generator deterministically. Intended for tests.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            rng: ChaCha20Rng::from_seed(seed),
        }
    }

    /// Draws a uniform sample from the closed interval `[lo, hi]`.
    ///
    /// # Panics
    ///
    /// Panics if `lo > hi`.
    pub fn draw<T>(&mut self, lo: T, hi: T) -> T
    where
        T: SampleUniform + PartialOrd,
    {
        self.rng.gen_range(lo..=hi)
    }

    /// Fills `dst` with random bytes.
    pub fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.rng.fill_bytes(dst);
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource").finish_non_exhaustive()
    }
}

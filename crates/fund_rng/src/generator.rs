//! Stateful random stream bound to one `(purpose, instance_id)` key.
//!
//! This module provides [`Generator`], a seeded ChaCha20 stream with the
//! uniform/normal primitives the sampling API builds on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, StandardNormal};

/// Identity of a random stream.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    /// Logical source of randomness, e.g. `"price_path_green"`.
    pub purpose: String,
    /// Distinguishes repeated uses of one purpose.
    pub instance_id: u64,
}

impl StreamKey {
    /// Creates a key.
    pub fn new(purpose: impl Into<String>, instance_id: u64) -> Self {
        Self {
            purpose: purpose.into(),
            instance_id,
        }
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.purpose, self.instance_id)
    }
}

/// Seeded random stream.
///
/// Every draw advances the stream; the factory never re-seeds it. ChaCha20
/// is used because its output for a given seed is fixed across platforms
/// and crate releases.
///
/// # Examples
///
/// ```rust
/// use fund_rng::Generator;
///
/// let mut a = Generator::from_seed(12345);
/// let mut b = Generator::from_seed(12345);
///
/// // Same seed produces identical sequences
/// assert_eq!(a.gen_normal(), b.gen_normal());
/// assert_eq!(a.gen_uniform(), b.gen_uniform());
/// ```
#[derive(Clone, Debug)]
pub struct Generator {
    inner: ChaCha20Rng,
    seed: u32,
    draws: u64,
}

impl Generator {
    /// Creates a stream initialised with `seed`.
    #[inline]
    pub fn from_seed(seed: u32) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(u64::from(seed)),
            seed,
            draws: 0,
        }
    }

    /// Seed the stream was created with.
    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of primitive draws taken so far.
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn gen_uniform(&mut self) -> f64 {
        self.draws += 1;
        self.inner.gen()
    }

    /// Standard normal variate (mean 0, std 1).
    #[inline]
    pub fn gen_normal(&mut self) -> f64 {
        self.draws += 1;
        StandardNormal.sample(&mut self.inner)
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    #[inline]
    pub fn gen_index(&mut self, len: usize) -> usize {
        self.draws += 1;
        self.inner.gen_range(0..len)
    }

    /// Draws from an arbitrary `rand`/`rand_distr` distribution.
    #[inline]
    pub fn sample<T, D: Distribution<T>>(&mut self, distribution: &D) -> T {
        self.draws += 1;
        distribution.sample(&mut self.inner)
    }

    /// Fills the buffer with standard normal variates.
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = self.gen_normal();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_seed_reproducibility() {
        let mut rng1 = Generator::from_seed(12345);
        let mut rng2 = Generator::from_seed(12345);

        for _ in 0..100 {
            assert_eq!(rng1.gen_uniform(), rng2.gen_uniform());
            assert_eq!(rng1.gen_normal(), rng2.gen_normal());
        }
        assert_eq!(rng1.draws(), 200);
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = Generator::from_seed(42);
        for _ in 0..10_000 {
            let value = rng.gen_uniform();
            assert!(
                (0.0..1.0).contains(&value),
                "Uniform value {} out of range",
                value
            );
        }
    }

    #[test]
    fn test_empty_buffer() {
        let mut rng = Generator::from_seed(42);
        let mut empty: Vec<f64> = vec![];
        rng.fill_normal(&mut empty);
        assert_eq!(rng.draws(), 0);
    }

    #[test]
    fn test_stream_key_display() {
        assert_eq!(StreamKey::new("defaults", 3).to_string(), "defaults#3");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_seed_determinism(seed in any::<u32>(), count in 1..500usize) {
            let mut rng1 = Generator::from_seed(seed);
            let mut rng2 = Generator::from_seed(seed);
            for i in 0..count {
                let v1 = rng1.gen_normal();
                let v2 = rng2.gen_normal();
                prop_assert_eq!(v1, v2, "Mismatch at index {} for seed {}", i, seed);
            }
        }

        #[test]
        fn prop_normal_moments(seed in any::<u32>()) {
            let mut rng = Generator::from_seed(seed);
            let n = 50_000;
            let mut buffer = vec![0.0; n];
            rng.fill_normal(&mut buffer);

            let mean = buffer.iter().sum::<f64>() / n as f64;
            let variance = buffer.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;

            prop_assert!(
                mean.abs() < 0.05,
                "Mean {:.4} too far from 0 (seed={})",
                mean,
                seed
            );
            prop_assert!(
                (variance - 1.0).abs() < 0.1,
                "Variance {:.4} too far from 1 (seed={})",
                variance,
                seed
            );
        }
    }
}

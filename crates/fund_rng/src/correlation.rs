//! Correlated pairs of random streams.
//!
//! Two standard normals `z1`, `z2` from independent streams are combined as
//!
//! ```text
//! x1 = mean1 + std1 * z1
//! x2 = mean2 + std2 * (rho * z1 + sqrt(1 - rho^2) * z2)
//! ```
//!
//! giving a bivariate normal pair with Pearson correlation `rho`.
//!
//! The first stream of a pair is the ordinary `(purpose1, instance_id)`
//! generator. The second stream is cached under the directional key
//! `(purpose1, purpose2, instance_id)`: asking for `(b, a)` after `(a, b)`
//! creates a separate second stream, while the coefficient lookup in the
//! correlation matrix is symmetric.

use tracing::debug;

use crate::error::Result;
use crate::factory::{GeneratorId, PairKey, RandomFactory};
use crate::generator::Generator;
use crate::seed;

impl RandomFactory {
    /// Coefficient used for a `(purpose1, purpose2)` pair.
    ///
    /// `matrix[purpose1][purpose2]` wins over `matrix[purpose2][purpose1]`,
    /// which wins over `requested`. The result is clamped to `[-1, 1]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fund_rng::{FactoryConfig, RandomFactory};
    ///
    /// let factory = RandomFactory::new(
    ///     FactoryConfig::default().with_correlation("defaults", "prepayments", -0.4),
    /// );
    /// assert_eq!(factory.effective_correlation("prepayments", "defaults", 0.9), -0.4);
    /// assert_eq!(factory.effective_correlation("a", "b", 1.7), 1.0);
    /// ```
    pub fn effective_correlation(&self, purpose1: &str, purpose2: &str, requested: f64) -> f64 {
        let lookup = |a: &str, b: &str| {
            self.correlation_matrix
                .get(a)
                .and_then(|row| row.get(b))
                .copied()
        };
        let rho = lookup(purpose1, purpose2)
            .or_else(|| lookup(purpose2, purpose1))
            .unwrap_or(requested);
        rho.clamp(-1.0, 1.0)
    }

    /// Generator ids of a correlated pair, creating them on first use.
    pub fn correlated_generators(
        &mut self,
        purpose1: &str,
        purpose2: &str,
        requested_correlation: f64,
        instance_id: u64,
    ) -> (GeneratorId, GeneratorId) {
        let first = self.generator_id(purpose1, instance_id);

        let key = PairKey {
            purpose1: purpose1.to_string(),
            purpose2: purpose2.to_string(),
            instance_id,
        };
        if let Some(&index) = self.correlated.get(&key) {
            return (first, self.id(index));
        }

        let rho = self.effective_correlation(purpose1, purpose2, requested_correlation);
        let seed = seed::derive_pair_seed(
            self.base_seed(),
            purpose1,
            purpose2,
            instance_id,
            rho,
            self.is_deterministic(),
        );
        let index = self.push(Generator::from_seed(seed));
        debug!(
            purpose1,
            purpose2,
            instance_id,
            rho,
            seed,
            "Correlated generator created"
        );
        self.correlated.insert(key, index);
        (first, self.id(index))
    }

    /// One correlated normal pair.
    ///
    /// Missing deviations follow the variation-factor convention of their own
    /// purpose.
    ///
    /// # Errors
    ///
    /// Propagates stale-id errors from the arena; none occur for ids created
    /// within the call.
    #[allow(clippy::too_many_arguments)]
    pub fn correlated_normals(
        &mut self,
        purpose1: &str,
        purpose2: &str,
        correlation: f64,
        mean1: f64,
        mean2: f64,
        std1: Option<f64>,
        std2: Option<f64>,
        instance_id: u64,
    ) -> Result<(f64, f64)> {
        let (xs, ys) = self.correlated_normal_batch(
            purpose1,
            purpose2,
            correlation,
            (mean1, std1),
            (mean2, std2),
            1,
            instance_id,
        )?;
        Ok((xs[0], ys[0]))
    }

    /// `size` correlated normal pairs, drawn in order.
    ///
    /// `first` and `second` are `(mean, std_dev)` of each marginal.
    #[allow(clippy::too_many_arguments)]
    pub fn correlated_normal_batch(
        &mut self,
        purpose1: &str,
        purpose2: &str,
        correlation: f64,
        first: (f64, Option<f64>),
        second: (f64, Option<f64>),
        size: usize,
        instance_id: u64,
    ) -> Result<(Vec<f64>, Vec<f64>)> {
        let rho = self.effective_correlation(purpose1, purpose2, correlation);
        let (mean1, std1) = first;
        let (mean2, std2) = second;
        let std1 = std1.unwrap_or_else(|| self.default_std_dev(purpose1, mean1));
        let std2 = std2.unwrap_or_else(|| self.default_std_dev(purpose2, mean2));
        let residual = (1.0 - rho * rho).max(0.0).sqrt();

        let (id1, id2) = self.correlated_generators(purpose1, purpose2, correlation, instance_id);
        let (g1, g2) = self.pair_mut(id1, id2)?;

        let mut xs = Vec::with_capacity(size);
        let mut ys = Vec::with_capacity(size);
        for _ in 0..size {
            let z1 = g1.gen_normal();
            let z2 = g2.gen_normal();
            xs.push(mean1 + std1 * z1);
            ys.push(mean2 + std2 * (rho * z1 + residual * z2));
        }
        Ok((xs, ys))
    }
}

#[cfg(test)]
mod tests {
    use crate::factory::FactoryConfig;
    use crate::RandomFactory;
    use approx::assert_relative_eq;

    fn sample_correlation(xs: &[f64], ys: &[f64]) -> f64 {
        let n = xs.len() as f64;
        let mx = xs.iter().sum::<f64>() / n;
        let my = ys.iter().sum::<f64>() / n;
        let cov: f64 = xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum();
        let vx: f64 = xs.iter().map(|x| (x - mx).powi(2)).sum();
        let vy: f64 = ys.iter().map(|y| (y - my).powi(2)).sum();
        cov / (vx * vy).sqrt()
    }

    #[test]
    fn test_matrix_overrides_request_symmetrically() {
        let factory = RandomFactory::new(
            FactoryConfig::default()
                .with_seed(1)
                .with_correlation("a", "b", 0.3)
                .with_correlation("b", "a", 0.8),
        );
        assert_eq!(factory.effective_correlation("a", "b", -1.0), 0.3);
        assert_eq!(factory.effective_correlation("b", "a", -1.0), 0.8);
        assert_eq!(factory.effective_correlation("a", "c", -0.2), -0.2);
    }

    #[test]
    fn test_correlation_is_clamped() {
        let factory = RandomFactory::new(
            FactoryConfig::default()
                .with_seed(1)
                .with_correlation("a", "b", 3.0),
        );
        assert_eq!(factory.effective_correlation("a", "b", 0.0), 1.0);
        assert_eq!(factory.effective_correlation("x", "y", -5.0), -1.0);
    }

    #[test]
    fn test_pair_is_cached_by_direction() {
        let mut factory = RandomFactory::with_seed(42);
        let (a1, b1) = factory.correlated_generators("a", "b", 0.5, 0);
        let (a2, b2) = factory.correlated_generators("a", "b", 0.5, 0);
        assert_eq!((a1, b1), (a2, b2));
        assert_eq!(a1, factory.generator_id("a", 0));

        let (b_first, a_second) = factory.correlated_generators("b", "a", 0.5, 0);
        assert_eq!(b_first, factory.generator_id("b", 0));
        assert_ne!(a_second, b1);
        assert_eq!(factory.generator_count(), 4);
    }

    #[test]
    fn test_full_correlation_reuses_first_shock() {
        let mut factory = RandomFactory::with_seed(7);
        let (x, y) = factory
            .correlated_normals("a", "b", 1.0, 10.0, 50.0, Some(2.0), Some(5.0), 0)
            .unwrap();
        let z1 = (x - 10.0) / 2.0;
        assert_relative_eq!(y, 50.0 + 5.0 * z1, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_full_correlation_mirrors() {
        let mut factory = RandomFactory::with_seed(7);
        let unit = (0.0, Some(1.0));
        let (xs, ys) = factory
            .correlated_normal_batch("a", "b", -1.0, unit, unit, 100, 0)
            .unwrap();
        for (x, y) in xs.iter().zip(&ys) {
            assert_relative_eq!(*y, -*x, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_sample_correlation_matches_request() {
        let mut factory = RandomFactory::with_seed(2024);
        let unit = (0.0, Some(1.0));
        let (xs, ys) = factory
            .correlated_normal_batch("a", "b", 0.6, unit, unit, 20_000, 0)
            .unwrap();
        assert!((sample_correlation(&xs, &ys) - 0.6).abs() < 0.03);

        let (xs, ys) = factory
            .correlated_normal_batch("c", "d", 0.0, unit, unit, 20_000, 0)
            .unwrap();
        assert!(sample_correlation(&xs, &ys).abs() < 0.03);
    }

    #[test]
    fn test_pairs_are_reproducible() {
        let run = || {
            let mut factory = RandomFactory::with_seed(11);
            factory
                .correlated_normal_batch("a", "b", 0.4, (1.0, None), (2.0, None), 20, 3)
                .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_different_correlation_changes_second_stream() {
        let mut f1 = RandomFactory::with_seed(11);
        let mut f2 = RandomFactory::with_seed(11);
        let (_, s1) = f1.correlated_generators("a", "b", 0.4, 0);
        let (_, s2) = f2.correlated_generators("a", "b", 0.5, 0);
        assert_ne!(
            f1.get_mut(s1).unwrap().seed(),
            f2.get_mut(s2).unwrap().seed()
        );
    }
}

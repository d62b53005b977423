//! Typed sampling operations on top of the generator cache.
//!
//! # Variation-factor convention
//!
//! When a caller leaves the standard deviation out, it is derived from the
//! purpose's variation factor `vf`:
//!
//! ```text
//! std_dev = |mean| * vf    if mean != 0
//! std_dev = vf             otherwise
//! ```
//!
//! In deterministic mode `vf` is pinned to
//! [`DETERMINISTIC_VARIATION_FACTOR`](crate::DETERMINISTIC_VARIATION_FACTOR)
//! so outputs sit tightly around the mean.

use rand::distributions::WeightedIndex;

use crate::distribution::{check_bounds, DistributionKind};
use crate::error::{Result, RngError};
use crate::factory::RandomFactory;

/// Tolerance on the sum of choice probabilities.
pub const PROBABILITY_TOLERANCE: f64 = 1e-8;

impl RandomFactory {
    /// Standard deviation implied by the variation-factor convention.
    pub fn default_std_dev(&self, purpose: &str, mean: f64) -> f64 {
        let factor = self.variation_factor(purpose);
        if mean != 0.0 {
            mean.abs() * factor
        } else {
            factor
        }
    }

    /// One normal draw.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fund_rng::RandomFactory;
    ///
    /// let mut factory = RandomFactory::with_seed(42);
    /// let amount = factory.normal("loan_amount", 250_000.0, None, 0).unwrap();
    /// assert!(amount.is_finite());
    /// ```
    pub fn normal(
        &mut self,
        purpose: &str,
        mean: f64,
        std_dev: Option<f64>,
        instance_id: u64,
    ) -> Result<f64> {
        let std_dev = std_dev.unwrap_or_else(|| self.default_std_dev(purpose, mean));
        let kind = DistributionKind::Normal { mean, std_dev };
        self.draw_one(purpose, kind, instance_id)
    }

    /// One lognormal draw; `mean` and `sigma` describe the underlying normal.
    ///
    /// A missing `sigma` is the raw variation factor, not scaled by `mean`.
    pub fn lognormal(
        &mut self,
        purpose: &str,
        mean: f64,
        sigma: Option<f64>,
        instance_id: u64,
    ) -> Result<f64> {
        let sigma = sigma.unwrap_or_else(|| self.variation_factor(purpose));
        let kind = DistributionKind::LogNormal { mean, sigma };
        self.draw_one(purpose, kind, instance_id)
    }

    /// One uniform draw on `[low, high)`; `low == high` yields `low`.
    pub fn uniform(&mut self, purpose: &str, low: f64, high: f64, instance_id: u64) -> Result<f64> {
        check_bounds(low, high)?;
        let u = self.generator(purpose, instance_id).gen_uniform();
        Ok(low + (high - low) * u)
    }

    /// One beta draw.
    pub fn beta(&mut self, purpose: &str, alpha: f64, beta: f64, instance_id: u64) -> Result<f64> {
        let kind = DistributionKind::Beta { alpha, beta };
        self.draw_one(purpose, kind, instance_id)
    }

    /// Picks one element, uniformly or by `probabilities`.
    ///
    /// # Errors
    ///
    /// - [`RngError::EmptyChoices`] for an empty slice
    /// - [`RngError::InvalidProbabilities`] when the weights do not match the
    ///   choices, are negative or non-finite, or do not sum to 1
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fund_rng::RandomFactory;
    ///
    /// let mut factory = RandomFactory::with_seed(1);
    /// let zones = ["green", "yellow", "red"];
    /// let zone = factory.choice("zone", &zones, Some(&[0.5, 0.3, 0.2]), 0).unwrap();
    /// assert!(zones.contains(zone));
    ///
    /// assert!(factory.choice("zone", &zones, Some(&[0.5, 0.5, 0.5]), 0).is_err());
    /// ```
    pub fn choice<'a, T>(
        &mut self,
        purpose: &str,
        choices: &'a [T],
        probabilities: Option<&[f64]>,
        instance_id: u64,
    ) -> Result<&'a T> {
        if choices.is_empty() {
            return Err(RngError::EmptyChoices);
        }
        let index = match probabilities {
            None => {
                let generator = self.generator(purpose, instance_id);
                generator.gen_index(choices.len())
            }
            Some(weights) => {
                let dist = weighted_index(weights, choices.len())?;
                self.generator(purpose, instance_id).sample(&dist)
            }
        };
        Ok(&choices[index])
    }

    /// `size` normal draws.
    pub fn batch_normal(
        &mut self,
        purpose: &str,
        size: usize,
        mean: f64,
        std_dev: Option<f64>,
        instance_id: u64,
    ) -> Result<Vec<f64>> {
        let std_dev = std_dev.unwrap_or_else(|| self.default_std_dev(purpose, mean));
        let kind = DistributionKind::Normal { mean, std_dev };
        self.distribution_samples(purpose, &kind, size, instance_id)
    }

    /// `size` draws from a named distribution.
    pub fn distribution_samples(
        &mut self,
        purpose: &str,
        kind: &DistributionKind,
        size: usize,
        instance_id: u64,
    ) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity(size);
        let generator = self.generator(purpose, instance_id);
        kind.sample_into(generator, size, &mut out)?;
        Ok(out)
    }

    fn draw_one(&mut self, purpose: &str, kind: DistributionKind, instance_id: u64) -> Result<f64> {
        let mut out = Vec::with_capacity(1);
        let generator = self.generator(purpose, instance_id);
        kind.sample_into(generator, 1, &mut out)?;
        Ok(out[0])
    }
}

fn weighted_index(weights: &[f64], len: usize) -> Result<WeightedIndex<f64>> {
    if weights.len() != len {
        return Err(RngError::InvalidProbabilities(format!(
            "{} probabilities for {} choices",
            weights.len(),
            len
        )));
    }
    let invalid = |w: &&f64| !w.is_finite() || **w < 0.0;
    if let Some(bad) = weights.iter().find(invalid) {
        return Err(RngError::InvalidProbabilities(format!(
            "probability {} is not a finite non-negative number",
            bad
        )));
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(RngError::InvalidProbabilities(format!(
            "probabilities sum to {}, expected 1",
            total
        )));
    }
    WeightedIndex::new(weights).map_err(|e| RngError::InvalidProbabilities(e.to_string()))
}

//! Descriptive statistics of a sample.

use serde::{Deserialize, Serialize};

/// Summary of a sample.
///
/// `std_dev` is the population deviation; `skewness` and `kurtosis` are the
/// biased moment estimators, with `kurtosis` reported as excess kurtosis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionStats {
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
    /// 25th percentile.
    pub q1: f64,
    /// 75th percentile.
    pub q3: f64,
    /// Third standardised moment.
    pub skewness: f64,
    /// Fourth standardised moment minus 3.
    pub kurtosis: f64,
}

/// Computes [`DistributionStats`]; `None` for an empty sample.
///
/// Zero-variance samples report zero skewness and kurtosis.
///
/// # Examples
///
/// ```rust
/// use fund_rng::distribution_stats;
///
/// let stats = distribution_stats(&[1.0, 2.0, 3.0, 4.0]).unwrap();
/// assert_eq!(stats.mean, 2.5);
/// assert_eq!(stats.median, 2.5);
/// assert_eq!(stats.q1, 1.75);
/// assert!(distribution_stats(&[]).is_none());
/// ```
pub fn distribution_stats(samples: &[f64]) -> Option<DistributionStats> {
    if samples.is_empty() {
        return None;
    }
    let n = samples.len() as f64;
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = samples.iter().sum::<f64>() / n;
    let central = |power: i32| samples.iter().map(|x| (x - mean).powi(power)).sum::<f64>() / n;
    let m2 = central(2);
    let (skewness, kurtosis) = if m2 > 0.0 {
        (central(3) / m2.powf(1.5), central(4) / (m2 * m2) - 3.0)
    } else {
        (0.0, 0.0)
    };

    Some(DistributionStats {
        mean,
        median: percentile(&sorted, 0.5),
        std_dev: m2.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        q1: percentile(&sorted, 0.25),
        q3: percentile(&sorted, 0.75),
        skewness,
        kurtosis,
    })
}

/// Linear-interpolated percentile of sorted data, `q` in `[0, 1]`.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

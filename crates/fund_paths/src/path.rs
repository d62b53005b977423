//! Monthly compounding price-index paths.
//!
//! A path starts at the normalised index `1.0` and compounds one return per
//! month:
//!
//! ```text
//! m       = (1 + r)^(1/12) - 1        monthly drift from annual rate r
//! v_m     = v / sqrt(12)              monthly volatility from annual v
//! I[0]    = 1
//! I[k+1]  = I[k] * (1 + m + v_m * Z_k)
//! ```
//!
//! with `Z_k` independent standard normals from the zone's generator.
//!
//! # Memory Layout
//!
//! Paths are plain `Vec<f64>` of length `12 * years + 1` where index `k` is
//! the index value after `k` months.

use fund_rng::Generator;
use tracing::warn;

use crate::error::{PathError, Result};

/// Months per simulated year.
pub const MONTHS_PER_YEAR: usize = 12;

/// Monthly drift equivalent to the annual rate `annual_rate`.
///
/// # Examples
///
/// ```rust
/// use fund_paths::path::monthly_rate;
///
/// let m = monthly_rate(0.05);
/// assert!(((1.0 + m).powi(12) - 1.05).abs() < 1e-12);
/// ```
#[inline]
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

/// Monthly volatility equivalent to the annual volatility.
#[inline]
pub fn monthly_volatility(annual_volatility: f64) -> f64 {
    annual_volatility / (MONTHS_PER_YEAR as f64).sqrt()
}

/// Simulates a price-index path of `12 * years + 1` values.
///
/// Exactly `12 * years` normal draws are taken from `generator`, also when
/// `volatility` is zero.
///
/// # Errors
///
/// [`PathError::InvalidParameter`] if `base_rate` is not finite or not
/// above -1, or `volatility` is negative or not finite.
///
/// # Examples
///
/// ```rust
/// use fund_paths::path::price_path;
/// use fund_rng::Generator;
///
/// let mut generator = Generator::from_seed(42);
/// let path = price_path(&mut generator, 0.05, 10, 0.12).unwrap();
/// assert_eq!(path.len(), 121);
/// assert_eq!(path[0], 1.0);
/// ```
pub fn price_path(
    generator: &mut Generator,
    base_rate: f64,
    years: u32,
    volatility: f64,
) -> Result<Vec<f64>> {
    validate(base_rate, volatility)?;
    let months = years as usize * MONTHS_PER_YEAR;
    let vol_m = monthly_volatility(volatility);

    let mut shocks = vec![0.0; months];
    generator.fill_normal(&mut shocks);
    for shock in shocks.iter_mut() {
        *shock *= vol_m;
    }
    Ok(compound(monthly_rate(base_rate), &shocks))
}

/// Builds an index path from a monthly drift and per-month shocks.
///
/// The result has `shocks.len() + 1` values and starts at exactly `1.0`.
pub fn compound(monthly_drift: f64, shocks: &[f64]) -> Vec<f64> {
    let mut path = Vec::with_capacity(shocks.len() + 1);
    let mut index = 1.0;
    path.push(index);
    for &shock in shocks {
        index *= 1.0 + monthly_drift + shock;
        path.push(index);
    }
    path
}

pub(crate) fn validate(base_rate: f64, volatility: f64) -> Result<()> {
    if !base_rate.is_finite() || base_rate <= -1.0 {
        return Err(PathError::InvalidParameter {
            name: "base_rate",
            value: format!("must be finite and above -1, got {}", base_rate),
        });
    }
    if !volatility.is_finite() || volatility < 0.0 {
        return Err(PathError::InvalidParameter {
            name: "volatility",
            value: format!("must be finite and non-negative, got {}", volatility),
        });
    }
    Ok(())
}

/// One value per completed year, starting with the month-0 value.
pub fn annual_indices(path: &[f64]) -> Vec<f64> {
    path.iter().step_by(MONTHS_PER_YEAR).copied().collect()
}

/// Compound annual rate taking `start_index` to `end_index` over `years`.
///
/// Returns `0.0` when `start_index <= 0` or `years <= 0`.
///
/// # Examples
///
/// ```rust
/// use fund_paths::path::annualized_rate;
///
/// let rate = annualized_rate(100.0, 200.0, 10.0);
/// assert!((100.0 * (1.0 + rate).powf(10.0) - 200.0).abs() < 1e-9);
/// assert_eq!(annualized_rate(0.0, 200.0, 10.0), 0.0);
/// ```
pub fn annualized_rate(start_index: f64, end_index: f64, years: f64) -> f64 {
    if start_index <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    (end_index / start_index).powf(1.0 / years) - 1.0
}

/// Index value after `month` months.
///
/// Months past the end hold the terminal value flat; an empty path yields the
/// neutral index `1.0`. Both cases log a warning.
pub fn index_at(path: &[f64], month: usize) -> f64 {
    match path.get(month) {
        Some(&value) => value,
        None => match path.last() {
            Some(&terminal) => {
                warn!(
                    month,
                    path_len = path.len(),
                    "Month beyond price path, holding terminal index"
                );
                terminal
            }
            None => {
                warn!(month, "Empty price path, using neutral index");
                1.0
            }
        },
    }
}

/// Value of an asset worth `initial_value` at month 0 after `month` months.
#[inline]
pub fn property_value(initial_value: f64, path: &[f64], month: usize) -> f64 {
    initial_value * index_at(path, month)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_volatility_closed_form() {
        let mut generator = Generator::from_seed(1);
        let path = price_path(&mut generator, 0.05, 10, 0.0).unwrap();
        assert_eq!(path.len(), 121);
        assert_eq!(path[0], 1.0);

        let m = monthly_rate(0.05);
        let mut expected = 1.0;
        for (k, &value) in path.iter().enumerate().skip(1) {
            expected *= 1.0 + m;
            assert_eq!(value, expected, "month {}", k);
            assert_relative_eq!(value, (1.0 + m).powi(k as i32), max_relative = 1e-12);
        }
        assert_relative_eq!(path[120], 1.05_f64.powi(10), max_relative = 1e-10);
    }

    #[test]
    fn test_draws_consumed_per_month() {
        let mut generator = Generator::from_seed(1);
        price_path(&mut generator, 0.03, 7, 0.0).unwrap();
        assert_eq!(generator.draws(), 84);
    }

    #[test]
    fn test_zero_years() {
        let mut generator = Generator::from_seed(1);
        assert_eq!(price_path(&mut generator, 0.05, 0, 0.2).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_shocks_follow_generator() {
        let mut generator = Generator::from_seed(99);
        let path = price_path(&mut generator, 0.04, 1, 0.2).unwrap();

        let mut reference = Generator::from_seed(99);
        let m = monthly_rate(0.04);
        let v_m = monthly_volatility(0.2);
        let mut expected = 1.0;
        for &value in &path[1..] {
            expected *= 1.0 + m + v_m * reference.gen_normal();
            assert_relative_eq!(value, expected, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_invalid_parameters() {
        let mut generator = Generator::from_seed(1);
        assert!(price_path(&mut generator, 0.05, 1, -0.1).is_err());
        assert!(price_path(&mut generator, f64::NAN, 1, 0.1).is_err());
        assert!(price_path(&mut generator, -1.0, 1, 0.1).is_err());
        assert_eq!(generator.draws(), 0);
    }

    #[test]
    fn test_annual_indices() {
        let path: Vec<f64> = (0..=36).map(|k| k as f64).collect();
        assert_eq!(annual_indices(&path), vec![0.0, 12.0, 24.0, 36.0]);
        assert_eq!(annual_indices(&[1.0]), vec![1.0]);
    }

    #[test]
    fn test_annualized_rate_inverse() {
        let rate = annualized_rate(100.0, 200.0, 10.0);
        assert_relative_eq!(100.0 * (1.0 + rate).powf(10.0), 200.0, max_relative = 1e-12);
        assert_eq!(annualized_rate(-5.0, 200.0, 10.0), 0.0);
        assert_eq!(annualized_rate(100.0, 200.0, 0.0), 0.0);
    }

    #[test]
    fn test_index_at_out_of_range() {
        let path = vec![1.0, 1.1, 1.2];
        assert_eq!(index_at(&path, 1), 1.1);
        assert_eq!(index_at(&path, path.len() + 5), 1.2);
        assert_eq!(index_at(&[], 3), 1.0);
    }

    #[test]
    fn test_property_value() {
        let path = vec![1.0, 1.5];
        assert_eq!(property_value(200_000.0, &path, 1), 300_000.0);
        assert_eq!(property_value(200_000.0, &path, 12), 300_000.0);
    }
}

//! Per-zone price path driver.
//!
//! Each zone draws from its own stream, purpose `"price_path_<zone>"`, so
//! zones are independent unless explicitly correlated.

use std::collections::BTreeMap;

use fund_rng::RandomFactory;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::path::{
    self, annualized_rate, compound, monthly_rate, monthly_volatility, MONTHS_PER_YEAR,
};

/// Appreciation assumptions of one zone.
///
/// # Examples
///
/// ```rust
/// use fund_paths::ZoneParams;
///
/// let green = ZoneParams::new(0.05, 0.12);
/// assert_eq!(green.appreciation_rate, 0.05);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoneParams {
    /// Annual appreciation rate.
    pub appreciation_rate: f64,
    /// Annual volatility of appreciation.
    #[serde(default)]
    pub volatility: f64,
}

impl ZoneParams {
    /// Creates zone parameters.
    #[inline]
    pub fn new(appreciation_rate: f64, volatility: f64) -> Self {
        Self {
            appreciation_rate,
            volatility,
        }
    }
}

/// Stream purpose of a zone's price path.
#[inline]
pub fn zone_purpose(zone: &str) -> String {
    format!("price_path_{}", zone)
}

/// Simulated price paths keyed by zone name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricePaths {
    paths: BTreeMap<String, Vec<f64>>,
}

impl PricePaths {
    /// Path of `zone`, if simulated.
    pub fn get(&self, zone: &str) -> Option<&[f64]> {
        self.paths.get(zone).map(Vec::as_slice)
    }

    /// Zone names in order.
    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no zone was simulated.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Adds or replaces a zone's path.
    pub fn insert(&mut self, zone: impl Into<String>, path: Vec<f64>) {
        self.paths.insert(zone.into(), path);
    }

    /// Index of `zone` after `month` months.
    ///
    /// An unknown zone yields the neutral index `1.0` and logs a warning.
    pub fn index_at(&self, zone: &str, month: usize) -> f64 {
        match self.paths.get(zone) {
            Some(p) => path::index_at(p, month),
            None => {
                warn!(zone, "Unknown zone, using neutral price index");
                1.0
            }
        }
    }

    /// Value after `month` months of an asset in `zone` initially worth `initial_value`.
    pub fn property_value(&self, zone: &str, initial_value: f64, month: usize) -> f64 {
        initial_value * self.index_at(zone, month)
    }

    /// Realised compound annual rate of every zone over its full path.
    pub fn annualized_rates(&self) -> BTreeMap<String, f64> {
        self.paths
            .iter()
            .map(|(zone, p)| {
                let years = (p.len().saturating_sub(1)) as f64 / MONTHS_PER_YEAR as f64;
                let start = p.first().copied().unwrap_or(1.0);
                let end = p.last().copied().unwrap_or(start);
                (zone.clone(), annualized_rate(start, end, years))
            })
            .collect()
    }

    /// Underlying map.
    pub fn into_inner(self) -> BTreeMap<String, Vec<f64>> {
        self.paths
    }
}

/// Simulates every zone over `years` years.
///
/// Zones are processed in name order; the generator of each zone is the
/// factory's `(zone_purpose(zone), instance_id)` stream.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use fund_paths::{simulate_zones, ZoneParams};
/// use fund_rng::RandomFactory;
///
/// let zones = BTreeMap::from([
///     ("green".to_string(), ZoneParams::new(0.05, 0.10)),
///     ("red".to_string(), ZoneParams::new(0.01, 0.25)),
/// ]);
/// let mut factory = RandomFactory::with_seed(42);
/// let paths = simulate_zones(&mut factory, 10, &zones, 0).unwrap();
///
/// assert_eq!(paths.get("green").unwrap().len(), 121);
/// assert_eq!(paths.index_at("unknown", 12), 1.0);
/// ```
pub fn simulate_zones(
    factory: &mut RandomFactory,
    years: u32,
    zones: &BTreeMap<String, ZoneParams>,
    instance_id: u64,
) -> Result<PricePaths> {
    let mut paths = PricePaths::default();
    for (zone, params) in zones {
        let generator = factory.generator(&zone_purpose(zone), instance_id);
        let rate = params.appreciation_rate;
        let p = path::price_path(generator, rate, years, params.volatility)?;
        debug!(
            zone = %zone,
            instance_id,
            terminal = ?p.last(),
            "Zone price path simulated"
        );
        paths.insert(zone.clone(), p);
    }
    Ok(paths)
}

/// Simulates two zones whose monthly shocks have correlation `correlation`.
///
/// The factory's correlation matrix overrides `correlation` when it names the
/// two zone purposes.
///
/// # Errors
///
/// Invalid rates or volatilities, as for [`path::price_path`].
pub fn simulate_correlated_zones(
    factory: &mut RandomFactory,
    years: u32,
    zone_a: (&str, ZoneParams),
    zone_b: (&str, ZoneParams),
    correlation: f64,
    instance_id: u64,
) -> Result<PricePaths> {
    let (name_a, params_a) = zone_a;
    let (name_b, params_b) = zone_b;
    path::validate(params_a.appreciation_rate, params_a.volatility)?;
    path::validate(params_b.appreciation_rate, params_b.volatility)?;

    let months = years as usize * MONTHS_PER_YEAR;
    let (shocks_a, shocks_b) = factory.correlated_normal_batch(
        &zone_purpose(name_a),
        &zone_purpose(name_b),
        correlation,
        (0.0, Some(monthly_volatility(params_a.volatility))),
        (0.0, Some(monthly_volatility(params_b.volatility))),
        months,
        instance_id,
    )?;

    let drift_a = monthly_rate(params_a.appreciation_rate);
    let drift_b = monthly_rate(params_b.appreciation_rate);
    let mut paths = PricePaths::default();
    paths.insert(name_a, compound(drift_a, &shocks_a));
    paths.insert(name_b, compound(drift_b, &shocks_b));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fund_rng::FactoryConfig;

    fn zones() -> BTreeMap<String, ZoneParams> {
        BTreeMap::from([
            ("green".to_string(), ZoneParams::new(0.05, 0.10)),
            ("orange".to_string(), ZoneParams::new(0.03, 0.15)),
            ("red".to_string(), ZoneParams::new(0.01, 0.25)),
        ])
    }

    #[test]
    fn test_zone_purpose() {
        assert_eq!(zone_purpose("green"), "price_path_green");
    }

    #[test]
    fn test_zones_use_their_own_stream() {
        let mut factory = RandomFactory::with_seed(42);
        let paths = simulate_zones(&mut factory, 5, &zones(), 0).unwrap();
        assert_eq!(paths.len(), 3);

        let mut reference = RandomFactory::with_seed(42);
        let generator = reference.generator("price_path_orange", 0);
        let orange = path::price_path(generator, 0.03, 5, 0.15).unwrap();
        assert_eq!(paths.get("orange").unwrap(), orange.as_slice());
    }

    #[test]
    fn test_instances_differ() {
        let mut factory = RandomFactory::with_seed(42);
        let a = simulate_zones(&mut factory, 3, &zones(), 0).unwrap();
        let b = simulate_zones(&mut factory, 3, &zones(), 1).unwrap();
        assert_ne!(a.get("green"), b.get("green"));
    }

    #[test]
    fn test_repeat_simulation_continues_streams() {
        let mut factory = RandomFactory::with_seed(42);
        let first = simulate_zones(&mut factory, 3, &zones(), 0).unwrap();
        let second = simulate_zones(&mut factory, 3, &zones(), 0).unwrap();
        assert_ne!(first, second);

        factory.reset();
        assert_eq!(simulate_zones(&mut factory, 3, &zones(), 0).unwrap(), first);
    }

    #[test]
    fn test_unknown_zone_is_neutral() {
        let mut factory = RandomFactory::with_seed(42);
        let paths = simulate_zones(&mut factory, 1, &zones(), 0).unwrap();
        assert_eq!(paths.index_at("blue", 6), 1.0);
        assert_eq!(paths.property_value("blue", 500.0, 6), 500.0);
    }

    #[test]
    fn test_annualized_rates_zero_volatility() {
        let flat = BTreeMap::from([("green".to_string(), ZoneParams::new(0.04, 0.0))]);
        let mut factory = RandomFactory::with_seed(1);
        let rates = simulate_zones(&mut factory, 10, &flat, 0)
            .unwrap()
            .annualized_rates();
        assert!((rates["green"] - 0.04).abs() < 1e-10);
    }

    #[test]
    fn test_correlated_zones_full_correlation() {
        let mut factory = RandomFactory::with_seed(8);
        let paths = simulate_correlated_zones(
            &mut factory,
            2,
            ("green", ZoneParams::new(0.05, 0.2)),
            ("red", ZoneParams::new(0.05, 0.2)),
            1.0,
            0,
        )
        .unwrap();
        let green = paths.get("green").unwrap();
        let red = paths.get("red").unwrap();
        for (g, r) in green.iter().zip(red) {
            assert!((g - r).abs() < 1e-12);
        }
    }

    #[test]
    fn test_correlated_zones_matrix_override() {
        let config = FactoryConfig::default()
            .with_seed(8)
            .with_correlation("price_path_red", "price_path_green", -1.0);
        let mut factory = RandomFactory::new(config);
        let paths = simulate_correlated_zones(
            &mut factory,
            1,
            ("green", ZoneParams::new(0.0, 0.2)),
            ("red", ZoneParams::new(0.0, 0.2)),
            1.0,
            0,
        )
        .unwrap();
        let green = paths.get("green").unwrap();
        let red = paths.get("red").unwrap();
        // Opposite first-month shocks around a flat drift
        assert!(((green[1] - 1.0) + (red[1] - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_serialises_as_zone_map() {
        let mut paths = PricePaths::default();
        paths.insert("green", vec![1.0, 1.01]);
        let json = serde_json::to_string(&paths).unwrap();
        assert_eq!(json, r#"{"green":[1.0,1.01]}"#);
    }
}

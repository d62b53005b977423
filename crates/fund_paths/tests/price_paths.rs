//! Integration tests for zone price paths.

use std::collections::BTreeMap;

use approx::assert_relative_eq;
use fund_paths::path::monthly_rate;
use fund_paths::{
    annualized_rate, index_at, run_trials, simulate_zones, zone_purpose, PathError, ZoneParams,
};
use fund_rng::{FactoryConfig, RandomFactory};
use proptest::prelude::*;

fn portfolio_zones() -> BTreeMap<String, ZoneParams> {
    BTreeMap::from([
        ("green".to_string(), ZoneParams::new(0.05, 0.08)),
        ("orange".to_string(), ZoneParams::new(0.03, 0.12)),
        ("red".to_string(), ZoneParams::new(0.01, 0.20)),
    ])
}

#[test]
fn test_ten_year_flat_path() {
    let zones = BTreeMap::from([("green".to_string(), ZoneParams::new(0.05, 0.0))]);
    let mut factory = RandomFactory::with_seed(42);
    let paths = simulate_zones(&mut factory, 10, &zones, 0).unwrap();
    let green = paths.get("green").unwrap();

    assert_eq!(green.len(), 121);
    assert_eq!(green[0], 1.0);
    let m = monthly_rate(0.05);
    assert_relative_eq!(green[60], (1.0 + m).powi(60), max_relative = 1e-12);
    assert_relative_eq!(green[120], 1.05_f64.powi(10), max_relative = 1e-10);

    // The stream still advanced once per month.
    assert_eq!(factory.generator(&zone_purpose("green"), 0).draws(), 120);
}

#[test]
fn test_lookups_past_the_horizon() {
    let mut factory = RandomFactory::with_seed(42);
    let paths = simulate_zones(&mut factory, 2, &portfolio_zones(), 0).unwrap();
    let red = paths.get("red").unwrap();

    assert_eq!(paths.index_at("red", 24), red[24]);
    assert_eq!(paths.index_at("red", 500), red[24]);
    assert_eq!(index_at(red, 25), red[24]);
    assert_eq!(paths.index_at("purple", 3), 1.0);
    assert_relative_eq!(
        paths.property_value("red", 350_000.0, 12),
        350_000.0 * red[12],
        max_relative = 1e-15
    );
}

#[test]
fn test_independent_factories_agree() {
    let config = FactoryConfig::default().with_seed("fund-iv");
    let mut a = RandomFactory::new(config.clone());
    let mut b = RandomFactory::new(config);
    assert_eq!(
        simulate_zones(&mut a, 10, &portfolio_zones(), 3).unwrap(),
        simulate_zones(&mut b, 10, &portfolio_zones(), 3).unwrap()
    );
}

#[test]
fn test_realised_rates_near_assumptions() {
    let state = RandomFactory::with_seed(11).state();
    let zones = BTreeMap::from([("green".to_string(), ZoneParams::new(0.05, 0.05))]);
    let trials = run_trials(&state, 10, &zones, 0..400).unwrap();

    let mean_rate = trials
        .iter()
        .map(|t| t.paths.annualized_rates()["green"])
        .sum::<f64>()
        / trials.len() as f64;
    assert!(
        (mean_rate - 0.05).abs() < 0.01,
        "mean realised rate {}",
        mean_rate
    );
}

#[test]
fn test_invalid_zone_reported() {
    let zones = BTreeMap::from([("green".to_string(), ZoneParams::new(-1.5, 0.1))]);
    let mut factory = RandomFactory::with_seed(1);
    assert!(matches!(
        simulate_zones(&mut factory, 1, &zones, 0),
        Err(PathError::InvalidParameter {
            name: "base_rate",
            ..
        })
    ));
}

proptest! {
    #[test]
    fn prop_annualized_rate_inverts(
        start in 0.1f64..1_000.0,
        rate in -0.5f64..0.5,
        years in 1u32..40,
    ) {
        let end = start * (1.0 + rate).powi(years as i32);
        let recovered = annualized_rate(start, end, years as f64);
        prop_assert!((recovered - rate).abs() < 1e-9);
    }

    #[test]
    fn prop_path_length(years in 0u32..30, seed in any::<u32>()) {
        let zones = BTreeMap::from([("z".to_string(), ZoneParams::new(0.02, 0.1))]);
        let mut factory = RandomFactory::with_seed(seed as u64);
        let paths = simulate_zones(&mut factory, years, &zones, 0).unwrap();
        prop_assert_eq!(paths.get("z").unwrap().len(), years as usize * 12 + 1);
    }
}

//! # Fund Paths (Model Layer: Price Paths)
//!
//! Monthly price-index simulation for fund-performance modelling.
//!
//! Each zone's appreciation follows a monthly compounding index driven by an
//! annual drift and volatility. Randomness comes from a
//! [`fund_rng::RandomFactory`], one stream per zone, so results are
//! reproducible from a single base seed.
//!
//! ## Module Structure
//!
//! - [`path`]: single-path simulation and lookups
//! - [`zones`]: the per-zone driver and [`PricePaths`]
//! - [`trials`]: parallel Monte Carlo trials
//!
//! ## Usage Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use fund_paths::{simulate_zones, ZoneParams};
//! use fund_rng::RandomFactory;
//!
//! let zones = BTreeMap::from([("green".to_string(), ZoneParams::new(0.05, 0.0))]);
//! let mut factory = RandomFactory::with_seed(1);
//! let paths = simulate_zones(&mut factory, 10, &zones, 0).unwrap();
//!
//! let green = paths.get("green").unwrap();
//! assert_eq!(green.len(), 121);
//! assert_eq!(green[0], 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod path;
pub mod trials;
pub mod zones;

// Re-exports for convenient access
pub use error::{PathError, Result};
pub use path::{annual_indices, annualized_rate, index_at, price_path, property_value};
pub use trials::{run_trial, run_trials, TrialPaths};
pub use zones::{simulate_correlated_zones, simulate_zones, zone_purpose, PricePaths, ZoneParams};

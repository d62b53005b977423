//! Parallel Monte Carlo trials over zone price paths.
//!
//! Every trial runs on its own [`RandomFactory`] rebuilt from one persisted
//! [`FactoryState`], with the trial number as instance id. No factory is
//! shared between rayon workers, and the results do not depend on how trials
//! are scheduled.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use fund_paths::{run_trials, ZoneParams};
//! use fund_rng::RandomFactory;
//!
//! let state = RandomFactory::with_seed(42).state();
//! let zones = BTreeMap::from([("green".to_string(), ZoneParams::new(0.05, 0.1))]);
//!
//! let trials = run_trials(&state, 5, &zones, 0..16).unwrap();
//! assert_eq!(trials.len(), 16);
//! assert_eq!(trials[3].trial, 3);
//! ```

use std::collections::BTreeMap;
use std::ops::Range;

use fund_rng::{FactoryState, RandomFactory};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::zones::{simulate_zones, PricePaths, ZoneParams};

/// Paths of one trial.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialPaths {
    /// Trial number, used as the instance id of every zone stream.
    pub trial: u64,
    /// Simulated paths per zone.
    pub paths: PricePaths,
}

/// Runs `trials` in parallel, returning results in trial order.
pub fn run_trials(
    state: &FactoryState,
    years: u32,
    zones: &BTreeMap<String, ZoneParams>,
    trials: Range<u64>,
) -> Result<Vec<TrialPaths>> {
    debug!(
        base_seed = state.base_seed,
        trials = trials.end.saturating_sub(trials.start),
        zones = zones.len(),
        "Running price path trials"
    );
    trials
        .into_par_iter()
        .map(|trial| run_trial(state, years, zones, trial))
        .collect()
}

/// Runs a single trial on a fresh factory.
pub fn run_trial(
    state: &FactoryState,
    years: u32,
    zones: &BTreeMap<String, ZoneParams>,
    trial: u64,
) -> Result<TrialPaths> {
    let mut factory = RandomFactory::from_state(state);
    let paths = simulate_zones(&mut factory, years, zones, trial)?;
    Ok(TrialPaths { trial, paths })
}

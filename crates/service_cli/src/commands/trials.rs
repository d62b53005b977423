//! Trials command implementation
//!
//! Runs independent Monte Carlo trials in parallel and reports the realised
//! annual rate of every zone per trial.

use std::collections::BTreeMap;

use fund_paths::run_trials;
use fund_rng::FactoryState;
use serde::Serialize;
use tracing::info;

use super::OutputFormat;
use crate::config::SimulationConfig;
use crate::{CliError, Result};

/// Realised annual rate per zone of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialSummary {
    pub trial: u64,
    pub rates: BTreeMap<String, f64>,
}

/// Run `count` trials starting at trial number `first`
pub fn summarise(
    config: &SimulationConfig,
    state: &FactoryState,
    first: u64,
    count: u64,
) -> Result<Vec<TrialSummary>> {
    let end = first.checked_add(count).ok_or_else(|| {
        CliError::InvalidArgument(format!("Trial range {}+{} overflows", first, count))
    })?;
    let trials = run_trials(state, config.years, &config.zones, first..end)?;
    Ok(trials
        .into_iter()
        .map(|t| TrialSummary {
            trial: t.trial,
            rates: t.paths.annualized_rates(),
        })
        .collect())
}

/// Run the trials command
pub fn run(
    config: &SimulationConfig,
    state: &FactoryState,
    first: u64,
    count: u64,
    format: &str,
) -> Result<String> {
    let format = OutputFormat::parse(format)?;
    if count == 0 {
        return Err(CliError::InvalidArgument("--count must be positive".into()));
    }
    info!("Running {} trials over {} years...", count, config.years);

    let summaries = summarise(config, state, first, count)?;
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&summaries)?,
        OutputFormat::Table => render_table(config, &summaries),
    };

    info!("Trials complete");
    Ok(output)
}

fn render_table(config: &SimulationConfig, summaries: &[TrialSummary]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>8}", "Trial"));
    for zone in config.zones.keys() {
        out.push_str(&format!(" {:>12}", zone));
    }
    out.push('\n');

    for summary in summaries {
        out.push_str(&format!("{:>8}", summary.trial));
        for zone in config.zones.keys() {
            let rate = summary.rates.get(zone).copied().unwrap_or(0.0);
            out.push_str(&format!(" {:>11.4}%", rate * 100.0));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fund_paths::ZoneParams;
    use fund_rng::{RandomFactory, SeedSource};

    fn config() -> SimulationConfig {
        SimulationConfig {
            years: 5,
            seed: Some(SeedSource::Fixed(7)),
            zones: BTreeMap::from([
                ("flat".to_string(), ZoneParams::new(0.03, 0.0)),
                ("noisy".to_string(), ZoneParams::new(0.03, 0.2)),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_summaries_in_trial_order() {
        let config = config();
        let state = RandomFactory::new(config.factory_config()).state();
        let summaries = summarise(&config, &state, 10, 8).unwrap();

        let numbers: Vec<u64> = summaries.iter().map(|s| s.trial).collect();
        assert_eq!(numbers, (10..18).collect::<Vec<_>>());
        for summary in &summaries {
            assert_relative_eq!(summary.rates["flat"], 0.03, max_relative = 1e-9);
        }
        assert_ne!(summaries[0].rates["noisy"], summaries[1].rates["noisy"]);
    }

    #[test]
    fn test_rows_per_trial() {
        let config = config();
        let state = RandomFactory::new(config.factory_config()).state();
        let table = run(&config, &state, 0, 4, "table").unwrap();
        assert_eq!(table.lines().count(), 5);

        let json = run(&config, &state, 0, 4, "json").unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_rejects_empty_and_overflowing_ranges() {
        let config = config();
        let state = RandomFactory::new(config.factory_config()).state();
        assert!(matches!(
            run(&config, &state, 0, 0, "table"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(summarise(&config, &state, u64::MAX, 2).is_err());
    }
}

//! Simulate command implementation
//!
//! Simulates the price path of every configured zone.


use fund_paths::path::MONTHS_PER_YEAR;
use fund_paths::{annual_indices, simulate_zones, PricePaths};
use fund_rng::{FactoryState, RandomFactory};
use tracing::info;

use super::OutputFormat;
use crate::config::SimulationConfig;
use crate::Result;

/// Simulate all zones for one instance
pub fn simulate(
    config: &SimulationConfig,
    state: &FactoryState,
    instance_id: u64,
) -> Result<PricePaths> {
    let mut factory = RandomFactory::from_state(state);
    let paths = simulate_zones(&mut factory, config.years, &config.zones, instance_id)?;
    Ok(paths)
}

/// Run the simulate command
pub fn run(
    config: &SimulationConfig,
    state: &FactoryState,
    instance_id: u64,
    format: &str,
) -> Result<String> {
    let format = OutputFormat::parse(format)?;
    info!("Starting simulation...");
    info!("  Zones: {}", config.zones.len());
    info!("  Years: {}", config.years);
    info!("  Instance: {}", instance_id);

    let paths = simulate(config, state, instance_id)?;
    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&paths)?,
        OutputFormat::Table => render_table(&paths),
    };

    info!("Simulation complete");
    Ok(output)
}

/// Year-end index per zone, followed by the realised annual rate
pub fn render_table(paths: &PricePaths) -> String {
    let zones: Vec<&str> = paths.zones().collect();
    let years = zones
        .iter()
        .filter_map(|zone| paths.get(zone))
        .map(|p| annual_indices(p).len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{:>6}", "Year"));
    for zone in &zones {
        out.push_str(&format!(" {:>12}", zone));
    }
    out.push('\n');

    for year in 0..years {
        out.push_str(&format!("{:>6}", year));
        for zone in &zones {
            let index = paths.index_at(zone, year * MONTHS_PER_YEAR);
            out.push_str(&format!(" {:>12.6}", index));
        }
        out.push('\n');
    }

    let rates = paths.annualized_rates();
    out.push_str(&format!("{:>6}", "CAGR"));
    for zone in &zones {
        let rate = rates.get(*zone).copied().unwrap_or(0.0);
        out.push_str(&format!(" {:>11.4}%", rate * 100.0));
    }
    out.push('\n');
    out
}

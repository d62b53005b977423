//! Sample command implementation
//!
//! Draws from a named distribution on one stream and reports summary
//! statistics.

use std::collections::HashMap;

use fund_rng::{
    distribution_stats, DistributionKind, DistributionStats, FactoryState, RandomFactory,
};
use serde::Serialize;
use tracing::info;

use super::OutputFormat;
use crate::{CliError, Result};

/// What to sample
#[derive(Debug, Clone)]
pub struct SampleRequest {
    pub purpose: String,
    pub distribution: String,
    pub params: Vec<(String, f64)>,
    pub size: usize,
    pub instance_id: u64,
}

#[derive(Debug, Serialize)]
struct SampleReport<'a> {
    purpose: &'a str,
    instance_id: u64,
    distribution: DistributionKind,
    size: usize,
    stats: DistributionStats,
}

/// Parse a `key=value` distribution parameter
pub fn parse_param(arg: &str) -> std::result::Result<(String, f64), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("parameter '{}' is not a number: '{}'", key, value))?;
    Ok((key.trim().to_string(), value))
}

/// Run the sample command
pub fn run(state: &FactoryState, request: &SampleRequest, format: &str) -> Result<String> {
    let format = OutputFormat::parse(format)?;
    if request.size == 0 {
        return Err(CliError::InvalidArgument("--size must be positive".into()));
    }

    let params: HashMap<String, f64> = request.params.iter().cloned().collect();
    let kind = DistributionKind::from_name(&request.distribution, &params)?;
    info!(
        purpose = %request.purpose,
        distribution = kind.name(),
        size = request.size,
        "Sampling distribution"
    );

    let mut factory = RandomFactory::from_state(state);
    let samples = factory.distribution_samples(
        &request.purpose,
        &kind,
        request.size,
        request.instance_id,
    )?;
    let stats = distribution_stats(&samples)
        .ok_or_else(|| CliError::InvalidArgument("no samples drawn".to_string()))?;

    let output = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&SampleReport {
            purpose: &request.purpose,
            instance_id: request.instance_id,
            distribution: kind,
            size: request.size,
            stats,
        })?,
        OutputFormat::Table => render_table(&request.purpose, &kind, request.size, &stats),
    };
    Ok(output)
}

fn render_table(
    purpose: &str,
    kind: &DistributionKind,
    size: usize,
    stats: &DistributionStats,
) -> String {
    let rows = [
        ("mean", stats.mean),
        ("std_dev", stats.std_dev),
        ("min", stats.min),
        ("q1", stats.q1),
        ("median", stats.median),
        ("q3", stats.q3),
        ("max", stats.max),
        ("skewness", stats.skewness),
        ("kurtosis", stats.kurtosis),
    ];

    let mut out = format!("{} ({}, n = {})\n", purpose, kind.name(), size);
    for (label, value) in rows {
        out.push_str(&format!("  {:<10} {:>14.6}\n", label, value));
    }
    out
}

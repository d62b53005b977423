//! CLI command implementations
//!
//! Each submodule implements a specific CLI command. Commands build their
//! output as a `String` and `main` prints it.

pub mod sample;
pub mod simulate;
pub mod state;
pub mod trials;

use std::path::Path;

use fund_rng::{FactoryState, RandomFactory};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::{CliError, Result};

/// Output formats shared by the reporting commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}

impl OutputFormat {
    /// Parse a `--format` value
    pub fn parse(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            other => Err(CliError::InvalidArgument(format!(
                "Unknown format: {}. Supported: json, table",
                other
            ))),
        }
    }
}

/// Factory settings of `config` that a restored state file replaces
pub fn overridden_by_state(config: &SimulationConfig) -> Vec<&'static str> {
    let mut names = Vec::new();
    if config.seed.is_some() {
        names.push("seed");
    }
    if config.deterministic_mode {
        names.push("deterministic_mode");
    }
    if !config.correlation_matrix.is_empty() {
        names.push("correlation_matrix");
    }
    if !config.variation_factors.is_empty() {
        names.push("variation_factors");
    }
    names
}

/// Factory state for a run: restored from `state_file` when given, otherwise
/// built from the configuration.
///
/// A state file takes precedence over every factory setting of `config`.
pub fn factory_state(
    config: &SimulationConfig,
    state_file: Option<&Path>,
) -> Result<FactoryState> {
    match state_file {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::FileNotFound(path.display().to_string()));
            }
            let state = FactoryState::load(path)?;
            let overridden = overridden_by_state(config);
            if !overridden.is_empty() {
                warn!(
                    path = %path.display(),
                    settings = ?overridden,
                    "Configured factory settings ignored in favour of the state file"
                );
            }
            info!(
                path = %path.display(),
                base_seed = state.base_seed,
                "Factory state restored"
            );
            Ok(state)
        }
        None => {
            let state = RandomFactory::new(config.factory_config()).state();
            info!(
                base_seed = state.base_seed,
                deterministic = state.deterministic_mode,
                "Factory configured"
            );
            Ok(state)
        }
    }
}

//! Simulation configuration management
//!
//! Loads configuration from a TOML file, `FUNDSIM_*` environment variables and
//! command-line arguments, in increasing order of precedence.
//!
//! ```toml
//! log_level = "info"
//! years = 10
//! seed = "fund-iv"
//! deterministic_mode = false
//!
//! [variation_factors]
//! loan_amount = 0.25
//!
//! [correlation_matrix.price_path_green]
//! price_path_red = 0.4
//!
//! [zones.green]
//! appreciation_rate = 0.05
//! volatility = 0.08
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use fund_paths::ZoneParams;
use fund_rng::{CorrelationMatrix, FactoryConfig, SeedSource, DEFAULT_VARIATION_FACTOR};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;

/// Environment variable overriding the seed.
pub const ENV_SEED: &str = "FUNDSIM_SEED";
/// Environment variable overriding deterministic mode.
pub const ENV_DETERMINISTIC: &str = "FUNDSIM_DETERMINISTIC";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "FUNDSIM_LOG_LEVEL";
/// Environment variable overriding the simulated horizon.
pub const ENV_YEARS: &str = "FUNDSIM_YEARS";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Correlation between {0} and {1} must lie in [-1, 1], got {2}")]
    InvalidCorrelation(String, String, f64),

    #[error("Configuration file error: {0}")]
    FileError(String),
}

/// Verbosity of the `fundsim` subscriber
///
/// Parsed case-insensitively from the config file, `FUNDSIM_LOG_LEVEL` and
/// `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse an environment value
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        <Self as ValueEnum>::from_str(value.trim(), true)
            .map_err(|_| ConfigError::InvalidLogLevel(value.to_string()))
    }

    /// Default directive of the subscriber's filter
    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

/// Parses a seed argument: integers are used as-is, anything else is a named seed.
pub fn parse_seed(value: &str) -> SeedSource {
    match value.trim().parse::<u64>() {
        Ok(seed) => SeedSource::Fixed(seed),
        Err(_) => SeedSource::Named(value.to_string()),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}

fn negative(value: f64) -> bool {
    value.is_nan() || value < 0.0
}

/// Simulation configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Log level
    pub log_level: LogLevel,
    /// Simulated horizon in years
    pub years: u32,
    /// Base seed; absent draws an entropy seed
    pub seed: Option<SeedSource>,
    /// Collapse seeding and variation to fixed values
    pub deterministic_mode: bool,
    /// Variation factor for purposes without an explicit entry
    pub default_variation_factor: f64,
    /// Per-purpose variation factors
    pub variation_factors: BTreeMap<String, f64>,
    /// Explicit correlations between purposes
    pub correlation_matrix: CorrelationMatrix,
    /// Appreciation assumptions per zone
    pub zones: BTreeMap<String, ZoneParams>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            years: 10,
            seed: None,
            deterministic_mode: false,
            default_variation_factor: DEFAULT_VARIATION_FACTOR,
            variation_factors: BTreeMap::new(),
            correlation_matrix: CorrelationMatrix::new(),
            zones: BTreeMap::from([
                ("green".to_string(), ZoneParams::new(0.05, 0.08)),
                ("orange".to_string(), ZoneParams::new(0.03, 0.12)),
                ("red".to_string(), ZoneParams::new(0.01, 0.20)),
            ]),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::FileError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `FUNDSIM_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(seed) = lookup(ENV_SEED) {
            self.seed = Some(parse_seed(&seed));
        }
        if let Some(flag) = lookup(ENV_DETERMINISTIC) {
            self.deterministic_mode = parse_bool(ENV_DETERMINISTIC, &flag)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::parse(&level)?;
        }
        if let Some(years) = lookup(ENV_YEARS) {
            self.years = years.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: ENV_YEARS,
                value: years.clone(),
            })?;
        }
        Ok(())
    }

    /// Merge with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli: &CliArgs) {
        if let Some(seed) = &cli.seed {
            self.seed = Some(parse_seed(seed));
        }
        if cli.deterministic {
            self.deterministic_mode = true;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        if let Some(years) = cli.years {
            self.years = years;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (first, row) in &self.correlation_matrix {
            for (second, &rho) in row {
                if !(-1.0..=1.0).contains(&rho) {
                    return Err(ConfigError::InvalidCorrelation(
                        first.clone(),
                        second.clone(),
                        rho,
                    ));
                }
            }
        }

        if negative(self.default_variation_factor) {
            return Err(ConfigError::InvalidValue {
                name: "default_variation_factor",
                value: self.default_variation_factor.to_string(),
            });
        }
        let negative_factor = self.variation_factors.iter().find(|(_, f)| negative(**f));
        if let Some((purpose, factor)) = negative_factor {
            return Err(ConfigError::InvalidValue {
                name: "variation_factors",
                value: format!("{} = {}", purpose, factor),
            });
        }
        let negative_volatility = self.zones.iter().find(|(_, p)| negative(p.volatility));
        if let Some((zone, params)) = negative_volatility {
            return Err(ConfigError::InvalidValue {
                name: "zones.volatility",
                value: format!("{} = {}", zone, params.volatility),
            });
        }

        Ok(())
    }

    /// Factory configuration of this simulation
    pub fn factory_config(&self) -> FactoryConfig {
        FactoryConfig {
            seed: self.seed.clone(),
            deterministic_mode: self.deterministic_mode,
            correlation_matrix: self.correlation_matrix.clone(),
            variation_factors: self.variation_factors.clone(),
            default_variation_factor: self.default_variation_factor,
        }
    }
}

/// CLI arguments structure
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Config file path
    pub config_file: Option<PathBuf>,
    /// Seed override
    pub seed: Option<String>,
    /// Force deterministic mode
    pub deterministic: bool,
    /// Log level override
    pub log_level: Option<LogLevel>,
    /// Horizon override
    pub years: Option<u32>,
}

/// Build configuration from all sources
///
/// Priority (highest to lowest):
/// 1. CLI arguments
/// 2. Environment variables
/// 3. Config file
/// 4. Default values
pub fn build_config(cli: &CliArgs) -> Result<SimulationConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

/// [`build_config`] with an explicit environment lookup
pub fn build_config_with<F>(cli: &CliArgs, lookup: F) -> Result<SimulationConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };

    config.apply_env(lookup)?;
    config.merge_with_cli(cli);

    config.validate()?;
    Ok(config)
}

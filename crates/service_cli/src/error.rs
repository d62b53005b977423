//! CLI error types

use fund_paths::PathError;
use fund_rng::RngError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by `fundsim` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An input file does not exist.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// A command-line argument is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Random stream failure.
    #[error(transparent)]
    Rng(#[from] RngError),

    /// Price path failure.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Output could not be serialised.
    #[error("Serialisation error: {0}")]
    Serialisation(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

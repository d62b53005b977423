//! Error types for price path simulation.

use fund_rng::RngError;
use thiserror::Error;

/// Result alias for path operations.
pub type Result<T> = std::result::Result<T, PathError>;

/// Errors raised while simulating price paths.
#[derive(Debug, Error)]
pub enum PathError {
    /// Rate or volatility outside its valid domain.
    #[error("Invalid path parameter '{name}': {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the invalid value.
        value: String,
    },

    /// Failure in the underlying random stream factory.
    #[error(transparent)]
    Rng(#[from] RngError),
}

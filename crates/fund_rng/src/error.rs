//! Error types for the random stream factory.
//!
//! Configuration problems (unknown distribution names, malformed weights,
//! invalid parameters) fail fast and are never silently substituted.
//! Persistence failures are reported separately so callers can decide whether
//! to fall back to a default configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for factory operations.
pub type Result<T> = std::result::Result<T, RngError>;

/// Errors raised by the factory and its sampling API.
#[derive(Debug, Error)]
pub enum RngError {
    /// Distribution name not in the supported set.
    #[error("Unsupported distribution '{0}'. Supported: normal, lognormal, uniform, beta, exponential, weibull")]
    UnsupportedDistribution(String),

    /// Distribution or sampling parameter outside its valid domain.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Description of the problem.
        reason: String,
    },

    /// Weighted choice probabilities are malformed.
    #[error("Invalid probabilities: {0}")]
    InvalidProbabilities(String),

    /// Weighted choice over an empty set.
    #[error("Cannot choose from an empty set of choices")]
    EmptyChoices,

    /// Generator id issued before the most recent reset.
    #[error("Generator id {index} belongs to epoch {epoch}, factory is at epoch {current}")]
    StaleGenerator {
        /// Slot index of the id.
        index: usize,
        /// Epoch the id was issued in.
        epoch: u64,
        /// Current factory epoch.
        current: u64,
    },

    /// Saving or loading factory state failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl RngError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Errors at the save/load boundary of [`crate::FactoryState`].
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// State file could not be read or written.
    #[error("Failed to access state file {}: {source}", path.display())]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// State document is not valid factory state.
    #[error("Malformed factory state: {0}")]
    Malformed(#[from] serde_json::Error),
}

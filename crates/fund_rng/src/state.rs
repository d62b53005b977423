//! Persisted factory configuration.
//!
//! Only configuration is stored, never generator state: a restored factory
//! derives the same seeds as the original and therefore replays every stream
//! from its first draw.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PersistenceError, Result};
use crate::factory::{CorrelationMatrix, RandomFactory, DEFAULT_VARIATION_FACTOR};

/// Flat record of a factory's configuration.
///
/// # Examples
///
/// ```rust
/// use fund_rng::{FactoryState, RandomFactory};
///
/// let factory = RandomFactory::with_seed("fund-iv");
/// let json = FactoryState::capture(&factory).to_json().unwrap();
///
/// let restored = FactoryState::from_json(&json).unwrap().restore();
/// assert_eq!(
///     restored.derive_seed("defaults", 3),
///     factory.derive_seed("defaults", 3),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactoryState {
    /// Resolved base seed.
    pub base_seed: u64,
    /// Deterministic mode flag.
    #[serde(default)]
    pub deterministic_mode: bool,
    /// Explicit correlations.
    #[serde(default)]
    pub correlation_matrix: CorrelationMatrix,
    /// Per-purpose variation factors.
    #[serde(default)]
    pub variation_factors: BTreeMap<String, f64>,
    /// Fallback variation factor.
    #[serde(default = "default_variation_factor")]
    pub default_variation_factor: f64,
}

fn default_variation_factor() -> f64 {
    DEFAULT_VARIATION_FACTOR
}

impl FactoryState {
    /// Snapshot of `factory`'s configuration.
    pub fn capture(factory: &RandomFactory) -> Self {
        Self {
            base_seed: factory.base_seed(),
            deterministic_mode: factory.is_deterministic(),
            correlation_matrix: factory.correlation_matrix().clone(),
            variation_factors: factory.variation_factors().clone(),
            default_variation_factor: factory.default_variation_factor(),
        }
    }

    /// Fresh factory with this configuration and an empty cache.
    pub fn restore(&self) -> RandomFactory {
        RandomFactory::from_parts(
            self.base_seed,
            self.deterministic_mode,
            self.correlation_matrix.clone(),
            self.variation_factors.clone(),
            self.default_variation_factor,
        )
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::Malformed(e).into())
    }

    /// Parses JSON produced by [`FactoryState::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PersistenceError::Malformed(e).into())
    }

    /// Writes the state to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), base_seed = self.base_seed, "Factory state saved");
        Ok(())
    }

    /// Reads state from `path`.
    ///
    /// # Errors
    ///
    /// [`PersistenceError::Io`] for a missing or unreadable file,
    /// [`PersistenceError::Malformed`] for invalid content.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

impl RandomFactory {
    /// Fresh factory from persisted state.
    pub fn from_state(state: &FactoryState) -> Self {
        state.restore()
    }

    /// Snapshot of this factory's configuration.
    pub fn state(&self) -> FactoryState {
        FactoryState::capture(self)
    }
}

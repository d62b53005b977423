//! Random stream factory and its generator cache.
//!
//! A [`RandomFactory`] owns every generator it hands out. Generators live in
//! an arena (`Vec<Generator>`) and are addressed by key through index maps,
//! so a repeated request for the same `(purpose, instance_id)` continues the
//! existing stream instead of restarting it.
//!
//! # Architecture
//!
//! ```text
//! RandomFactory
//! ├── base seed + deterministic mode   (seed derivation inputs)
//! ├── correlation matrix               (correlation engine)
//! ├── variation factors                (sampling defaults)
//! └── arena
//!     ├── generators: Vec<Generator>
//!     ├── primary:    (purpose, instance_id)          -> slot
//!     └── correlated: (purpose1, purpose2, instance_id) -> slot
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, RngError};
use crate::generator::{Generator, StreamKey};
use crate::seed::{self, SeedSource};

/// Spread used by the variation-factor convention when a purpose has no
/// configured factor.
pub const DEFAULT_VARIATION_FACTOR: f64 = 0.1;

/// Variation factor applied to every purpose in deterministic mode.
pub const DETERMINISTIC_VARIATION_FACTOR: f64 = 1e-4;

/// Pairwise correlation overrides, `matrix[purpose1][purpose2] = rho`.
pub type CorrelationMatrix = BTreeMap<String, BTreeMap<String, f64>>;

/// Factory construction parameters.
///
/// # Examples
///
/// ```rust
/// use fund_rng::{FactoryConfig, RandomFactory};
///
/// let config = FactoryConfig::default()
///     .with_seed(42)
///     .with_correlation("defaults", "prepayments", -0.3)
///     .with_variation_factor("loan_amount", 0.25);
///
/// let factory = RandomFactory::new(config);
/// assert_eq!(factory.base_seed(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Seed source; `None` draws a process-random base seed.
    pub seed: Option<SeedSource>,
    /// Collapse seeding and variation to fixed baseline values.
    pub deterministic_mode: bool,
    /// Explicit correlations between purposes.
    pub correlation_matrix: CorrelationMatrix,
    /// Per-purpose variation factors.
    pub variation_factors: BTreeMap<String, f64>,
    /// Factor used for purposes without an entry in `variation_factors`.
    pub default_variation_factor: f64,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            seed: None,
            deterministic_mode: false,
            correlation_matrix: CorrelationMatrix::new(),
            variation_factors: BTreeMap::new(),
            default_variation_factor: DEFAULT_VARIATION_FACTOR,
        }
    }
}

impl FactoryConfig {
    /// Sets the seed source.
    pub fn with_seed(mut self, seed: impl Into<SeedSource>) -> Self {
        self.seed = Some(seed.into());
        self
    }

    /// Sets deterministic mode.
    pub fn deterministic(mut self, enabled: bool) -> Self {
        self.deterministic_mode = enabled;
        self
    }

    /// Adds an explicit correlation between two purposes.
    pub fn with_correlation(
        mut self,
        purpose1: impl Into<String>,
        purpose2: impl Into<String>,
        correlation: f64,
    ) -> Self {
        self.correlation_matrix
            .entry(purpose1.into())
            .or_default()
            .insert(purpose2.into(), correlation);
        self
    }

    /// Sets the variation factor of one purpose.
    pub fn with_variation_factor(mut self, purpose: impl Into<String>, factor: f64) -> Self {
        self.variation_factors.insert(purpose.into(), factor);
        self
    }
}

/// Handle to a generator owned by a [`RandomFactory`].
///
/// Ids are tied to the factory epoch; after [`RandomFactory::reset`] an old
/// id no longer resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GeneratorId {
    index: usize,
    epoch: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PairKey {
    pub(crate) purpose1: String,
    pub(crate) purpose2: String,
    pub(crate) instance_id: u64,
}

/// Owner of all random streams for one simulation run or worker.
///
/// # Examples
///
/// ```rust
/// use fund_rng::{FactoryConfig, RandomFactory};
///
/// let mut factory = RandomFactory::new(FactoryConfig::default().with_seed(7));
///
/// let first = factory.generator("defaults", 0).gen_normal();
/// let second = factory.generator("defaults", 0).gen_normal();
/// assert_ne!(first, second); // draws continue
///
/// factory.reset();
/// assert_eq!(factory.generator("defaults", 0).gen_normal(), first);
/// ```
#[derive(Debug)]
pub struct RandomFactory {
    base_seed: u64,
    deterministic_mode: bool,
    pub(crate) correlation_matrix: CorrelationMatrix,
    variation_factors: BTreeMap<String, f64>,
    default_variation_factor: f64,
    generators: Vec<Generator>,
    primary: HashMap<StreamKey, usize>,
    pub(crate) correlated: HashMap<PairKey, usize>,
    epoch: u64,
}

impl RandomFactory {
    /// Creates a factory; the base seed is resolved once here.
    pub fn new(config: FactoryConfig) -> Self {
        let base_seed = seed::resolve_base_seed(config.seed.as_ref());
        debug!(
            base_seed,
            deterministic = config.deterministic_mode,
            "Random factory created"
        );
        Self::from_parts(
            base_seed,
            config.deterministic_mode,
            config.correlation_matrix,
            config.variation_factors,
            config.default_variation_factor,
        )
    }

    /// Shorthand for a factory with a fixed seed and default settings.
    pub fn with_seed(seed: impl Into<SeedSource>) -> Self {
        Self::new(FactoryConfig::default().with_seed(seed))
    }

    pub(crate) fn from_parts(
        base_seed: u64,
        deterministic_mode: bool,
        correlation_matrix: CorrelationMatrix,
        variation_factors: BTreeMap<String, f64>,
        default_variation_factor: f64,
    ) -> Self {
        Self {
            base_seed,
            deterministic_mode,
            correlation_matrix,
            variation_factors,
            default_variation_factor,
            generators: Vec::new(),
            primary: HashMap::new(),
            correlated: HashMap::new(),
            epoch: 0,
        }
    }

    /// Resolved base seed.
    #[inline]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Whether deterministic mode is active.
    #[inline]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic_mode
    }

    /// Toggles deterministic mode.
    ///
    /// Only streams created afterwards see the new seeding rule; cached
    /// generators keep their state. The variation-factor convention switches
    /// immediately.
    pub fn set_deterministic_mode(&mut self, enabled: bool) {
        self.deterministic_mode = enabled;
    }

    /// Explicit correlation overrides.
    #[inline]
    pub fn correlation_matrix(&self) -> &CorrelationMatrix {
        &self.correlation_matrix
    }

    /// Adds or replaces an explicit correlation.
    pub fn set_correlation(
        &mut self,
        purpose1: impl Into<String>,
        purpose2: impl Into<String>,
        correlation: f64,
    ) {
        self.correlation_matrix
            .entry(purpose1.into())
            .or_default()
            .insert(purpose2.into(), correlation);
    }

    /// Configured per-purpose variation factors.
    #[inline]
    pub fn variation_factors(&self) -> &BTreeMap<String, f64> {
        &self.variation_factors
    }

    /// Fallback variation factor.
    #[inline]
    pub fn default_variation_factor(&self) -> f64 {
        self.default_variation_factor
    }

    /// Sets the variation factor of one purpose.
    pub fn set_variation_factor(&mut self, purpose: impl Into<String>, factor: f64) {
        self.variation_factors.insert(purpose.into(), factor);
    }

    /// Effective variation factor of `purpose`.
    pub fn variation_factor(&self, purpose: &str) -> f64 {
        if self.deterministic_mode {
            return DETERMINISTIC_VARIATION_FACTOR;
        }
        self.variation_factors
            .get(purpose)
            .copied()
            .unwrap_or(self.default_variation_factor)
    }

    /// Seed a new `(purpose, instance_id)` stream would be created with.
    pub fn derive_seed(&self, purpose: &str, instance_id: u64) -> u32 {
        seed::derive_seed(
            self.base_seed,
            purpose,
            instance_id,
            self.deterministic_mode,
        )
    }

    /// Id of the `(purpose, instance_id)` generator, creating it on first use.
    pub fn generator_id(&mut self, purpose: &str, instance_id: u64) -> GeneratorId {
        let key = StreamKey::new(purpose, instance_id);
        if let Some(&index) = self.primary.get(&key) {
            return self.id(index);
        }
        let seed = self.derive_seed(purpose, instance_id);
        let index = self.push(Generator::from_seed(seed));
        debug!(purpose, instance_id, seed, "Generator created");
        self.primary.insert(key, index);
        self.id(index)
    }

    /// The `(purpose, instance_id)` generator, creating it on first use.
    pub fn generator(&mut self, purpose: &str, instance_id: u64) -> &mut Generator {
        let id = self.generator_id(purpose, instance_id);
        &mut self.generators[id.index]
    }

    /// Resolves an id issued by this factory.
    ///
    /// # Errors
    ///
    /// [`RngError::StaleGenerator`] if the id predates the latest reset.
    pub fn get_mut(&mut self, id: GeneratorId) -> Result<&mut Generator> {
        self.check(id)?;
        Ok(&mut self.generators[id.index])
    }

    /// Resolves two distinct ids at once.
    ///
    /// # Errors
    ///
    /// [`RngError::StaleGenerator`] for an outdated id, or
    /// [`RngError::InvalidParameter`] if both ids name the same generator.
    pub fn pair_mut(
        &mut self,
        first: GeneratorId,
        second: GeneratorId,
    ) -> Result<(&mut Generator, &mut Generator)> {
        self.check(first)?;
        self.check(second)?;
        match first.index.cmp(&second.index) {
            std::cmp::Ordering::Less => {
                let (head, tail) = self.generators.split_at_mut(second.index);
                Ok((&mut head[first.index], &mut tail[0]))
            }
            std::cmp::Ordering::Greater => {
                let (head, tail) = self.generators.split_at_mut(first.index);
                Ok((&mut tail[0], &mut head[second.index]))
            }
            std::cmp::Ordering::Equal => Err(RngError::invalid(
                "second",
                "pair must reference two distinct generators",
            )),
        }
    }

    /// Number of live generators, correlated seconds included.
    #[inline]
    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    /// Number of resets performed.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Discards every cached generator.
    ///
    /// Later requests recreate streams from the same seeds, replaying them
    /// from their first draw.
    pub fn reset(&mut self) {
        debug!(
            discarded = self.generators.len(),
            epoch = self.epoch,
            "Random factory reset"
        );
        self.generators.clear();
        self.primary.clear();
        self.correlated.clear();
        self.epoch += 1;
    }

    /// Rewinds every stream that involves `purpose` to its first draw.
    ///
    /// Ids stay valid; other purposes are untouched.
    pub fn reset_purpose(&mut self, purpose: &str) {
        let primary = self
            .primary
            .iter()
            .filter(|(key, _)| key.purpose == purpose)
            .map(|(_, &index)| index);
        let correlated = self
            .correlated
            .iter()
            .filter(|(key, _)| key.purpose1 == purpose || key.purpose2 == purpose)
            .map(|(_, &index)| index);
        let slots: Vec<usize> = primary.chain(correlated).collect();

        debug!(purpose, rewound = slots.len(), "Purpose reset");
        for index in slots {
            let seed = self.generators[index].seed();
            self.generators[index] = Generator::from_seed(seed);
        }
    }

    pub(crate) fn push(&mut self, generator: Generator) -> usize {
        self.generators.push(generator);
        self.generators.len() - 1
    }

    pub(crate) fn id(&self, index: usize) -> GeneratorId {
        GeneratorId {
            index,
            epoch: self.epoch,
        }
    }

    fn check(&self, id: GeneratorId) -> Result<()> {
        if id.epoch != self.epoch || id.index >= self.generators.len() {
            return Err(RngError::StaleGenerator {
                index: id.index,
                epoch: id.epoch,
                current: self.epoch,
            });
        }
        Ok(())
    }
}

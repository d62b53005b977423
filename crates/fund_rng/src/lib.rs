//! # Fund RNG (Core Layer: Randomness)
//!
//! Deterministic, reproducible random streams for fund-performance
//! simulation.
//!
//! Every subsystem of a simulation (loan generation, default and prepayment
//! modelling, price paths, outer and inner Monte Carlo loops) draws from its
//! own named stream. Streams are identified by a `(purpose, instance_id)`
//! pair, seeded by hashing that pair together with one base seed, and cached
//! by a [`RandomFactory`] so that successive requests continue the same
//! sequence.
//!
//! ## Module Structure
//!
//! - [`seed`]: SHA-256 based seed derivation
//! - [`generator`]: the seeded stream type
//! - [`factory`]: configuration and the generator cache
//! - `correlation`: correlated stream pairs (methods on [`RandomFactory`])
//! - `sampling`: typed draws and the variation-factor convention
//! - [`distribution`]: closed set of named distributions
//! - [`stats`]: descriptive statistics
//! - [`state`]: persisted configuration
//! - [`lifecycle`]: shared and process-wide factories
//!
//! ## Usage Example
//!
//! ```rust
//! use fund_rng::{FactoryConfig, RandomFactory};
//!
//! let config = FactoryConfig::default()
//!     .with_seed(42)
//!     .with_correlation("defaults", "prepayments", -0.3);
//! let mut factory = RandomFactory::new(config);
//!
//! let loan = factory.normal("loan_amount", 250_000.0, None, 0).unwrap();
//! let (default_score, prepay_score) = factory
//!     .correlated_normals("defaults", "prepayments", 0.0, 0.0, 0.0, Some(1.0), Some(1.0), 0)
//!     .unwrap();
//! # let _ = (loan, default_score, prepay_score);
//! ```
//!
//! ## Concurrency
//!
//! Drawing requires `&mut RandomFactory`. Run one factory per worker
//! (rebuilt from a [`FactoryState`]) or share one through [`SharedFactory`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod distribution;
pub mod error;
pub mod factory;
pub mod generator;
pub mod lifecycle;
pub mod seed;
pub mod state;
pub mod stats;

mod correlation;
mod sampling;

// Public re-exports
pub use distribution::DistributionKind;
pub use error::{PersistenceError, Result, RngError};
pub use factory::{
    CorrelationMatrix, FactoryConfig, GeneratorId, RandomFactory, DEFAULT_VARIATION_FACTOR,
    DETERMINISTIC_VARIATION_FACTOR,
};
pub use generator::{Generator, StreamKey};
pub use lifecycle::SharedFactory;
pub use sampling::PROBABILITY_TOLERANCE;
pub use seed::SeedSource;
pub use state::FactoryState;
pub use stats::{distribution_stats, DistributionStats};

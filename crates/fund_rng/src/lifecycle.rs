//! Shared and process-wide factory access.
//!
//! Simulation code should receive a [`RandomFactory`] explicitly, one per run
//! or worker. [`SharedFactory`] covers the remaining case where several
//! threads must draw from one factory: every access goes through a mutex, so
//! a generator is never advanced from two threads at once.
//!
//! # Example
//!
//! ```rust
//! use fund_rng::{FactoryConfig, SharedFactory};
//!
//! let shared = SharedFactory::new(FactoryConfig::default().with_seed(42));
//! let worker = shared.clone();
//!
//! let handle = std::thread::spawn(move || {
//!     worker.with(|factory| factory.normal("defaults", 0.0, Some(1.0), 1))
//! });
//! let local = shared.with(|factory| factory.normal("defaults", 0.0, Some(1.0), 0));
//!
//! assert!(local.is_ok());
//! assert!(handle.join().unwrap().is_ok());
//! ```

use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tracing::debug;

use crate::factory::{FactoryConfig, RandomFactory};
use crate::state::FactoryState;

static GLOBAL: OnceLock<SharedFactory> = OnceLock::new();

/// Cloneable, thread-safe handle to one [`RandomFactory`].
#[derive(Clone, Debug)]
pub struct SharedFactory {
    inner: Arc<Mutex<RandomFactory>>,
}

impl SharedFactory {
    /// Wraps a new factory built from `config`.
    pub fn new(config: FactoryConfig) -> Self {
        Self::from_factory(RandomFactory::new(config))
    }

    /// Wraps an existing factory.
    pub fn from_factory(factory: RandomFactory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(factory)),
        }
    }

    /// Process-wide instance, created on first use with an entropy seed.
    pub fn global() -> &'static SharedFactory {
        GLOBAL.get_or_init(|| SharedFactory::new(FactoryConfig::default()))
    }

    /// Runs `f` with exclusive access to the factory.
    pub fn with<R>(&self, f: impl FnOnce(&mut RandomFactory) -> R) -> R {
        f(&mut self.lock())
    }

    /// Replaces the factory with a new one built from `config`.
    ///
    /// Every cached generator is dropped.
    pub fn configure(&self, config: FactoryConfig) {
        let factory = RandomFactory::new(config);
        debug!(
            base_seed = factory.base_seed(),
            "Shared factory reconfigured"
        );
        *self.lock() = factory;
    }

    /// Replaces the factory with one restored from `state`.
    pub fn restore(&self, state: &FactoryState) {
        *self.lock() = state.restore();
    }

    /// Configuration snapshot.
    pub fn state(&self) -> FactoryState {
        self.lock().state()
    }

    /// Clears the generator cache.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Toggles deterministic mode for streams created afterwards.
    pub fn set_deterministic_mode(&self, enabled: bool) {
        self.lock().set_deterministic_mode(enabled);
    }

    fn lock(&self) -> MutexGuard<'_, RandomFactory> {
        // Maps are consistent between calls, so a poisoned lock is still usable.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

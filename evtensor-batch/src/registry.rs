//! Explicit filler registry.
//!
//! Filler types are registered by explicit calls at process start; there
//! is no load-time self-registration.

use std::collections::HashMap;

use crate::config::{Dimensionality, FillerConfig};
use crate::filler::TensorFiller;
use crate::{Error, Result};

/// Constructs a configured filler for a given batch size.
pub type FillerFactory = fn(FillerConfig, usize) -> Result<TensorFiller>;

/// Name-to-factory map for filler construction.
#[derive(Default)]
pub struct FillerRegistry {
    factories: HashMap<String, FillerFactory>,
}

impl FillerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the built-in filler types registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("batch_tensor2d", |config, batch_size| {
            TensorFiller::new(config, Dimensionality::Two, batch_size)
        });
        registry.register("batch_tensor3d", |config, batch_size| {
            TensorFiller::new(config, Dimensionality::Three, batch_size)
        });
        registry
    }

    /// Registers a factory under a name, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, factory: FillerFactory) {
        self.factories.insert(name.into(), factory);
    }

    /// Builds a configured filler by registered name.
    ///
    /// # Errors
    /// Returns `UnknownFiller` for an unregistered name, or the factory's
    /// configuration error.
    pub fn build(
        &self,
        name: &str,
        config: FillerConfig,
        batch_size: usize,
    ) -> Result<TensorFiller> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownFiller(name.to_string()))?;
        factory(config, batch_size)
    }
}

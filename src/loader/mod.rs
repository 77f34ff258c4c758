// src/loader/mod.rs

//! Pluggable config loader abstraction.
//!
//! A step carrying a `[steps.<name>.loader]` table expands at runtime into a
//! sub-pipeline whose document is supplied by a [`ConfigLoader`]. The
//! `type` key of that table selects the loader from a [`LoaderRegistry`].
//!
//! - [`FileConfigLoader`] (`type = "file"`) reads a TOML file through the
//!   [`FileSystem`](crate::fs::FileSystem) abstraction.
//! - Tests register their own loaders that hand back a fixed document.

use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::model::LoaderSettings;
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::types::StepConfig;

pub mod file;

pub use file::FileConfigLoader;

/// Supplier of a sub-pipeline document.
pub trait ConfigLoader: Send + Debug {
    /// Initialise the loader from the step's `loader` table.
    fn configure(&mut self, config: &StepConfig) -> Result<()>;

    /// The sub-pipeline document, resolved to concrete values.
    fn config(&self) -> Result<toml::Table>;
}

type LoaderFactory = Box<dyn Fn() -> Box<dyn ConfigLoader> + Send + Sync>;

/// Maps loader `type` names to factories.
pub struct LoaderRegistry {
    factories: BTreeMap<String, LoaderFactory>,
}

impl LoaderRegistry {
    /// A registry with no loaders at all.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry whose `"file"` loader reads through the given filesystem,
    /// resolving relative paths against `root_dir`.
    pub fn with_file_system(fs: Arc<dyn FileSystem>, root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let mut registry = Self::empty();
        registry.register(FileConfigLoader::TYPE, move || {
            Box::new(FileConfigLoader::new(Arc::clone(&fs), root_dir.clone()))
                as Box<dyn ConfigLoader>
        });
        registry
    }

    /// Register (or replace) the factory for a loader type.
    pub fn register<F>(&mut self, loader_type: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn ConfigLoader> + Send + Sync + 'static,
    {
        self.factories.insert(loader_type.into(), Box::new(factory));
    }

    pub fn loader_types(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(|s| s.as_str())
    }

    /// Build and configure the loader described by a step's `loader` table.
    pub fn create(&self, config: &StepConfig) -> Result<Box<dyn ConfigLoader>> {
        let settings = toml::Value::Table(config.clone())
            .try_into::<LoaderSettings>()
            .map_err(|e| PipelineError::ConfigError(format!("malformed loader settings: {e}")))?;

        let factory = self.factories.get(&settings.loader_type).ok_or_else(|| {
            PipelineError::ConfigError(format!(
                "unknown loader type '{}' (registered: {})",
                settings.loader_type,
                self.loader_types().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let mut loader = factory();
        loader.configure(config)?;
        Ok(loader)
    }
}

impl Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

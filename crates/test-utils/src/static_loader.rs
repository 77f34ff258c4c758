use pipedag::errors::Result;
use pipedag::loader::{ConfigLoader, LoaderRegistry};
use pipedag::types::StepConfig;
use std::sync::{Arc, Mutex};

/// A config loader that hands back a fixed document and records how it was
/// used.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    document: toml::Table,
    calls: Arc<Mutex<LoaderCalls>>,
}

/// What a [`StaticConfigLoader`] was asked to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderCalls {
    pub configured: usize,
    pub fetched: usize,
}

impl StaticConfigLoader {
    pub const TYPE: &'static str = "testing";

    pub fn new(document: toml::Table, calls: Arc<Mutex<LoaderCalls>>) -> Self {
        Self { document, calls }
    }

    /// A registry whose `"testing"` loader always returns `document`.
    ///
    /// The returned counters are shared by every loader the registry creates.
    pub fn registry(document: toml::Table) -> (LoaderRegistry, Arc<Mutex<LoaderCalls>>) {
        let calls = Arc::new(Mutex::new(LoaderCalls::default()));
        let shared = Arc::clone(&calls);
        let mut registry = LoaderRegistry::empty();
        registry.register(Self::TYPE, move || {
            Box::new(StaticConfigLoader::new(document.clone(), Arc::clone(&shared)))
                as Box<dyn ConfigLoader>
        });
        (registry, calls)
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn configure(&mut self, _config: &StepConfig) -> Result<()> {
        self.calls.lock().unwrap().configured += 1;
        Ok(())
    }

    fn config(&self) -> Result<toml::Table> {
        self.calls.lock().unwrap().fetched += 1;
        Ok(self.document.clone())
    }
}

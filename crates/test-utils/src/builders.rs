#![allow(dead_code)]

use pipedag::dag::{Step, StepSet};
use pipedag::types::{StepConfig, StepKind};

/// Builder for a configured `Step`.
pub struct StepBuilder {
    name: String,
    kind: StepKind,
    deps: Vec<String>,
    extra: StepConfig,
}

impl StepBuilder {
    pub fn batch(name: &str) -> Self {
        Self::new(name, StepKind::Batch)
    }

    /// A streaming step, configured with an empty `input.translator`.
    pub fn streaming(name: &str) -> Self {
        let mut builder = Self::new(name, StepKind::Streaming);
        let mut input = toml::Table::new();
        input.insert("translator".to_string(), toml::Value::Table(toml::Table::new()));
        builder.extra.insert("input".to_string(), toml::Value::Table(input));
        builder
    }

    pub fn looping(name: &str) -> Self {
        let mut builder = Self::new(name, StepKind::Loop);
        builder
            .extra
            .insert("type".to_string(), toml::Value::String("loop".to_string()));
        builder
    }

    fn new(name: &str, kind: StepKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            deps: Vec::new(),
            extra: StepConfig::new(),
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.deps.push(dep.to_string());
        self
    }

    /// Set an arbitrary top-level config value.
    pub fn setting(mut self, key: &str, value: toml::Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Step {
        let mut config = self.extra;
        if !self.deps.is_empty() {
            let deps = self.deps.into_iter().map(toml::Value::String).collect();
            config.insert("dependencies".to_string(), toml::Value::Array(deps));
        }

        let mut step = Step::new(self.name, self.kind);
        step.configure(config)
            .expect("Failed to configure step from builder");
        step
    }
}

/// Builder for a `StepSet`.
#[derive(Default)]
pub struct StepSetBuilder {
    steps: Vec<Step>,
}

impl StepSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(mut self, step: StepBuilder) -> Self {
        self.steps.push(step.build());
        self
    }

    pub fn build(self) -> StepSet {
        StepSet::try_from(self.steps).expect("Failed to build step set from builder")
    }
}

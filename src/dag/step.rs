// src/dag/step.rs

//! The step entity and its lifecycle state machine.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tracing::trace;

use crate::config::model::{DEPENDENCIES_KEY, LOADER_KEY, StepSettings};
use crate::errors::{PipelineError, Result};
use crate::types::{StepConfig, StepKind, StepName, StepState};

/// Opaque handle to the dataset computed by a data-producing step.
///
/// The graph engine never looks inside; the execution engine stores whatever
/// it materialised and reads it back with [`DataHandle::downcast_ref`].
#[derive(Clone)]
pub struct DataHandle(Arc<dyn Any + Send + Sync>);

impl DataHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }
}

impl fmt::Debug for DataHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataHandle(..)")
    }
}

/// A named node in the pipeline DAG.
///
/// Equality and hashing use the name only, so two `Step` values with the
/// same name are the same logical step.
#[derive(Debug, Clone)]
pub struct Step {
    name: StepName,
    kind: StepKind,
    config: StepConfig,
    dependency_names: BTreeSet<StepName>,
    state: StepState,
    data: Option<DataHandle>,
}

impl Step {
    /// Create an unconfigured step of the given variant.
    pub fn new(name: impl Into<StepName>, kind: StepKind) -> Self {
        Self {
            name: name.into(),
            kind,
            config: StepConfig::new(),
            dependency_names: BTreeSet::new(),
            state: StepState::Waiting,
            data: None,
        }
    }

    pub fn batch(name: impl Into<StepName>) -> Self {
        Self::new(name, StepKind::Batch)
    }

    pub fn streaming(name: impl Into<StepName>) -> Self {
        Self::new(name, StepKind::Streaming)
    }

    pub fn looping(name: impl Into<StepName>) -> Self {
        Self::new(name, StepKind::Loop)
    }

    /// Attach a configuration fragment to this step.
    ///
    /// Parses the dependency names and the settings this crate understands,
    /// then resets the step to `Waiting` with no dataset. Fails with
    /// [`PipelineError::ConfigError`] if any of them is malformed.
    pub fn configure(&mut self, config: StepConfig) -> Result<()> {
        let settings = parse_settings(&self.name, &config)?;

        self.dependency_names = settings.dependencies.into_iter().collect();
        self.config = config;
        self.state = StepState::Waiting;
        self.data = None;

        trace!(
            step = %self.name,
            kind = %self.kind,
            deps = ?self.dependency_names,
            "step configured"
        );
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StepKind {
        self.kind
    }

    pub fn produces_data(&self) -> bool {
        self.kind.produces_data()
    }

    pub fn is_streaming(&self) -> bool {
        self.kind.is_streaming()
    }

    pub fn config(&self) -> &StepConfig {
        &self.config
    }

    /// The `[steps.<name>.loader]` table, if this step expands into a
    /// dynamically loaded sub-pipeline.
    pub fn loader_config(&self) -> Option<&toml::Table> {
        self.config.get(LOADER_KEY).and_then(|v| v.as_table())
    }

    pub fn dependency_names(&self) -> &BTreeSet<StepName> {
        &self.dependency_names
    }

    /// Replace the declared dependencies.
    ///
    /// The `dependencies` entry of the configuration is rewritten as well
    /// (sorted), so the config always describes the step's current wiring.
    pub fn set_dependency_names<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<StepName>,
    {
        self.dependency_names = names.into_iter().map(Into::into).collect();

        let deps = self
            .dependency_names
            .iter()
            .cloned()
            .map(toml::Value::String)
            .collect::<Vec<_>>();
        self.config
            .insert(DEPENDENCIES_KEY.to_string(), toml::Value::Array(deps));
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    /// Advance the lifecycle state.
    ///
    /// Setting the current state again is a no-op. Moving backwards is
    /// rejected; use [`Step::reset`] to rewind.
    pub fn set_state(&mut self, state: StepState) -> Result<()> {
        if state < self.state {
            return Err(PipelineError::InvalidStateAccess(format!(
                "step '{}' cannot move from {} back to {}; reset the step instead",
                self.name, self.state, state
            )));
        }
        self.state = state;
        Ok(())
    }

    /// Store the dataset computed for this step.
    ///
    /// The execution engine may store the dataset before or after marking
    /// the step `Finished`; it only becomes visible through [`Step::data`]
    /// and [`Step::has_data`] once the step is `Finished`.
    pub fn set_data(&mut self, data: DataHandle) -> Result<()> {
        self.ensure_produces_data()?;
        self.data = Some(data);
        Ok(())
    }

    /// The dataset of a finished data-producing step.
    ///
    /// Asking a loop step, or a step that has not finished, is a contract
    /// violation and returns [`PipelineError::InvalidStateAccess`].
    pub fn data(&self) -> Result<&DataHandle> {
        self.ensure_produces_data()?;
        if self.state != StepState::Finished {
            return Err(PipelineError::InvalidStateAccess(format!(
                "dataset of step '{}' requested in state {}",
                self.name, self.state
            )));
        }
        self.data.as_ref().ok_or_else(|| {
            PipelineError::InvalidStateAccess(format!(
                "step '{}' is FINISHED but holds no dataset",
                self.name
            ))
        })
    }

    /// True iff [`Step::data`] would return a dataset: the step is
    /// `Finished` and one was stored.
    pub fn has_data(&self) -> bool {
        self.state == StepState::Finished && self.data.is_some()
    }

    /// Return to `Waiting` and drop any held dataset.
    pub fn reset(&mut self) {
        self.state = StepState::Waiting;
        self.data = None;
    }

    /// A new step with the same name, variant, config and dependencies, in
    /// its initial state.
    pub fn fresh_copy(&self) -> Step {
        Step {
            name: self.name.clone(),
            kind: self.kind,
            config: self.config.clone(),
            dependency_names: self.dependency_names.clone(),
            state: StepState::Waiting,
            data: None,
        }
    }

    fn ensure_produces_data(&self) -> Result<()> {
        if self.produces_data() {
            Ok(())
        } else {
            Err(PipelineError::InvalidStateAccess(format!(
                "{} step '{}' does not hold a dataset",
                self.kind, self.name
            )))
        }
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Step {}

impl Hash for Step {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

/// Read the typed settings out of a step's configuration table.
pub(crate) fn parse_settings(name: &str, config: &StepConfig) -> Result<StepSettings> {
    toml::Value::Table(config.clone())
        .try_into::<StepSettings>()
        .map_err(|e| {
            PipelineError::ConfigError(format!(
                "step '{}' has malformed configuration: {}",
                name, e
            ))
        })
}

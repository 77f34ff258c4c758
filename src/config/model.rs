// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::StepSet;
use crate::types::{StepConfig, StepName, StepType};

/// Key of the top-level table that holds one sub-table per step.
pub const STEPS_KEY: &str = "steps";

/// Key of the per-step dependency list.
pub const DEPENDENCIES_KEY: &str = "dependencies";

/// Key of the per-step dynamic-load settings, and of the document-level
/// table holding their defaults.
pub const LOADER_KEY: &str = "loader";

/// Top-level pipeline document as read from a TOML file.
///
/// ```toml
/// [application]
/// name = "example"
///
/// [loader]
/// type = "file"
///
/// [steps.upstream]
///
/// [steps.parent]
/// dependencies = ["upstream"]
/// loader.path = "sub.toml"
///
/// [steps.downstream]
/// dependencies = ["parent"]
/// ```
///
/// `steps` holds the step definitions and `[loader]` the defaults for their
/// `loader` tables. Every other section is opaque shared settings carried
/// along with the document. A loaded sub-pipeline inherits all of them from
/// the pipeline it is spliced into unless it sets them itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPipelineFile {
    /// All steps from `[steps.<name>]`, keyed by step name.
    #[serde(default)]
    pub steps: BTreeMap<StepName, StepConfig>,
}

/// Typed view over the parts of a `[steps.<name>]` table this crate reads.
///
/// Anything else in the table is variant-specific configuration owned by the
/// execution engine and is left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepSettings {
    /// `"data"` (default) or `"loop"`.
    #[serde(default, rename = "type")]
    pub step_type: StepType,

    /// Names of the steps this step waits for.
    #[serde(default)]
    pub dependencies: Vec<StepName>,

    /// Input settings of a data step.
    #[serde(default)]
    pub input: Option<InputSettings>,

    /// Dynamic-load settings; see [`LoaderSettings`].
    #[serde(default)]
    pub loader: Option<LoaderSettings>,
}

impl StepSettings {
    /// A data step reading through a translator is a streaming step.
    pub fn is_streaming(&self) -> bool {
        self.input
            .as_ref()
            .is_some_and(|input| input.translator.is_some())
    }
}

/// `[steps.<name>.input]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputSettings {
    /// Presence marks the step as streaming.
    #[serde(default)]
    pub translator: Option<toml::Table>,
}

/// `[steps.<name>.loader]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderSettings {
    /// Registered loader type, e.g. `"file"`.
    #[serde(rename = "type")]
    pub loader_type: String,
}

/// A pipeline document together with the steps extracted from it.
#[derive(Debug, Clone)]
pub struct LoadedPipeline {
    pub document: toml::Table,
    pub steps: StepSet,
}

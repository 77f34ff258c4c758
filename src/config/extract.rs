// src/config/extract.rs

use tracing::debug;

use crate::config::fallback::apply_fallback;
use crate::config::model::{LOADER_KEY, RawPipelineFile};
use crate::config::validate::validate_steps;
use crate::dag::step::parse_settings;
use crate::dag::{Step, StepSet};
use crate::errors::{PipelineError, Result};
use crate::types::{StepKind, StepType};

/// Build the step set described by a pipeline document.
///
/// Each `[steps.<name>]` table becomes one configured step:
/// - `type = "loop"` gives a control-only loop step;
/// - otherwise a data step, streaming if `input.translator` is present and
///   batch if not.
///
/// A top-level `[loader]` table holds defaults for every step's `loader`
/// table: keys a step leaves unset are filled in before the step is
/// configured. Steps without a `loader` table are not affected.
///
/// With `validate`, the resulting set is checked with
/// [`validate_steps`]. With `is_load`, the document is a loaded
/// sub-pipeline and dependencies on names outside it are accepted.
pub fn extract_steps(document: &toml::Table, validate: bool, is_load: bool) -> Result<StepSet> {
    let raw = toml::Value::Table(document.clone())
        .try_into::<RawPipelineFile>()
        .map_err(|e| PipelineError::ConfigError(format!("malformed pipeline document: {e}")))?;

    let loader_defaults = document.get(LOADER_KEY).and_then(|v| v.as_table());
    let mut steps = StepSet::new();

    for (name, mut config) in raw.steps {
        if let Some(defaults) = loader_defaults {
            apply_loader_defaults(&mut config, defaults);
        }
        let settings = parse_settings(&name, &config)?;
        let kind = match settings.step_type {
            StepType::Loop => StepKind::Loop,
            StepType::Data if settings.is_streaming() => StepKind::Streaming,
            StepType::Data => StepKind::Batch,
        };

        let mut step = Step::new(name, kind);
        step.configure(config)?;
        steps.insert(step)?;
    }

    debug!(steps = steps.len(), is_load, "extracted steps from document");

    if validate {
        validate_steps(&steps, is_load)?;
    }

    Ok(steps)
}

fn apply_loader_defaults(config: &mut toml::Table, defaults: &toml::Table) {
    if let Some(toml::Value::Table(loader)) = config.get_mut(LOADER_KEY) {
        apply_fallback(loader, defaults, &[]);
    }
}

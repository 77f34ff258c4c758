// src/dag/splice.rs

//! Splicing dynamically loaded sub-pipelines into a step set.
//!
//! A step with a `loader` table stands in for a whole sub-pipeline whose
//! definition is only known at runtime. Merging replaces that parent step
//! with the loaded steps:
//!
//! - loaded roots (no dependency inside the loaded set) additionally depend
//!   on whatever the parent depended on;
//! - base steps that depended on the parent depend on every loaded leaf
//!   (no dependent inside the loaded set) instead;
//! - the parent disappears, every other base step is carried over.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::config::extract::extract_steps;
use crate::config::fallback::apply_fallback;
use crate::config::model::STEPS_KEY;
use crate::config::validate::validate_steps;
use crate::dag::graph::DagGraph;
use crate::dag::step::Step;
use crate::dag::step_set::StepSet;
use crate::errors::{PipelineError, Result};
use crate::loader::LoaderRegistry;
use crate::types::StepName;

/// Upper bound on nested expansion rounds in [`expand_loaded_steps`].
pub const MAX_EXPANSION_ROUNDS: usize = 16;

/// Replace `parent_name` in `base` with the steps of `loaded`.
///
/// Pure graph rewrite: `base` is left untouched and a new set is returned,
/// of size `base.len() - 1 + loaded.len()`.
///
/// Errors:
/// - [`PipelineError::StepNotFound`] if `parent_name` is not in `base`;
/// - [`PipelineError::ConfigError`] if `loaded` is empty or shares a name
///   with any step of `base`.
pub fn splice_loaded_steps(base: &StepSet, parent_name: &str, loaded: StepSet) -> Result<StepSet> {
    let parent = base
        .get(parent_name)
        .ok_or_else(|| PipelineError::StepNotFound(parent_name.to_string()))?;

    if loaded.is_empty() {
        return Err(PipelineError::ConfigError(format!(
            "sub-pipeline loaded for step '{}' contains no steps",
            parent_name
        )));
    }

    if let Some(clash) = loaded.names().find(|name| base.contains(name)) {
        return Err(PipelineError::ConfigError(format!(
            "sub-pipeline loaded for step '{}' redefines existing step '{}'",
            parent_name, clash
        )));
    }

    let graph = DagGraph::from_steps(&loaded);
    let roots: BTreeSet<StepName> = graph
        .steps()
        .filter(|name| graph.dependencies_of(name).is_empty())
        .map(str::to_string)
        .collect();
    let leaves: BTreeSet<StepName> = graph
        .steps()
        .filter(|name| graph.dependents_of(name).is_empty())
        .map(str::to_string)
        .collect();

    debug!(
        parent = %parent_name,
        ?roots,
        ?leaves,
        "splicing sub-pipeline"
    );

    let mut merged = StepSet::new();

    for step in base.iter().filter(|s| s.name() != parent_name) {
        let mut step = step.clone();
        if step.dependency_names().contains(parent_name) {
            rewire_dependent(&mut step, parent_name, &leaves);
        }
        merged.insert(step)?;
    }

    for mut step in loaded {
        if roots.contains(step.name()) && !parent.dependency_names().is_empty() {
            inherit_parent_dependencies(&mut step, parent);
        }
        merged.insert(step)?;
    }

    info!(
        parent = %parent_name,
        steps = merged.len(),
        "merged loaded sub-pipeline in place of parent step"
    );
    Ok(merged)
}

/// Load the sub-pipeline of `parent` and splice it into `base`.
///
/// The loader is picked from `loaders` by the parent's `loader.type`,
/// configured with the parent's `loader` table and asked for its document
/// once. Top-level settings of `base_config` other than `steps` fill in
/// whatever the loaded document leaves unset before its steps are
/// extracted, so a `[loader]` defaults table of the base pipeline also
/// applies to loader steps of the sub-pipeline. The merged set is validated
/// as a whole.
pub fn merge_loaded_steps(
    base: &StepSet,
    parent: &Step,
    base_config: &toml::Table,
    loaders: &LoaderRegistry,
) -> Result<StepSet> {
    let loader_config = parent.loader_config().ok_or_else(|| {
        PipelineError::ConfigError(format!(
            "step '{}' has no `loader` settings to load a sub-pipeline from",
            parent.name()
        ))
    })?;

    let loader = loaders.create(loader_config)?;
    let mut document = loader.config()?;
    apply_fallback(&mut document, base_config, &[STEPS_KEY]);

    let loaded = extract_steps(&document, true, true)?;
    debug!(
        parent = %parent.name(),
        loaded = loaded.len(),
        "extracted loaded sub-pipeline"
    );

    let merged = splice_loaded_steps(base, parent.name(), loaded)?;
    validate_steps(&merged, false)?;
    Ok(merged)
}

/// Expand every step carrying `loader` settings until none remain.
///
/// Each round merges all loader steps present at its start; sub-pipelines
/// may themselves contain loader steps, which the next round picks up.
/// More than [`MAX_EXPANSION_ROUNDS`] rounds is a configuration error.
pub fn expand_loaded_steps(
    steps: StepSet,
    base_config: &toml::Table,
    loaders: &LoaderRegistry,
) -> Result<StepSet> {
    let mut current = steps;

    for round in 0..MAX_EXPANSION_ROUNDS {
        let parents: Vec<StepName> = current
            .iter()
            .filter(|s| s.loader_config().is_some())
            .map(|s| s.name().to_string())
            .collect();

        if parents.is_empty() {
            return Ok(current);
        }

        debug!(round, ?parents, "expanding loader steps");

        for parent_name in parents {
            let parent = current
                .get(&parent_name)
                .ok_or_else(|| PipelineError::StepNotFound(parent_name.clone()))?;
            current = merge_loaded_steps(&current, parent, base_config, loaders)?;
        }
    }

    Err(PipelineError::ConfigError(format!(
        "loader steps still present after {} expansion rounds",
        MAX_EXPANSION_ROUNDS
    )))
}

fn rewire_dependent(step: &mut Step, parent_name: &str, leaves: &BTreeSet<StepName>) {
    let deps: Vec<StepName> = step
        .dependency_names()
        .iter()
        .filter(|dep| dep.as_str() != parent_name)
        .chain(leaves.iter())
        .cloned()
        .collect();

    debug!(step = %step.name(), ?deps, "dependent rewired to sub-pipeline leaves");
    step.set_dependency_names(deps);
}

fn inherit_parent_dependencies(step: &mut Step, parent: &Step) {
    let deps: Vec<StepName> = step
        .dependency_names()
        .iter()
        .chain(parent.dependency_names())
        .cloned()
        .collect();

    debug!(step = %step.name(), ?deps, "sub-pipeline root inherits parent dependencies");
    step.set_dependency_names(deps);
}

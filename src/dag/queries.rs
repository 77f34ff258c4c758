// src/dag/queries.rs

//! Pure queries over a [`StepSet`].
//!
//! None of these mutate their input except [`reset_steps`]. Results that
//! are subsets of the input are returned in name order.

use tracing::{debug, warn};

use crate::dag::graph::DagGraph;
use crate::dag::step::Step;
use crate::dag::step_set::StepSet;
use crate::errors::Result;
use crate::types::StepState;

/// The steps of `steps` that `step` names as dependencies.
///
/// Declared names with no matching step are ignored.
pub fn dependencies<'a>(step: &Step, steps: &'a StepSet) -> Vec<&'a Step> {
    step.dependency_names()
        .iter()
        .filter_map(|name| steps.get(name))
        .collect()
}

/// Every step that names `step` as a dependency.
pub fn immediate_dependents<'a>(step: &Step, steps: &'a StepSet) -> Vec<&'a Step> {
    steps
        .iter()
        .filter(|candidate| candidate.dependency_names().contains(step.name()))
        .collect()
}

/// Transitive closure of [`immediate_dependents`].
///
/// Fails with [`PipelineError::DagCycle`](crate::errors::PipelineError::DagCycle)
/// if `step` turns out to depend on itself.
pub fn all_dependents<'a>(step: &Step, steps: &'a StepSet) -> Result<Vec<&'a Step>> {
    let graph = DagGraph::from_steps(steps);
    let names = graph.transitive_dependents(step.name())?;
    Ok(names.iter().filter_map(|name| steps.get(name)).collect())
}

/// Transitive closure of [`dependencies`].
pub fn all_dependencies<'a>(step: &Step, steps: &'a StepSet) -> Result<Vec<&'a Step>> {
    let graph = DagGraph::from_steps(steps);
    let names = graph.transitive_dependencies(step.name())?;
    Ok(names.iter().filter_map(|name| steps.get(name)).collect())
}

/// Non-streaming steps with no direct or transitive dependency on a
/// streaming step.
///
/// This is the part of the pipeline that can run once, ahead of any
/// streaming micro-batch loop.
pub fn independent_non_streaming_steps(steps: &StepSet) -> Result<Vec<&Step>> {
    let graph = DagGraph::from_steps(steps);
    let mut independent = Vec::new();

    for step in steps.iter().filter(|s| !s.is_streaming()) {
        let upstream = graph.transitive_dependencies(step.name())?;
        let touches_streaming = upstream
            .iter()
            .filter_map(|name| steps.get(name))
            .any(|dep| dep.is_streaming());

        if touches_streaming {
            debug!(step = %step.name(), "step depends on streaming data");
        } else {
            independent.push(step);
        }
    }

    Ok(independent)
}

pub fn has_streaming_step(steps: &StepSet) -> bool {
    steps.iter().any(|s| s.is_streaming())
}

pub fn streaming_steps(steps: &StepSet) -> Vec<&Step> {
    steps.iter().filter(|s| s.is_streaming()).collect()
}

/// Steps that produce a dataset (batch and streaming), excluding
/// control-only steps.
pub fn data_steps(steps: &StepSet) -> Vec<&Step> {
    steps.iter().filter(|s| s.produces_data()).collect()
}

pub fn step_for_name<'a>(name: &str, steps: &'a StepSet) -> Option<&'a Step> {
    steps.get(name)
}

/// True iff every step is at least `Submitted`.
pub fn all_steps_submitted(steps: &StepSet) -> bool {
    steps.iter().all(|s| s.state() >= StepState::Submitted)
}

/// True iff every step is `Finished`.
pub fn all_steps_finished(steps: &StepSet) -> bool {
    steps.iter().all(|s| s.state() == StepState::Finished)
}

/// `Waiting` steps whose dependencies are all present and `Finished`.
pub fn ready_steps(steps: &StepSet) -> Vec<&Step> {
    steps
        .iter()
        .filter(|step| step.state() == StepState::Waiting)
        .filter(|step| {
            step.dependency_names().iter().all(|dep_name| match steps.get(dep_name) {
                Some(dep) => dep.state() == StepState::Finished,
                None => {
                    warn!(
                        step = %step.name(),
                        dep = %dep_name,
                        "dependency missing from step set"
                    );
                    false
                }
            })
        })
        .collect()
}

/// Comma-separated step names, e.g. `"step1, step2, step3"`.
pub fn step_names_as_string(steps: &StepSet) -> String {
    steps.names().collect::<Vec<_>>().join(", ")
}

/// Fresh, independent steps with the same names, variants, configs and
/// dependencies, all `Waiting` with no dataset.
pub fn copy_steps(steps: &StepSet) -> StepSet {
    steps.fresh_copy()
}

/// Rewind every step to `Waiting` and drop any dataset.
pub fn reset_steps(steps: &mut StepSet) {
    for step in steps.iter_mut() {
        step.reset();
    }
    debug!(steps = steps.len(), "reset steps to WAITING");
}

// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::StepSet;
use crate::errors::{PipelineError, Result};

/// Run basic semantic validation against a step set.
///
/// This checks:
/// - no step depends on itself
/// - all dependencies refer to steps in the set, unless `allow_external`
///   (a loaded sub-pipeline may name steps of the pipeline it is spliced into)
/// - the step graph has no cycles
pub fn validate_steps(steps: &StepSet, allow_external: bool) -> Result<()> {
    validate_step_dependencies(steps, allow_external)?;
    validate_dag(steps)?;
    Ok(())
}

fn validate_step_dependencies(steps: &StepSet, allow_external: bool) -> Result<()> {
    for step in steps.iter() {
        for dep in step.dependency_names() {
            if dep == step.name() {
                return Err(PipelineError::ConfigError(format!(
                    "step '{}' cannot depend on itself in `dependencies`",
                    step.name()
                )));
            }
            if !allow_external && !steps.contains(dep) {
                return Err(PipelineError::ConfigError(format!(
                    "step '{}' has unknown dependency '{}' in `dependencies`",
                    step.name(),
                    dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(steps: &StepSet) -> Result<()> {
    // Edge direction: dep -> step.
    // For:
    //   [steps.B]
    //   dependencies = ["A"]
    // we add edge A -> B. External names become extra nodes, which cannot
    // close a cycle since nothing in the set points back out of them.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in steps.names() {
        graph.add_node(name);
    }

    for step in steps.iter() {
        for dep in step.dependency_names() {
            graph.add_edge(dep.as_str(), step.name(), ());
        }
    }

    // A topological sort will fail if there is a cycle.
    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(PipelineError::DagCycle(format!(
                "cycle detected in step DAG involving step '{}'",
                node
            )))
        }
    }
}

// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::dag::step_set::StepSet;
use crate::errors::{PipelineError, Result};
use crate::types::StepName;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DagNode {
    /// Direct dependencies that exist in the step set.
    deps: Vec<StepName>,
    /// Direct dependents: steps that name this one as a dependency.
    dependents: Vec<StepName>,
}

/// Adjacency index over a [`StepSet`], keyed by step name.
///
/// Dependency names that do not resolve to a step in the set are dropped;
/// the queries built on top of this index only ever return members of the
/// set. The index is a snapshot: rebuild it after rewiring steps.
#[derive(Debug, Clone)]
pub struct DagGraph {
    nodes: HashMap<StepName, DagNode>,
}

impl DagGraph {
    pub fn from_steps(steps: &StepSet) -> Self {
        let mut nodes: HashMap<StepName, DagNode> = steps
            .names()
            .map(|name| (name.to_string(), DagNode::default()))
            .collect();

        for step in steps.iter() {
            for dep in step.dependency_names() {
                if !nodes.contains_key(dep) {
                    continue;
                }
                if let Some(node) = nodes.get_mut(step.name()) {
                    node.deps.push(dep.clone());
                }
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(step.name().to_string());
                }
            }
        }

        Self { nodes }
    }

    /// Return all step names.
    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    /// Immediate dependencies of a step.
    pub fn dependencies_of(&self, name: &str) -> &[StepName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a step.
    pub fn dependents_of(&self, name: &str) -> &[StepName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Every step reachable from `root` by following "is depended upon by"
    /// edges. `root` itself is never part of the result; reaching it again is
    /// a cycle.
    pub fn transitive_dependents(&self, root: &str) -> Result<BTreeSet<StepName>> {
        self.closure(root, |name| self.dependents_of(name))
    }

    /// Every step `root` waits on, directly or transitively.
    pub fn transitive_dependencies(&self, root: &str) -> Result<BTreeSet<StepName>> {
        self.closure(root, |name| self.dependencies_of(name))
    }

    fn closure<'a, F>(&'a self, root: &str, next: F) -> Result<BTreeSet<StepName>>
    where
        F: Fn(&str) -> &'a [StepName],
    {
        let mut stack: Vec<&StepName> = next(root).iter().collect();
        let mut visited: BTreeSet<StepName> = BTreeSet::new();

        while let Some(name) = stack.pop() {
            if name == root {
                return Err(PipelineError::DagCycle(format!(
                    "step '{}' transitively depends on itself",
                    root
                )));
            }
            if !visited.insert(name.clone()) {
                continue;
            }
            stack.extend(next(name.as_str()));
        }

        debug!(step = %root, reached = visited.len(), "computed closure");
        Ok(visited)
    }
}

// src/dag/step_set.rs

use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::dag::step::Step;
use crate::errors::{PipelineError, Result};
use crate::types::StepName;

/// A set of steps keyed by name.
///
/// The name is the primary key: a set never holds two steps with the same
/// name, and iteration is in name order.
#[derive(Debug, Clone, Default)]
pub struct StepSet {
    steps: BTreeMap<StepName, Step>,
}

impl StepSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step. A step with the same name already in the set is a
    /// configuration error; nothing is overwritten.
    pub fn insert(&mut self, step: Step) -> Result<()> {
        match self.steps.entry(step.name().to_string()) {
            btree_map::Entry::Occupied(entry) => Err(PipelineError::ConfigError(format!(
                "duplicate step name '{}'",
                entry.key()
            ))),
            btree_map::Entry::Vacant(entry) => {
                entry.insert(step);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Step> {
        self.steps.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Step> {
        self.steps.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Step> {
        self.steps.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.steps.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Steps in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.steps.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Step> {
        self.steps.values_mut()
    }

    /// Step names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(|s| s.as_str())
    }

    /// A set with a [`Step::fresh_copy`] of every step, under the same keys.
    pub fn fresh_copy(&self) -> StepSet {
        StepSet {
            steps: self
                .steps
                .iter()
                .map(|(name, step)| (name.clone(), step.fresh_copy()))
                .collect(),
        }
    }
}

impl TryFrom<Vec<Step>> for StepSet {
    type Error = PipelineError;

    fn try_from(steps: Vec<Step>) -> std::result::Result<Self, Self::Error> {
        let mut set = StepSet::new();
        for step in steps {
            set.insert(step)?;
        }
        Ok(set)
    }
}

impl IntoIterator for StepSet {
    type Item = Step;
    type IntoIter = btree_map::IntoValues<StepName, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_values()
    }
}

impl<'a> IntoIterator for &'a StepSet {
    type Item = &'a Step;
    type IntoIter = btree_map::Values<'a, StepName, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.values()
    }
}

#![allow(dead_code)]

use std::collections::BTreeSet;

use pipedag::dag::Step;

pub use pipedag_test_utils::builders::{StepBuilder, StepSetBuilder};
pub use pipedag_test_utils::{init_tracing, toml_doc};

/// Names of the given steps as a set.
pub fn names(steps: &[&Step]) -> BTreeSet<String> {
    steps.iter().map(|s| s.name().to_string()).collect()
}

/// Build a name set from string literals.
pub fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

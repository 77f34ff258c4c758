// src/dag/mod.rs

//! Step graph representation and queries.
//!
//! - [`step`] holds the step entity and its lifecycle state machine.
//! - [`step_set`] is the name-keyed set of steps every query works on.
//! - [`graph`] provides an adjacency index for closure computations.
//! - [`queries`] contains the dependency graph engine.
//! - [`splice`] merges dynamically loaded sub-pipelines into a step set.

pub mod graph;
pub mod queries;
pub mod splice;
pub mod step;
pub mod step_set;

pub use graph::DagGraph;
pub use splice::{expand_loaded_steps, merge_loaded_steps, splice_loaded_steps};
pub use step::{DataHandle, Step};
pub use step_set::StepSet;

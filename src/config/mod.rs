// src/config/mod.rs

//! Pipeline configuration for pipedag.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Turn a pipeline document into a [`StepSet`](crate::dag::StepSet)
//!   (`extract.rs`).
//! - Validate basic invariants like DAG correctness (`validate.rs`).
//! - Layer shared settings under a document (`fallback.rs`).
//! - Load a pipeline document from disk (`loader.rs`).

pub mod extract;
pub mod fallback;
pub mod loader;
pub mod model;
pub mod validate;

pub use extract::extract_steps;
pub use fallback::apply_fallback;
pub use loader::{load_and_validate, load_from_path};
pub use model::{LoadedPipeline, RawPipelineFile, StepSettings};
pub use validate::validate_steps;

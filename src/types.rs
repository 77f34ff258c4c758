// src/types.rs

use std::fmt;

use serde::Deserialize;

/// Canonical step name type used throughout the crate.
pub type StepName = String;

/// Opaque per-step configuration document.
pub type StepConfig = toml::Table;

/// Lifecycle state of a step.
///
/// States are ordered: `Waiting < Submitted < Finished`. A step only moves
/// forward through them; the only way back to `Waiting` is an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StepState {
    /// Not yet handed to the execution engine.
    Waiting,
    /// Handed to the execution engine, result not yet available.
    Submitted,
    /// Execution finished; data-producing steps hold their dataset.
    Finished,
}

impl fmt::Display for StepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepState::Waiting => "WAITING",
            StepState::Submitted => "SUBMITTED",
            StepState::Finished => "FINISHED",
        };
        f.write_str(s)
    }
}

/// Variant of a step.
///
/// - `Batch`: bounded data source, holds a dataset once finished.
/// - `Streaming`: continuously arriving (micro-batch) data, holds a dataset
///   once finished.
/// - `Loop`: control-only construct; never holds a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Batch,
    Streaming,
    Loop,
}

impl StepKind {
    pub fn produces_data(self) -> bool {
        matches!(self, StepKind::Batch | StepKind::Streaming)
    }

    pub fn is_streaming(self) -> bool {
        matches!(self, StepKind::Streaming)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StepKind::Batch => "batch",
            StepKind::Streaming => "streaming",
            StepKind::Loop => "loop",
        };
        f.write_str(s)
    }
}

/// The `type = "..."` tag of a `[steps.<name>]` table.
///
/// Data steps are further split into batch and streaming by the presence of
/// `input.translator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    Data,
    Loop,
}

impl Default for StepType {
    fn default() -> Self {
        StepType::Data
    }
}

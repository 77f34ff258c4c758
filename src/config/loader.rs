// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::extract::extract_steps;
use crate::config::model::LoadedPipeline;
use crate::errors::Result;

/// Load a pipeline document from a given path.
///
/// This only performs TOML deserialization; it does **not** extract or
/// validate steps. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<toml::Table> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let document: toml::Table = toml::from_str(&contents)?;

    Ok(document)
}

/// Load a pipeline document from path, extract its steps and validate them.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Builds one step per `[steps.<name>]` table.
/// - Checks for:
///   - malformed step settings,
///   - unknown or self `dependencies` references,
///   - DAG cycles.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LoadedPipeline> {
    let document = load_from_path(&path)?;
    let steps = extract_steps(&document, true, false)?;
    Ok(LoadedPipeline { document, steps })
}

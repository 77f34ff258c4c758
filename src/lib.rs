// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod fs;
pub mod loader;
pub mod logging;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::load_and_validate;
use crate::dag::{StepSet, expand_loaded_steps, queries};
use crate::fs::RealFileSystem;
use crate::loader::LoaderRegistry;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - pipeline loading and validation
/// - (optional) expansion of loader steps into their sub-pipelines, with
///   relative sub-pipeline paths resolved against the pipeline file's
///   directory
/// - the step graph report printed to stdout
///
/// Nothing is executed; the report shows what a driver would see.
pub fn run(args: CliArgs) -> Result<()> {
    let pipeline = load_and_validate(&args.config)?;
    info!(
        config = %args.config,
        steps = pipeline.steps.len(),
        "pipeline loaded"
    );

    let steps = if args.expand {
        let root_dir = config_root_dir(Path::new(&args.config));
        let loaders = LoaderRegistry::with_file_system(Arc::new(RealFileSystem), root_dir);
        expand_loaded_steps(pipeline.steps, &pipeline.document, &loaders)?
    } else {
        pipeline.steps
    };

    print_report(&steps)?;
    Ok(())
}

/// Directory containing the pipeline file; sub-pipeline paths are relative
/// to it.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Print steps, their dependencies and the main graph queries.
fn print_report(steps: &StepSet) -> Result<()> {
    println!("pipedag report");
    println!();

    println!("steps ({}):", steps.len());
    for step in steps.iter() {
        println!("  - {} ({})", step.name(), step.kind());
        if !step.dependency_names().is_empty() {
            println!("      dependencies: {:?}", step.dependency_names());
        }
        if step.loader_config().is_some() {
            println!("      loads sub-pipeline: true");
        }
    }
    println!();

    let streaming = queries::streaming_steps(steps);
    println!("streaming steps: {}", names_of(&streaming));

    let independent = queries::independent_non_streaming_steps(steps)?;
    println!("independent non-streaming steps: {}", names_of(&independent));

    let ready = queries::ready_steps(steps);
    println!("initially ready steps: {}", names_of(&ready));

    debug!("report complete (no execution)");
    Ok(())
}

fn names_of(steps: &[&dag::Step]) -> String {
    if steps.is_empty() {
        return "(none)".to_string();
    }
    steps
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(", ")
}

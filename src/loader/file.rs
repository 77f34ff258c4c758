// src/loader/file.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::loader::ConfigLoader;
use crate::types::StepConfig;

/// Loads a sub-pipeline document from a TOML file.
///
/// Relative paths are resolved against the loader's root directory, which is
/// normally the directory of the top-level pipeline file. Absolute paths are
/// used as given.
///
/// ```toml
/// [steps.parent.loader]
/// type = "file"
/// path = "pipelines/sub.toml"
/// ```
#[derive(Debug)]
pub struct FileConfigLoader {
    fs: Arc<dyn FileSystem>,
    root_dir: PathBuf,
    path: Option<PathBuf>,
}

impl FileConfigLoader {
    pub const TYPE: &'static str = "file";

    pub fn new(fs: Arc<dyn FileSystem>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root_dir: root_dir.into(),
            path: None,
        }
    }
}

impl ConfigLoader for FileConfigLoader {
    fn configure(&mut self, config: &StepConfig) -> Result<()> {
        let path = config
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                PipelineError::ConfigError(
                    "file loader requires a string `path` setting".to_string(),
                )
            })?;
        self.path = Some(self.root_dir.join(path));
        Ok(())
    }

    fn config(&self) -> Result<toml::Table> {
        let path = self.path.as_ref().ok_or_else(|| {
            PipelineError::ConfigError("file loader used before being configured".to_string())
        })?;

        if !self.fs.exists(path) {
            return Err(PipelineError::ConfigError(format!(
                "sub-pipeline file {:?} does not exist",
                path
            )));
        }
        if !self.fs.is_file(path) {
            return Err(PipelineError::ConfigError(format!(
                "sub-pipeline path {:?} is not a file",
                path
            )));
        }

        let contents = self.fs.read_to_string(path)?;
        let document: toml::Table = toml::from_str(&contents)?;
        debug!(path = ?path, "loaded sub-pipeline document");
        Ok(document)
    }
}

// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::{PipedagError, Result};

/// Load a project file from a given path and return the raw `RawProjectFile`.
///
/// This only performs TOML deserialization; it does **not** perform any
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| PipedagError::ReadConfig {
        path: path.to_path_buf(),
        source,
    })?;

    load_from_str(&contents)
}

/// Parse project TOML held in memory.
pub fn load_from_str(contents: &str) -> Result<RawProjectFile> {
    let project: RawProjectFile = toml::from_str(contents)?;
    Ok(project)
}

/// Load a project file from path and run the shape checks.
///
/// Preset resolution and graph validation are left to the orchestrator,
/// which runs them before any task starts.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let raw = load_from_path(&path)?;
    ProjectFile::try_from(raw)
}

/// Default project file: `pipedag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("pipedag.toml")
}

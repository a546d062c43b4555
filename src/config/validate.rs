// src/config/validate.rs

use tracing::warn;

use crate::config::model::{ProjectFile, RawProjectFile};
use crate::errors::{ConfigError, PipedagError, Result};
use crate::query::is_identifier;

impl TryFrom<RawProjectFile> for ProjectFile {
    type Error = PipedagError;

    fn try_from(raw: RawProjectFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_project(&raw)?;
        Ok(ProjectFile::new_unchecked(raw.presets, raw.group))
    }
}

/// Shape checks that do not need preset resolution.
///
/// Semantic checks (preset references, duplicate tasks, parents, cycles)
/// happen when the orchestrator resolves the project, so that they are
/// reported in the same way whether the project came from a file or was
/// built in code.
fn validate_raw_project(cfg: &RawProjectFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    warn_unselectable_names(cfg);
    Ok(())
}

fn ensure_has_tasks(cfg: &RawProjectFile) -> Result<()> {
    if cfg.group.values().all(|g| g.task.is_empty()) {
        return Err(ConfigError::NoTasks.into());
    }
    Ok(())
}

/// Names outside the selector grammar still run, they just cannot be named
/// in `--tasks` / `--exclude`.
fn warn_unselectable_names(cfg: &RawProjectFile) {
    for (group, g) in &cfg.group {
        if !is_identifier(group) {
            warn!(group = %group, "group name cannot be used in a `group:` selector");
        }
        for task in g.task.keys() {
            if !is_identifier(task) {
                warn!(task = %task, group = %group, "task name cannot be used in a task selector");
            }
        }
    }
}

// src/errors.rs

//! Crate-wide error types.
//!
//! The taxonomy follows the points at which a run can go wrong:
//!
//! - [`ConfigError`]: presets and task descriptors could not be resolved.
//! - [`GraphError`]: the task graph is incomplete or cyclic.
//! - [`QueryError`]: a task-selection string is malformed or names nothing.
//! - [`TaskError`]: a single task failed inside its runner.
//!
//! The first three are fail-fast and abort a run before any task executes.
//! `TaskError`s are collected in the run report and never abort the loop.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::query::SelectorKind;
use crate::types::{Stage, TaskName};

/// Coarse category of an error, for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Graph,
    Query,
    Task,
    Io,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("project must contain at least one [group.<name>.task.<name>] section")]
    NoTasks,

    #[error("task '{task}' in group '{group}' references undefined preset '{preset}'")]
    MissingTaskPreset {
        task: TaskName,
        group: String,
        preset: String,
    },

    #[error("preset '{referrer}' references undefined preset '{preset}'")]
    MissingPreset { referrer: String, preset: String },

    #[error("cyclic preset reference: {}", .path.join(" -> "))]
    PresetCycle { path: Vec<String> },

    #[error("task '{task}' is declared in both group '{first_group}' and group '{second_group}'")]
    DuplicateTask {
        task: TaskName,
        first_group: String,
        second_group: String,
    },

    #[error("task '{task}' has no `type` (set it on the task or on a preset)")]
    MissingTaskType { task: TaskName },

    #[error("task '{task}' has unknown type '{task_type}'")]
    UnknownTaskType { task: TaskName, task_type: String },

    #[error("task '{task}': property `{property}` must be {expected}")]
    InvalidProperty {
        task: TaskName,
        property: String,
        expected: &'static str,
    },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::NoTasks => "config.no_tasks",
            ConfigError::MissingTaskPreset { .. } => "config.missing_preset",
            ConfigError::MissingPreset { .. } => "config.missing_preset",
            ConfigError::PresetCycle { .. } => "config.preset_cycle",
            ConfigError::DuplicateTask { .. } => "config.duplicate_task",
            ConfigError::MissingTaskType { .. } => "config.missing_type",
            ConfigError::UnknownTaskType { .. } => "config.unknown_type",
            ConfigError::InvalidProperty { .. } => "config.invalid_property",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Per offending task, the parent names that are not tasks themselves.
    #[error("tasks reference undefined parents: {}", format_missing(.missing))]
    MissingParents {
        missing: BTreeMap<TaskName, Vec<TaskName>>,
    },

    /// `path` starts and ends at the same node.
    #[error("cycle detected in task DAG: {}", .path.join(" -> "))]
    Cycle { path: Vec<TaskName> },
}

impl GraphError {
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::MissingParents { .. } => "graph.missing_parents",
            GraphError::Cycle { .. } => "graph.cycle",
        }
    }
}

fn format_missing(missing: &BTreeMap<TaskName, Vec<TaskName>>) -> String {
    missing
        .iter()
        .map(|(task, parents)| format!("{task} -> [{}]", parents.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid task selector '{selector}'")]
    Syntax { selector: String },

    #[error("undefined {kind} '{name}' in task query")]
    Undefined { kind: SelectorKind, name: String },

    #[error("selectors appear in both include and exclude: {}", .selectors.join(", "))]
    Overlap { selectors: Vec<String> },
}

impl QueryError {
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Syntax { .. } => "query.syntax",
            QueryError::Undefined { .. } => "query.undefined",
            QueryError::Overlap { .. } => "query.overlap",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("task '{task}' failed during {stage}: {message}")]
    Failed {
        task: TaskName,
        stage: Stage,
        message: String,
    },

    #[error("task '{task}' panicked during {stage}: {payload}")]
    Panicked {
        task: TaskName,
        stage: Stage,
        payload: String,
    },
}

impl TaskError {
    pub fn task(&self) -> &str {
        match self {
            TaskError::Failed { task, .. } | TaskError::Panicked { task, .. } => task,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            TaskError::Failed { stage, .. } | TaskError::Panicked { stage, .. } => *stage,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TaskError::Failed { .. } => "task.failed",
            TaskError::Panicked { .. } => "task.panicked",
        }
    }
}

#[derive(Error, Debug)]
pub enum PipedagError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("reading config file {path:?}: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipedagError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipedagError::Config(_) | PipedagError::TomlError(_) => ErrorKind::Config,
            PipedagError::Graph(_) => ErrorKind::Graph,
            PipedagError::Query(_) => ErrorKind::Query,
            PipedagError::Task(_) => ErrorKind::Task,
            PipedagError::ReadConfig { .. } | PipedagError::IoError(_) => ErrorKind::Io,
            PipedagError::Other(_) => ErrorKind::Other,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PipedagError::Config(e) => e.code(),
            PipedagError::Graph(e) => e.code(),
            PipedagError::Query(e) => e.code(),
            PipedagError::Task(e) => e.code(),
            PipedagError::ReadConfig { .. } => "io.read_config",
            PipedagError::IoError(_) => "io.error",
            PipedagError::TomlError(_) => "config.toml",
            PipedagError::Other(_) => "other",
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, PipedagError>;

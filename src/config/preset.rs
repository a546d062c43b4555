// src/config/preset.rs

//! Preset resolution and task descriptor construction.
//!
//! Presets live in two namespaces: the global one (`[presets.<name>]`) and
//! one per group (`[group.<g>.presets.<name>]`). A reference made from inside
//! a group looks in that group first and falls back to the global namespace;
//! a reference made by a global preset only sees global presets.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use toml::{Table, Value};
use tracing::debug;

use crate::config::model::{PRESET_KEY, ProjectFile};
use crate::config::overlay::{Overlay, OverlayError, merge_tables, resolve_overlays};
use crate::errors::ConfigError;
use crate::task::{TaskDescriptor, TaskSet};

/// Namespaced preset name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PresetKey {
    Global(String),
    Group { group: String, name: String },
}

impl PresetKey {
    pub fn global(name: impl Into<String>) -> Self {
        PresetKey::Global(name.into())
    }

    pub fn group(group: impl Into<String>, name: impl Into<String>) -> Self {
        PresetKey::Group {
            group: group.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for PresetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetKey::Global(name) => write!(f, "global:{name}"),
            PresetKey::Group { group, name } => write!(f, "{group}:{name}"),
        }
    }
}

/// Resolve every preset in the project to its fully inherited property table.
///
/// The returned tables no longer contain the `preset` reference key.
///
/// # Errors
/// - [`ConfigError::MissingPreset`] for a dangling `preset = "..."` reference.
/// - [`ConfigError::PresetCycle`] if presets inherit from each other in a loop.
/// - [`ConfigError::InvalidProperty`] if a `preset` value is not a string.
pub fn resolve_presets(project: &ProjectFile) -> Result<BTreeMap<PresetKey, Table>, ConfigError> {
    let mut overlays = Vec::new();

    for (name, table) in &project.presets {
        let key = PresetKey::global(name);
        let (parent, properties) = split_preset_ref(&key.to_string(), table)?;
        let parent = parent.map(PresetKey::global);
        overlays.push(Overlay {
            key,
            parent,
            properties,
        });
    }

    for (group, cfg) in &project.group {
        for (name, table) in &cfg.presets {
            let key = PresetKey::group(group, name);
            let (parent, properties) = split_preset_ref(&key.to_string(), table)?;
            // A group preset named after the preset it extends means the global one.
            let parent = parent.map(|p| {
                if p == *name {
                    PresetKey::global(p)
                } else {
                    lookup_in_group(project, group, &p)
                }
            });
            overlays.push(Overlay {
                key,
                parent,
                properties,
            });
        }
    }

    let resolved = resolve_overlays(overlays).map_err(|err| match err {
        OverlayError::MissingParent { key, parent } => ConfigError::MissingPreset {
            referrer: key.to_string(),
            preset: parent.to_string(),
        },
        OverlayError::Cycle { path } => ConfigError::PresetCycle {
            path: path.iter().map(ToString::to_string).collect(),
        },
    })?;

    debug!(presets = resolved.len(), "resolved presets");
    Ok(resolved)
}

/// Resolve presets, merge them into every task and build the descriptors.
///
/// Tasks come out grouped by group name, then by task name; this is the
/// insertion order the graph uses for tie-breaking.
///
/// # Errors
/// Everything [`resolve_presets`] reports, plus:
/// - [`ConfigError::NoTasks`] for a project without tasks.
/// - [`ConfigError::MissingTaskPreset`] if a task names an undefined preset.
/// - [`ConfigError::DuplicateTask`] if two groups declare the same task name.
/// - [`ConfigError::MissingTaskType`] / [`ConfigError::InvalidProperty`] for
///   malformed merged properties.
pub fn resolve_tasks(project: &ProjectFile) -> Result<TaskSet, ConfigError> {
    if project.task_count() == 0 {
        return Err(ConfigError::NoTasks);
    }

    let presets = resolve_presets(project)?;

    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut descriptors = Vec::with_capacity(project.task_count());

    for (group, cfg) in &project.group {
        for (name, table) in &cfg.task {
            if let Some(first_group) = seen.insert(name.as_str(), group.as_str()) {
                return Err(ConfigError::DuplicateTask {
                    task: name.clone(),
                    first_group: first_group.to_string(),
                    second_group: group.clone(),
                });
            }

            let (preset, own) = split_preset_ref(name, table)?;

            let merged = match preset {
                Some(preset_name) => {
                    let key = lookup_in_group(project, group, &preset_name);
                    let base = presets.get(&key).ok_or_else(|| ConfigError::MissingTaskPreset {
                        task: name.clone(),
                        group: group.clone(),
                        preset: preset_name.clone(),
                    })?;
                    merge_tables(base, &own)
                }
                None => own,
            };

            descriptors.push(TaskDescriptor::from_properties(name, group, merged)?);
        }
    }

    Ok(TaskSet::new(descriptors))
}

/// Pick the namespace a reference made from `group` resolves to.
///
/// The group's own preset wins; otherwise the reference is taken to be global,
/// and a missing global preset surfaces later as a dangling reference.
fn lookup_in_group(project: &ProjectFile, group: &str, name: &str) -> PresetKey {
    let in_group = project
        .group
        .get(group)
        .is_some_and(|g| g.presets.contains_key(name));

    if in_group {
        PresetKey::group(group, name)
    } else {
        PresetKey::global(name)
    }
}

/// Separate the `preset` reference from the rest of a property table.
fn split_preset_ref(owner: &str, table: &Table) -> Result<(Option<String>, Table), ConfigError> {
    let mut properties = table.clone();
    let parent = match properties.remove(PRESET_KEY) {
        None => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            return Err(ConfigError::InvalidProperty {
                task: owner.to_string(),
                property: PRESET_KEY.to_string(),
                expected: "a string",
            });
        }
    };
    Ok((parent, properties))
}

// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;
use toml::Table;

/// Top-level project file as read from TOML.
///
/// ```toml
/// [presets.base]
/// type = "command"
/// tags = ["nightly"]
///
/// [group.extract.presets.fast]
/// preset = "base"
/// on_fail = "no_skip"
///
/// [group.extract.task.load_users]
/// preset = "fast"
/// cmd = "echo users"
/// parents = ["bootstrap"]
/// ```
///
/// Preset and task bodies are kept as raw TOML tables: which keys are
/// meaningful depends on the task type, and merging works on the tables
/// themselves.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProjectFile {
    /// Global presets from `[presets.<name>]`.
    #[serde(default)]
    pub presets: BTreeMap<String, Table>,

    /// Task groups from `[group.<name>]`.
    #[serde(default)]
    pub group: BTreeMap<String, GroupConfig>,
}

/// `[group.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupConfig {
    /// Presets visible only to this group, from `[group.<g>.presets.<name>]`.
    #[serde(default)]
    pub presets: BTreeMap<String, Table>,

    /// Tasks from `[group.<g>.task.<name>]`.
    #[serde(default)]
    pub task: BTreeMap<String, Table>,
}

/// A project file that passed [`crate::config::validate`].
///
/// Construct via `ProjectFile::try_from(raw)`; the fields mirror
/// [`RawProjectFile`].
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub presets: BTreeMap<String, Table>,
    pub group: BTreeMap<String, GroupConfig>,
}

impl ProjectFile {
    pub(crate) fn new_unchecked(
        presets: BTreeMap<String, Table>,
        group: BTreeMap<String, GroupConfig>,
    ) -> Self {
        Self { presets, group }
    }

    /// Number of declared tasks across all groups.
    pub fn task_count(&self) -> usize {
        self.group.values().map(|g| g.task.len()).sum()
    }
}

/// Property key naming a task's preset, and a preset's parent preset.
pub const PRESET_KEY: &str = "preset";

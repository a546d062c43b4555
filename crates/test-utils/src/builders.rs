#![allow(dead_code)]

use pipedag::config::{GroupConfig, ProjectFile, RawProjectFile};
use pipedag::errors::Result;
use pipedag::task::{TaskDescriptor, TaskSet};
use pipedag::types::OnFailPolicy;
use toml::{Table, Value};

use crate::fake_runner::FakeRunner;

/// Parse an inline TOML snippet into a table.
pub fn table(src: &str) -> Table {
    toml::from_str(src).expect("test TOML snippet must parse")
}

/// Builder for `ProjectFile` to simplify test setup.
pub struct ProjectBuilder {
    project: RawProjectFile,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            project: RawProjectFile::default(),
        }
    }

    /// Global preset `[presets.<name>]`.
    pub fn preset(mut self, name: &str, body: &str) -> Self {
        self.project.presets.insert(name.to_string(), table(body));
        self
    }

    /// Group preset `[group.<group>.presets.<name>]`.
    pub fn group_preset(mut self, group: &str, name: &str, body: &str) -> Self {
        self.group_mut(group)
            .presets
            .insert(name.to_string(), table(body));
        self
    }

    /// Task `[group.<group>.task.<name>]`.
    pub fn task(mut self, group: &str, name: &str, body: &str) -> Self {
        self.group_mut(group).task.insert(name.to_string(), table(body));
        self
    }

    pub fn try_build(self) -> Result<ProjectFile> {
        ProjectFile::try_from(self.project)
    }

    pub fn build(self) -> ProjectFile {
        self.try_build()
            .expect("Failed to build valid project from builder")
    }

    fn group_mut(&mut self, group: &str) -> &mut GroupConfig {
        self.project.group.entry(group.to_string()).or_default()
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for an already-merged `TaskDescriptor`.
///
/// Defaults: group `default`, type [`FakeRunner::TYPE`].
pub struct TaskBuilder {
    task: TaskDescriptor,
}

impl TaskBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskDescriptor::new(name, "default", FakeRunner::TYPE),
        }
    }

    pub fn group(mut self, group: &str) -> Self {
        self.task.group = group.to_string();
        self
    }

    pub fn task_type(mut self, task_type: &str) -> Self {
        self.task.task_type = task_type.to_string();
        self
    }

    pub fn after(mut self, parent: &str) -> Self {
        self.task.parents.push(parent.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.task.tags.push(tag.to_string());
        self
    }

    pub fn no_skip(mut self) -> Self {
        self.task.on_fail = OnFailPolicy::NoSkip;
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.task.params.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> TaskDescriptor {
        self.task
    }
}

/// Task set from `(name, parents)` pairs, all in group `default` with the
/// fake task type.
pub fn chain(tasks: &[(&str, &[&str])]) -> TaskSet {
    tasks
        .iter()
        .map(|(name, parents)| {
            parents
                .iter()
                .fold(TaskBuilder::new(name), |b, p| b.after(p))
                .build()
        })
        .collect()
}

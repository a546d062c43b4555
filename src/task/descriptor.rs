// src/task/descriptor.rs

//! Resolved, immutable task descriptions.

use std::collections::{BTreeMap, HashMap};

use toml::{Table, Value};

use crate::errors::ConfigError;
use crate::types::{OnFailPolicy, TaskName};

/// A task after preset merging.
///
/// `params` holds every merged property that is not one of the structural
/// keys (`type`, `tags`, `parents`, `on_fail`); it is handed to the runner's
/// `configure` step untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDescriptor {
    pub name: TaskName,
    pub group: String,
    pub task_type: String,
    pub tags: Vec<String>,
    pub parents: Vec<TaskName>,
    pub on_fail: OnFailPolicy,
    pub params: Table,
}

impl TaskDescriptor {
    /// A descriptor with no tags, parents or parameters.
    pub fn new(
        name: impl Into<TaskName>,
        group: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            task_type: task_type.into(),
            tags: Vec::new(),
            parents: Vec::new(),
            on_fail: OnFailPolicy::default(),
            params: Table::new(),
        }
    }

    /// Build a descriptor from a merged property table.
    pub fn from_properties(name: &str, group: &str, mut props: Table) -> Result<Self, ConfigError> {
        let task_type = match props.remove("type") {
            Some(Value::String(s)) => s,
            Some(_) => return Err(invalid(name, "type", "a string")),
            None => {
                return Err(ConfigError::MissingTaskType {
                    task: name.to_string(),
                });
            }
        };

        let tags = take_string_list(name, &mut props, "tags")?;
        let parents = take_string_list(name, &mut props, "parents")?;

        let on_fail = match props.remove("on_fail") {
            None => OnFailPolicy::default(),
            Some(Value::String(s)) => s
                .parse()
                .map_err(|_| invalid(name, "on_fail", "\"skip\" or \"no_skip\""))?,
            Some(_) => return Err(invalid(name, "on_fail", "\"skip\" or \"no_skip\"")),
        };

        Ok(Self {
            name: name.to_string(),
            group: group.to_string(),
            task_type,
            tags,
            parents,
            on_fail,
            params: props,
        })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn take_string_list(task: &str, props: &mut Table, key: &str) -> Result<Vec<String>, ConfigError> {
    let Some(value) = props.remove(key) else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = value else {
        return Err(invalid(task, key, "an array of strings"));
    };

    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => {
                if !out.contains(&s) {
                    out.push(s);
                }
            }
            _ => return Err(invalid(task, key, "an array of strings")),
        }
    }
    Ok(out)
}

fn invalid(task: &str, property: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidProperty {
        task: task.to_string(),
        property: property.to_string(),
        expected,
    }
}

/// All descriptors of a run, in insertion order, with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<TaskDescriptor>,
    index: HashMap<TaskName, usize>,
}

impl TaskSet {
    /// Collect descriptors. A later descriptor with an already-seen name
    /// replaces the earlier one in place.
    pub fn new(descriptors: Vec<TaskDescriptor>) -> Self {
        let mut set = Self::default();
        for d in descriptors {
            set.insert(d);
        }
        set
    }

    pub fn insert(&mut self, descriptor: TaskDescriptor) {
        match self.index.get(&descriptor.name) {
            Some(&i) => self.tasks[i] = descriptor,
            None => {
                self.index.insert(descriptor.name.clone(), self.tasks.len());
                self.tasks.push(descriptor);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&TaskDescriptor> {
        self.index.get(name).map(|&i| &self.tasks[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// `(name, parents)` pairs in insertion order, ready for
    /// [`crate::dag::build_graph`].
    pub fn parent_map(&self) -> Vec<(&str, Vec<&str>)> {
        self.tasks
            .iter()
            .map(|t| (t.name.as_str(), t.parents.iter().map(String::as_str).collect()))
            .collect()
    }

    /// Index of task names by tag and by group, in insertion order.
    pub fn index(&self) -> TaskIndex {
        let mut tags: BTreeMap<String, Vec<TaskName>> = BTreeMap::new();
        let mut groups: BTreeMap<String, Vec<TaskName>> = BTreeMap::new();

        for task in &self.tasks {
            for tag in &task.tags {
                tags.entry(tag.clone()).or_default().push(task.name.clone());
            }
            groups
                .entry(task.group.clone())
                .or_default()
                .push(task.name.clone());
        }

        TaskIndex { tags, groups }
    }
}

impl FromIterator<TaskDescriptor> for TaskSet {
    fn from_iter<I: IntoIterator<Item = TaskDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Tag and group membership, the lookup tables behind `tag:` and `group:`
/// selectors.
#[derive(Debug, Clone, Default)]
pub struct TaskIndex {
    pub tags: BTreeMap<String, Vec<TaskName>>,
    pub groups: BTreeMap<String, Vec<TaskName>>,
}

impl TaskIndex {
    pub fn tagged(&self, tag: &str) -> &[TaskName] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_group(&self, group: &str) -> &[TaskName] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}

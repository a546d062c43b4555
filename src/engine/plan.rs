// src/engine/plan.rs

use std::collections::{HashMap, HashSet};

use crate::dag::{DagGraph, build_graph, topological_sort};
use crate::errors::Result;
use crate::query::resolve_query;
use crate::task::TaskSet;
use crate::types::TaskName;

/// A validated graph, its execution order and the selected subset.
///
/// Building a plan runs every fail-fast check that does not need runners:
/// graph completeness, acyclicity and the task query.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    graph: DagGraph,
    order: Vec<TaskName>,
    selected: HashSet<TaskName>,
}

/// One line of `pipedag plan`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: TaskName,
    /// Longest distance from a root task.
    pub layer: usize,
    pub in_query: bool,
    pub parents: Vec<TaskName>,
}

impl ExecutionPlan {
    pub fn build<S: AsRef<str>>(tasks: &TaskSet, include: &[S], exclude: &[S]) -> Result<Self> {
        let graph = build_graph(tasks.parent_map())?;
        let order = topological_sort(&graph)?;
        let selected = resolve_query(&graph, &tasks.index(), include, exclude)?
            .into_iter()
            .collect();

        Ok(Self {
            graph,
            order,
            selected,
        })
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Every task, parents before children.
    pub fn order(&self) -> &[TaskName] {
        &self.order
    }

    pub fn is_selected(&self, task: &str) -> bool {
        self.selected.contains(task)
    }

    /// The selected tasks, in execution order.
    pub fn selected(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|t| self.selected.contains(t.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn entries(&self) -> Vec<PlanEntry> {
        let layers = self.graph.layers();
        let layer_of: HashMap<&str, usize> = layers
            .iter()
            .enumerate()
            .flat_map(|(i, layer)| layer.iter().map(move |t| (t.as_str(), i)))
            .collect();

        self.order
            .iter()
            .map(|name| PlanEntry {
                name: name.clone(),
                layer: layer_of.get(name.as_str()).copied().unwrap_or_default(),
                in_query: self.is_selected(name),
                parents: self
                    .graph
                    .parents_of(name)
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
            })
            .collect()
    }
}

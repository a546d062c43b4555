// src/query/resolver.rs

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::dag::{DagGraph, topological_sort};
use crate::errors::{QueryError, Result};
use crate::query::selector::{Operation, Selector, SelectorKind};
use crate::task::TaskIndex;
use crate::types::TaskName;

/// Resolve `include` / `exclude` selection strings to the tasks to run, in
/// topological order.
///
/// With no include strings everything is selected before exclusions are
/// applied. Exclusions always win over inclusions.
pub fn resolve_query<S: AsRef<str>>(
    graph: &DagGraph,
    index: &TaskIndex,
    include: &[S],
    exclude: &[S],
) -> Result<Vec<TaskName>> {
    ensure_disjoint(include, exclude)?;

    let include = parse_all(include, Operation::Include)?;
    let exclude = parse_all(exclude, Operation::Exclude)?;

    let mut selected: HashSet<TaskName> = if include.is_empty() {
        graph.tasks().map(str::to_string).collect()
    } else {
        let mut set = HashSet::new();
        for selector in &include {
            set.extend(select(graph, index, selector)?);
        }
        set
    };

    for selector in &exclude {
        for task in select(graph, index, selector)? {
            selected.remove(&task);
        }
    }

    let ordered: Vec<TaskName> = topological_sort(graph)?
        .into_iter()
        .filter(|t| selected.contains(t))
        .collect();

    debug!(
        include = include.len(),
        exclude = exclude.len(),
        selected = ordered.len(),
        total = graph.len(),
        "resolved task query"
    );
    Ok(ordered)
}

fn ensure_disjoint<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<()> {
    let include: BTreeSet<&str> = include.iter().map(AsRef::as_ref).collect();
    let overlap: Vec<String> = exclude
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| include.contains(s))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    if overlap.is_empty() {
        Ok(())
    } else {
        Err(QueryError::Overlap { selectors: overlap }.into())
    }
}

fn parse_all<S: AsRef<str>>(inputs: &[S], operation: Operation) -> Result<Vec<Selector>> {
    inputs
        .iter()
        .map(|s| Selector::parse(s.as_ref(), operation).map_err(Into::into))
        .collect()
}

/// Tasks matched by one selector, closures included.
fn select(graph: &DagGraph, index: &TaskIndex, selector: &Selector) -> Result<Vec<TaskName>> {
    let seeds: Vec<Selector> = match selector.kind {
        SelectorKind::Task => {
            if !graph.contains(&selector.name) {
                return Err(undefined(selector).into());
            }
            vec![selector.clone()]
        }
        SelectorKind::Tag => expand(selector, index.tagged(&selector.name))?,
        SelectorKind::Group => expand(selector, index.in_group(&selector.name))?,
    };

    let mut out = Vec::new();
    for seed in &seeds {
        out.push(seed.name.clone());
        if seed.upstream {
            out.extend(graph.ancestors(&seed.name));
        }
        if seed.downstream {
            out.extend(graph.descendants(&seed.name));
        }
    }
    Ok(out)
}

fn expand(selector: &Selector, members: &[TaskName]) -> std::result::Result<Vec<Selector>, QueryError> {
    if members.is_empty() {
        return Err(undefined(selector));
    }
    Ok(members.iter().map(|t| selector.for_task(t)).collect())
}

fn undefined(selector: &Selector) -> QueryError {
    QueryError::Undefined {
        kind: selector.kind,
        name: selector.name.clone(),
    }
}

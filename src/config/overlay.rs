// src/config/overlay.rs

//! Resolution of inheritance chains over property tables.
//!
//! An overlay is a property table that may name one parent overlay. Resolving
//! a set of overlays orders them with the task-graph primitives (so cycles and
//! dangling references are caught the same way) and folds each table over its
//! already-resolved parent.
//!
//! Merge rules, applied key by key with the descendant on top:
//! - arrays are concatenated, ancestor entries first, without duplicates;
//! - tables are merged recursively;
//! - anything else is replaced by the descendant's value.

use std::collections::BTreeMap;

use toml::{Table, Value};

use crate::dag::{build_graph, topological_sort};
use crate::errors::GraphError;

/// One layer of properties with an optional parent layer.
#[derive(Debug, Clone)]
pub struct Overlay<K> {
    pub key: K,
    pub parent: Option<K>,
    pub properties: Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayError<K> {
    /// `key` names a parent that is not part of the overlay set.
    MissingParent { key: K, parent: K },
    /// Inheritance loops back on itself; the path starts and ends at the same key.
    Cycle { path: Vec<K> },
}

/// Resolve every overlay to its fully merged table.
///
/// Overlays are identified by their key, never by its display form, so two
/// distinct keys that render the same never collide. A key listed twice keeps
/// its last definition.
pub fn resolve_overlays<K>(overlays: Vec<Overlay<K>>) -> Result<BTreeMap<K, Table>, OverlayError<K>>
where
    K: Clone + Ord,
{
    let mut position: BTreeMap<K, usize> = BTreeMap::new();
    let mut unique: Vec<Overlay<K>> = Vec::with_capacity(overlays.len());
    for overlay in overlays {
        match position.get(&overlay.key) {
            Some(&i) => unique[i] = overlay,
            None => {
                position.insert(overlay.key.clone(), unique.len());
                unique.push(overlay);
            }
        }
    }

    let mut parent_of: Vec<Option<usize>> = Vec::with_capacity(unique.len());
    for overlay in &unique {
        let parent = match &overlay.parent {
            None => None,
            Some(parent) => match position.get(parent) {
                Some(&i) => Some(i),
                None => {
                    return Err(OverlayError::MissingParent {
                        key: overlay.key.clone(),
                        parent: parent.clone(),
                    });
                }
            },
        };
        parent_of.push(parent);
    }

    // Graph nodes are overlay positions.
    let ids: Vec<String> = (0..unique.len()).map(|i| i.to_string()).collect();
    let key_of = |id: &str| id.parse::<usize>().ok().and_then(|i| unique.get(i)).map(|o| o.key.clone());

    let order = build_graph(
        ids.iter()
            .zip(parent_of.iter())
            .map(|(id, parent)| (id.as_str(), parent.map(|p| ids[p].as_str()))),
    )
    .and_then(|g| topological_sort(&g))
    .map_err(|err| match err {
        GraphError::Cycle { path } => OverlayError::Cycle {
            path: path.iter().filter_map(|id| key_of(id.as_str())).collect(),
        },
        GraphError::MissingParents { .. } => unreachable!("overlay parents are checked above"),
    })?;

    let mut resolved: Vec<Option<Table>> = vec![None; unique.len()];
    for id in &order {
        let Ok(i) = id.parse::<usize>() else {
            continue;
        };
        let overlay = &unique[i];
        let merged = match parent_of[i].and_then(|p| resolved[p].as_ref()) {
            Some(base) => merge_tables(base, &overlay.properties),
            None => overlay.properties.clone(),
        };
        resolved[i] = Some(merged);
    }

    Ok(unique
        .into_iter()
        .zip(resolved)
        .filter_map(|(o, table)| table.map(|t| (o.key, t)))
        .collect())
}

/// Merge `overlay` on top of `base` and return the result.
pub fn merge_tables(base: &Table, overlay: &Table) -> Table {
    let mut out = base.clone();

    for (key, value) in overlay {
        let merged = match (out.get(key), value) {
            (Some(Value::Array(inherited)), Value::Array(own)) => {
                let mut items = inherited.clone();
                for item in own {
                    if !items.contains(item) {
                        items.push(item.clone());
                    }
                }
                Value::Array(items)
            }
            (Some(Value::Table(inherited)), Value::Table(own)) => {
                Value::Table(merge_tables(inherited, own))
            }
            _ => value.clone(),
        };
        out.insert(key.clone(), merged);
    }

    out
}

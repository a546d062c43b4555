// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed};
use tracing::debug;

use crate::errors::GraphError;
use crate::types::TaskName;

/// Validated directed acyclic graph keyed by node name.
///
/// Edge direction: parent -> child. For
///
/// ```toml
/// [group.g.task.B]
/// parents = ["A"]
/// ```
///
/// the graph holds the edge `A -> B`.
///
/// Node indices follow insertion order, which is what the topological sort
/// uses to break ties. A `DagGraph` can only be obtained through
/// [`build_graph`], so every value of this type is complete and acyclic.
#[derive(Debug, Clone)]
pub struct DagGraph {
    graph: DiGraph<TaskName, ()>,
    index: HashMap<TaskName, NodeIndex>,
}

/// Build and validate a graph from `(name, parents)` pairs.
///
/// Insertion order is the iteration order of `tasks`. A name listed twice has
/// its parent lists merged.
///
/// # Errors
/// - [`GraphError::MissingParents`] if any parent is not itself a key.
/// - [`GraphError::Cycle`] if the parent relation contains a cycle.
pub fn build_graph<'a, I, P>(tasks: I) -> Result<DagGraph, GraphError>
where
    I: IntoIterator<Item = (&'a str, P)>,
    P: IntoIterator<Item = &'a str>,
{
    let mut entries: Vec<(&'a str, Vec<&'a str>)> = Vec::new();
    let mut position: HashMap<&'a str, usize> = HashMap::new();

    for (name, parents) in tasks {
        let slot = *position.entry(name).or_insert_with(|| {
            entries.push((name, Vec::new()));
            entries.len() - 1
        });
        let list = &mut entries[slot].1;
        for parent in parents {
            if !list.contains(&parent) {
                list.push(parent);
            }
        }
    }

    ensure_complete(&entries, &position)?;

    let mut graph: DiGraph<TaskName, ()> = DiGraph::with_capacity(entries.len(), 0);
    let mut index = HashMap::with_capacity(entries.len());

    for (name, _) in &entries {
        let idx = graph.add_node(name.to_string());
        index.insert(name.to_string(), idx);
    }

    for (name, parents) in &entries {
        let child = index[*name];
        for parent in parents {
            graph.update_edge(index[*parent], child, ());
        }
    }

    let dag = DagGraph { graph, index };

    if let Some(path) = dag.find_cycle() {
        return Err(GraphError::Cycle { path });
    }

    debug!(
        nodes = dag.graph.node_count(),
        edges = dag.graph.edge_count(),
        "built task graph"
    );

    Ok(dag)
}

fn ensure_complete(
    entries: &[(&str, Vec<&str>)],
    position: &HashMap<&str, usize>,
) -> Result<(), GraphError> {
    let mut missing: BTreeMap<TaskName, Vec<TaskName>> = BTreeMap::new();

    for (name, parents) in entries {
        for parent in parents {
            if !position.contains_key(parent) {
                missing
                    .entry(name.to_string())
                    .or_default()
                    .push(parent.to_string());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(GraphError::MissingParents { missing })
    }
}

/// Order the graph so that every parent precedes all of its children.
///
/// Kahn's algorithm; among nodes that are ready at the same time, the one
/// inserted first is emitted first, so identical input always yields the
/// same order. An empty graph yields an empty order.
pub fn topological_sort(graph: &DagGraph) -> Result<Vec<TaskName>, GraphError> {
    let g = &graph.graph;

    let mut in_degree: Vec<usize> = g
        .node_indices()
        .map(|n| g.neighbors_directed(n, Direction::Incoming).count())
        .collect();

    let mut ready: BTreeSet<NodeIndex> = g
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(g.node_count());

    while let Some(node) = ready.pop_first() {
        order.push(g[node].clone());

        for child in g.neighbors_directed(node, Direction::Outgoing) {
            let deg = &mut in_degree[child.index()];
            *deg -= 1;
            if *deg == 0 {
                ready.insert(child);
            }
        }
    }

    if order.len() < g.node_count() {
        // Unreachable for graphs produced by `build_graph`.
        let path = graph.find_cycle().unwrap_or_else(|| {
            let emitted: HashSet<&TaskName> = order.iter().collect();
            g.node_indices()
                .map(|n| g[n].clone())
                .filter(|name| !emitted.contains(name))
                .collect()
        });
        return Err(GraphError::Cycle { path });
    }

    Ok(order)
}

impl DagGraph {
    /// All node names in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.graph.node_indices().map(|n| self.graph[n].as_str())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Immediate parents of a node, in insertion order.
    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, Direction::Incoming)
    }

    /// Immediate children of a node, in insertion order.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        self.neighbours(name, Direction::Outgoing)
    }

    /// `name` plus every transitive ancestor, in breadth-first order.
    ///
    /// Returns an empty vector for unknown names.
    pub fn ancestors(&self, name: &str) -> Vec<TaskName> {
        let Some(&start) = self.index.get(name) else {
            return Vec::new();
        };
        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, start);
        let mut out = Vec::new();
        while let Some(n) = bfs.next(reversed) {
            out.push(self.graph[n].clone());
        }
        out
    }

    /// `name` plus every transitive descendant, in breadth-first order.
    ///
    /// Returns an empty vector for unknown names.
    pub fn descendants(&self, name: &str) -> Vec<TaskName> {
        let Some(&start) = self.index.get(name) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, start);
        let mut out = Vec::new();
        while let Some(n) = bfs.next(&self.graph) {
            out.push(self.graph[n].clone());
        }
        out
    }

    /// Group nodes into layers: roots are layer 0, every other node sits one
    /// layer below its deepest parent. Nodes within a layer have no path
    /// between them.
    pub fn layers(&self) -> Vec<Vec<TaskName>> {
        let Ok(order) = topological_sort(self) else {
            return Vec::new();
        };

        let mut depth: HashMap<&str, usize> = HashMap::with_capacity(order.len());
        let mut layers: Vec<Vec<TaskName>> = Vec::new();

        for name in &order {
            let d = self
                .parents_of(name)
                .iter()
                .filter_map(|p| depth.get(p))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(name.as_str(), d);
            if layers.len() <= d {
                layers.resize_with(d + 1, Vec::new);
            }
            layers[d].push(name.clone());
        }

        layers
    }

    fn neighbours(&self, name: &str, dir: Direction) -> Vec<&str> {
        let Some(&idx) = self.index.get(name) else {
            return Vec::new();
        };
        let mut found: Vec<NodeIndex> = self.graph.neighbors_directed(idx, dir).collect();
        found.sort();
        found.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Depth-first search with an explicit recursion stack.
    ///
    /// Returns the first cycle found as a path that starts and ends at the
    /// node where the back-edge lands.
    fn find_cycle(&self) -> Option<Vec<TaskName>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Unvisited,
            OnStack,
            Done,
        }

        let g = &self.graph;
        let mut mark = vec![Mark::Unvisited; g.node_count()];

        for root in g.node_indices() {
            if mark[root.index()] != Mark::Unvisited {
                continue;
            }

            // Each frame: node plus the children still to visit.
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>)> = Vec::new();
            let mut path: Vec<NodeIndex> = Vec::new();

            mark[root.index()] = Mark::OnStack;
            path.push(root);
            stack.push((root, self.sorted_children(root)));

            while let Some((node, pending)) = stack.last_mut() {
                let node = *node;
                match pending.pop() {
                    Some(child) => match mark[child.index()] {
                        Mark::OnStack => {
                            let start = path.iter().position(|n| *n == child).unwrap_or(0);
                            let mut cycle: Vec<TaskName> =
                                path[start..].iter().map(|n| g[*n].clone()).collect();
                            cycle.push(g[child].clone());
                            return Some(cycle);
                        }
                        Mark::Unvisited => {
                            mark[child.index()] = Mark::OnStack;
                            path.push(child);
                            stack.push((child, self.sorted_children(child)));
                        }
                        Mark::Done => {}
                    },
                    None => {
                        mark[node.index()] = Mark::Done;
                        path.pop();
                        stack.pop();
                    }
                }
            }
        }

        None
    }

    /// Children in reverse insertion order, so that popping visits them in
    /// insertion order.
    fn sorted_children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        children.sort_by(|a, b| b.cmp(a));
        children
    }
}

// src/dag/mod.rs

//! Task dependency graph.
//!
//! - [`graph`] builds and validates the parent relation (completeness,
//!   acyclicity) and produces the deterministic topological order every
//!   other component relies on.

pub mod graph;

pub use graph::{DagGraph, build_graph, topological_sort};

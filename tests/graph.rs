// tests/graph.rs

use std::collections::HashMap;

use pipedag::dag::{DagGraph, build_graph, topological_sort};
use pipedag::errors::GraphError;

fn graph(tasks: &[(&str, &[&str])]) -> Result<DagGraph, GraphError> {
    build_graph(tasks.iter().map(|(name, parents)| (*name, parents.iter().copied())))
}

fn position(order: &[String]) -> HashMap<&str, usize> {
    order
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect()
}

#[test]
fn empty_graph_sorts_to_empty_order() {
    let g = graph(&[]).expect("empty graph is valid");
    assert!(g.is_empty());
    assert!(topological_sort(&g).unwrap().is_empty());
}

#[test]
fn non_empty_graph_sorts_every_node() {
    let g = graph(&[("a", &[])]).unwrap();
    assert_eq!(topological_sort(&g).unwrap(), vec!["a"]);
}

#[test]
fn ready_nodes_are_emitted_in_insertion_order() {
    let g = graph(&[("c", &[]), ("a", &[]), ("b", &["c"]), ("d", &["a"])]).unwrap();
    assert_eq!(topological_sort(&g).unwrap(), vec!["c", "a", "b", "d"]);
}

#[test]
fn ten_node_pipeline_respects_every_edge() {
    let tasks: &[(&str, &[&str])] = &[
        ("1", &[]),
        ("2", &["1"]),
        ("3", &["1", "2"]),
        ("4", &[]),
        ("5", &["3", "4"]),
        ("6", &["4"]),
        ("7", &["6", "4"]),
        ("8", &["7"]),
        ("9", &["8"]),
        ("10", &["9"]),
    ];
    let g = graph(tasks).unwrap();
    let order = topological_sort(&g).unwrap();
    assert_eq!(order.len(), 10);

    let pos = position(&order);
    for (before, after) in [
        ("1", "2"),
        ("1", "3"),
        ("2", "3"),
        ("3", "5"),
        ("4", "5"),
        ("4", "6"),
        ("4", "7"),
        ("6", "7"),
        ("7", "8"),
        ("8", "9"),
        ("9", "10"),
    ] {
        assert!(pos[before] < pos[after], "{before} must run before {after}: {order:?}");
    }
}

#[test]
fn self_loop_is_a_cycle() {
    let err = graph(&[("a", &["a"])]).unwrap_err();
    assert_eq!(
        err,
        GraphError::Cycle {
            path: vec!["a".into(), "a".into()]
        }
    );
    assert_eq!(err.code(), "graph.cycle");
}

#[test]
fn two_node_cycle_reports_the_path() {
    let err = graph(&[("a", &["b"]), ("b", &["a"])]).unwrap_err();
    assert_eq!(
        err,
        GraphError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()]
        }
    );
}

#[test]
fn longer_cycle_reports_the_path_from_its_entry() {
    let err = graph(&[
        ("root", &[]),
        ("a", &["root", "c"]),
        ("b", &["a"]),
        ("c", &["b"]),
    ])
    .unwrap_err();

    let GraphError::Cycle { path } = err else {
        panic!("expected a cycle, got {err:?}");
    };
    assert_eq!(path.first(), path.last());
    assert_eq!(path.len(), 4);
    for name in ["a", "b", "c"] {
        assert!(path.iter().any(|p| p == name), "{name} missing from {path:?}");
    }
    assert!(!path.iter().any(|p| p == "root"));
}

#[test]
fn undeclared_parents_are_listed_per_task() {
    let err = graph(&[("a", &["ghost"]), ("b", &["a", "phantom", "ghost"])]).unwrap_err();

    let GraphError::MissingParents { missing } = &err else {
        panic!("expected missing parents, got {err:?}");
    };
    assert_eq!(missing["a"], vec!["ghost"]);
    assert_eq!(missing["b"], vec!["phantom", "ghost"]);
    assert!(err.to_string().contains("phantom"));
}

#[test]
fn closures_include_the_seed() {
    let g = graph(&[
        ("a", &[]),
        ("b", &[]),
        ("x", &["a", "b"]),
        ("y", &["x"]),
        ("z", &["y"]),
    ])
    .unwrap();

    let mut up = g.ancestors("y");
    up.sort();
    assert_eq!(up, vec!["a", "b", "x", "y"]);

    let mut down = g.descendants("x");
    down.sort();
    assert_eq!(down, vec!["x", "y", "z"]);

    assert!(g.ancestors("nope").is_empty());
    assert_eq!(g.parents_of("x"), vec!["a", "b"]);
    assert_eq!(g.children_of("x"), vec!["y"]);
}

#[test]
fn layers_group_by_longest_path_from_a_root() {
    let g = graph(&[
        ("a", &[]),
        ("b", &["a"]),
        ("c", &[]),
        ("d", &["b", "c"]),
    ])
    .unwrap();

    assert_eq!(
        g.layers(),
        vec![vec!["a".to_string(), "c".to_string()], vec!["b".to_string()], vec!["d".to_string()]]
    );
}

#[test]
fn duplicate_names_merge_their_parents() {
    let g = graph(&[("a", &[]), ("b", &[]), ("c", &["a"]), ("c", &["b", "a"])]).unwrap();
    assert_eq!(g.len(), 3);
    assert_eq!(g.parents_of("c"), vec!["a", "b"]);
}

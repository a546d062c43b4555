// tests/query.rs

mod common;
use crate::common::builders::{TaskBuilder, chain};

use pipedag::dag::{DagGraph, build_graph};
use pipedag::errors::{PipedagError, QueryError};
use pipedag::query::{Operation, Selector, SelectorKind, resolve_query};
use pipedag::task::TaskSet;

const NONE: &[&str] = &[];

fn graph_of(tasks: &TaskSet) -> DagGraph {
    build_graph(tasks.parent_map()).expect("valid graph")
}

fn query(tasks: &TaskSet, include: &[&str], exclude: &[&str]) -> Result<Vec<String>, PipedagError> {
    resolve_query(&graph_of(tasks), &tasks.index(), include, exclude)
}

fn query_err(tasks: &TaskSet, include: &[&str], exclude: &[&str]) -> QueryError {
    match query(tasks, include, exclude) {
        Err(PipedagError::Query(e)) => e,
        other => panic!("expected a query error, got {other:?}"),
    }
}

/// `X` has parents `A` and `B`, and one child `Y`.
fn diamond() -> TaskSet {
    chain(&[("A", &[]), ("B", &[]), ("X", &["A", "B"]), ("Y", &["X"]), ("Z", &[])])
}

/// t1..t7: t2, t3, t5 tagged tag1; groups group1 {t1, t2}, group2 {t3, t4},
/// group3 {t5, t6, t7}.
fn tagged_groups() -> TaskSet {
    let task = |name: &str, group: &str| TaskBuilder::new(name).group(group);
    [
        task("t1", "group1"),
        task("t2", "group1").tag("tag1").after("t1"),
        task("t3", "group2").tag("tag1"),
        task("t4", "group2").after("t3"),
        task("t5", "group3").tag("tag1"),
        task("t6", "group3").after("t5"),
        task("t7", "group3").after("t6"),
    ]
    .into_iter()
    .map(TaskBuilder::build)
    .collect()
}

#[test]
fn parses_every_selector_form() {
    let s = Selector::parse("+load-users_2+", Operation::Include).unwrap();
    assert_eq!(s.kind, SelectorKind::Task);
    assert_eq!(s.name, "load-users_2");
    assert!(s.upstream && s.downstream);

    let s = Selector::parse("X+", Operation::Exclude).unwrap();
    assert_eq!(s.operation, Operation::Exclude);
    assert!(!s.upstream && s.downstream);

    let s = Selector::parse("tag:nightly", Operation::Include).unwrap();
    assert_eq!((s.kind, s.name.as_str()), (SelectorKind::Tag, "nightly"));

    let s = Selector::parse("group:extract", Operation::Include).unwrap();
    assert_eq!((s.kind, s.name.as_str()), (SelectorKind::Group, "extract"));
    assert_eq!(s.to_string(), "group:extract");
}

#[test]
fn malformed_selectors_are_syntax_errors() {
    for bad in ["", "+", "++a", "a++", "tag:", "+tag:x", "color:red", "-a", "a b", "tag:x+"] {
        assert_eq!(
            Selector::parse(bad, Operation::Include),
            Err(QueryError::Syntax {
                selector: bad.to_string()
            }),
            "{bad:?} should not parse"
        );
    }
}

#[test]
fn no_selectors_select_everything_in_order() {
    let tasks = diamond();
    assert_eq!(query(&tasks, NONE, NONE).unwrap(), vec!["A", "B", "X", "Y", "Z"]);
}

#[test]
fn upstream_closure() {
    let tasks = diamond();
    assert_eq!(query(&tasks, &["+X"], NONE).unwrap(), vec!["A", "B", "X"]);
}

#[test]
fn downstream_closure() {
    let tasks = diamond();
    assert_eq!(query(&tasks, &["X+"], NONE).unwrap(), vec!["X", "Y"]);
}

#[test]
fn both_closures() {
    let tasks = diamond();
    assert_eq!(query(&tasks, &["+X+"], NONE).unwrap(), vec!["A", "B", "X", "Y"]);
}

#[test]
fn exclude_only_removes_the_closure_and_keeps_order() {
    let tasks = diamond();
    assert_eq!(query(&tasks, NONE, &["X+"]).unwrap(), vec!["A", "B", "Z"]);
}

#[test]
fn exclusion_wins_over_inclusion() {
    let tasks = tagged_groups();
    assert_eq!(
        query(&tasks, &["tag:tag1"], &["group:group2"]).unwrap(),
        vec!["t2", "t5"]
    );
}

#[test]
fn result_follows_execution_order_not_selector_order() {
    let tasks = tagged_groups();
    assert_eq!(
        query(&tasks, &["t7", "t1", "group:group2"], NONE).unwrap(),
        vec!["t1", "t3", "t4", "t7"]
    );
}

#[test]
fn overlapping_selectors_are_rejected() {
    let tasks = diamond();
    assert_eq!(
        query_err(&tasks, &["X", "A"], &["B", "X"]),
        QueryError::Overlap {
            selectors: vec!["X".to_string()]
        }
    );
}

#[test]
fn undefined_names_report_their_kind() {
    let tasks = tagged_groups();

    assert_eq!(
        query_err(&tasks, &["nope"], NONE),
        QueryError::Undefined {
            kind: SelectorKind::Task,
            name: "nope".into()
        }
    );
    assert_eq!(
        query_err(&tasks, NONE, &["tag:missing"]),
        QueryError::Undefined {
            kind: SelectorKind::Tag,
            name: "missing".into()
        }
    );
    let err = query_err(&tasks, &["group:group9"], NONE);
    assert_eq!(err.code(), "query.undefined");
    assert_eq!(err.to_string(), "undefined group 'group9' in task query");
}

#[test]
fn syntax_errors_surface_through_resolve() {
    let tasks = diamond();
    assert!(matches!(
        query_err(&tasks, &["tag:"], NONE),
        QueryError::Syntax { .. }
    ));
}

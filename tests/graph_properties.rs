// tests/graph_properties.rs

use std::collections::{BTreeSet, HashMap};

use pipedag::dag::{build_graph, topological_sort};
use proptest::prelude::*;

// Random DAGs: task N may only depend on tasks 0..N-1, so every generated
// graph is acyclic.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..num_tasks),
            num_tasks,
        )
        .prop_map(|raw_deps| {
            raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, potential)| {
                    let parents: BTreeSet<usize> = if i == 0 {
                        BTreeSet::new()
                    } else {
                        potential.into_iter().map(|p| p % i).collect()
                    };
                    (
                        format!("task_{i}"),
                        parents.into_iter().map(|p| format!("task_{p}")).collect(),
                    )
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn every_parent_precedes_its_children(tasks in dag_strategy(25)) {
        let graph = build_graph(
            tasks.iter().map(|(name, parents)| (name.as_str(), parents.iter().map(String::as_str))),
        ).expect("generated graphs are acyclic and complete");

        let order = topological_sort(&graph).expect("sort succeeds on a valid graph");
        prop_assert_eq!(order.len(), tasks.len());

        let pos: HashMap<&str, usize> =
            order.iter().enumerate().map(|(i, n)| (n.as_str(), i)).collect();

        for (name, parents) in &tasks {
            for parent in parents {
                prop_assert!(pos[parent.as_str()] < pos[name.as_str()]);
            }
        }
    }

    #[test]
    fn sorting_is_deterministic(tasks in dag_strategy(15)) {
        let build = || build_graph(
            tasks.iter().map(|(name, parents)| (name.as_str(), parents.iter().map(String::as_str))),
        ).unwrap();

        prop_assert_eq!(topological_sort(&build()).unwrap(), topological_sort(&build()).unwrap());
    }

    #[test]
    fn closing_a_chain_back_on_itself_is_rejected(len in 1usize..10) {
        let names: Vec<String> = (0..len).map(|i| format!("n{i}")).collect();
        // n0 depends on the last node, every other node on its predecessor.
        let tasks: Vec<(&str, Vec<&str>)> = names
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let parent = if i == 0 { &names[len - 1] } else { &names[i - 1] };
                (n.as_str(), vec![parent.as_str()])
            })
            .collect();

        prop_assert!(build_graph(tasks).is_err());
    }
}

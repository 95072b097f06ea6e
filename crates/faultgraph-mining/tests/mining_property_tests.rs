use faultgraph_mining::{
    numeric::approx_eq, Graph, GraphCollection, GraphMining, MiningConfig, NodeId, NodeInfo,
    NodeInfoCollection, ScoreKind,
};
use proptest::prelude::*;

const MAX_NODES: NodeId = 9;
const MAX_TRACE_LEN: usize = 14;
const MAX_RUNS: usize = 8;

#[derive(Debug, Clone)]
struct SuiteCase {
    node_count: NodeId,
    runs: Vec<(bool, Vec<NodeId>)>,
    result_limit: usize,
    max_path_edges: usize,
    score: ScoreKind,
}

/// Nodes below `split` belong to `main`, the rest to `helper`.
fn infos(node_count: NodeId) -> NodeInfoCollection {
    let split = node_count / 2;
    (0..node_count)
        .map(|id| {
            if id < split {
                NodeInfo::new("main", id == 0, id + 1)
            } else {
                NodeInfo::new("helper", id == split, 100 + id)
            }
        })
        .collect()
}

fn suite_case() -> impl Strategy<Value = SuiteCase> {
    (2..=MAX_NODES).prop_flat_map(|node_count| {
        let trace = prop::collection::vec(0..node_count, 1..=MAX_TRACE_LEN);
        (
            Just(node_count),
            trace.clone(),
            trace,
            prop::collection::vec(
                (any::<bool>(), prop::collection::vec(0..node_count, 1..=MAX_TRACE_LEN)),
                0..=MAX_RUNS,
            ),
            1usize..=6,
            1usize..=5,
            prop_oneof![Just(ScoreKind::Fisher), Just(ScoreKind::InformationGain)],
        )
            .prop_map(|(node_count, pass, fail, mut runs, result_limit, max_path_edges, score)| {
                runs.push((true, pass));
                runs.push((false, fail));
                SuiteCase {
                    node_count,
                    runs,
                    result_limit,
                    max_path_edges,
                    score,
                }
            })
    })
}

fn build(case: &SuiteCase, infos: &NodeInfoCollection) -> GraphCollection {
    GraphCollection::from_graphs(
        case.runs
            .iter()
            .map(|(ok, nodes)| Graph::from_nodes(*ok, nodes, infos).unwrap())
            .collect(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn results_are_bounded_sorted_and_unnested(case in suite_case()) {
        let infos = infos(case.node_count);
        let graphs = build(&case, &infos);
        let config = MiningConfig {
            result_limit: case.result_limit,
            max_path_edges: case.max_path_edges,
            score_function: case.score,
            expansion_budget: None,
        };
        let outcome = GraphMining::from_config(&graphs, &infos, config).mine().unwrap();
        let results = &outcome.results;

        prop_assert!(results.len() <= case.result_limit);
        for r in results {
            prop_assert!(r.score > 0.0);
            prop_assert!(r.edge_count() <= case.max_path_edges);
            prop_assert_eq!(r.path.nodes().len(), r.edge_count() + 1);
        }
        for pair in results.windows(2) {
            prop_assert!(pair[0].rank_cmp(&pair[1]).is_le());
        }
        for (i, a) in results.iter().enumerate() {
            for b in &results[i + 1..] {
                prop_assert!(!a.path.is_nested_with(&b.path), "{} nests with {}", a, b);
            }
        }
        prop_assert!(outcome.stats.admitted >= results.len());
        prop_assert_eq!(
            outcome.stats.dequeued,
            outcome.stats.scored + outcome.stats.discarded_by_depth
        );
    }

    #[test]
    fn in_function_branch_frequencies_sum_to_one(case in suite_case()) {
        let infos = infos(case.node_count);
        for (ok, nodes) in &case.runs {
            let graph = Graph::from_nodes(*ok, nodes, &infos).unwrap();
            prop_assert_eq!(graph.node_count(), {
                let mut distinct = nodes.clone();
                distinct.sort_unstable();
                distinct.dedup();
                distinct.len()
            });

            for vector in graph.vectors() {
                if vector.out_degree() == 0 {
                    continue;
                }
                let function = &infos[vector.id()].owned_function;
                let crosses = vector
                    .successors()
                    .any(|to| &infos[to].owned_function != function);
                let frequencies: Vec<f64> = vector.out_edges().map(|(_, s)| s.frequency).collect();
                if crosses {
                    prop_assert!(frequencies.iter().all(|&f| f == 1.0));
                } else {
                    prop_assert!(approx_eq(frequencies.iter().sum::<f64>(), 1.0));
                }
            }

            let union: usize = graph.vectors().map(|v| v.out_degree()).sum();
            prop_assert_eq!(union, graph.edge_count());
        }
    }
}

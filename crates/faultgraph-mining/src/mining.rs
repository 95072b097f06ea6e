//! Branch-and-bound search for discriminative paths.
//!
//! The search space is the edge union of every failing execution. Paths are
//! explored breadth-first from single edges:
//!
//! 1. paths longer than `max_path_edges` are discarded unscored;
//! 2. a path scoring above 0 (and at least the current k-th best score once
//!    the list is full) is offered to the top-k list;
//! 3. a path whose bound is above 0 is extended by every search-space
//!    successor of its last node that is not already on the path and that
//!    `PathChecker` accepts.
//!
//! The top-k list keeps at most one representative of every family of
//! nested paths: a candidate is refused when a better-ranked kept result is
//! its sub- or super-path, and evicts every worse-ranked one that is.

use crate::checker::PathChecker;
use crate::collection::GraphCollection;
use crate::config::MiningConfig;
use crate::graph::merge_graphs;
use crate::numeric::approx_cmp;
use crate::path::ExecutePath;
use crate::result::MiningResult;
use crate::score::ScoreFunction;
use anyhow::Result;
use faultgraph_trace::NodeInfoCollection;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::VecDeque;

/// Counters collected during one mining run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MiningStats {
    pub search_space_nodes: usize,
    pub search_space_edges: usize,
    /// Single-edge paths the queue started with.
    pub seeded: usize,
    pub dequeued: usize,
    pub scored: usize,
    pub discarded_by_depth: usize,
    pub rejected_by_checker: usize,
    pub admitted: usize,
    pub budget_exhausted: bool,
}

#[derive(Debug, Clone)]
pub struct MiningOutcome {
    /// Best first.
    pub results: Vec<MiningResult>,
    pub stats: MiningStats,
}

pub struct GraphMining<'a> {
    graphs: &'a GraphCollection,
    checker: PathChecker<'a>,
    score_function: Box<dyn ScoreFunction + 'a>,
    config: MiningConfig,
    results: Vec<MiningResult>,
}

impl<'a> GraphMining<'a> {
    pub fn new(
        graphs: &'a GraphCollection,
        infos: &'a NodeInfoCollection,
        score_function: Box<dyn ScoreFunction + 'a>,
        config: MiningConfig,
    ) -> Self {
        Self {
            graphs,
            checker: PathChecker::new(infos),
            score_function,
            config,
            results: Vec::new(),
        }
    }

    /// Use the scoring strategy named by `config`.
    pub fn from_config(
        graphs: &'a GraphCollection,
        infos: &'a NodeInfoCollection,
        config: MiningConfig,
    ) -> Self {
        let score_function = config.score_function.build();
        Self::new(graphs, infos, score_function, config)
    }

    pub fn mine(mut self) -> Result<MiningOutcome> {
        self.config.validate()?;

        let search_space = merge_graphs(self.graphs.fails());
        self.score_function.init(self.graphs, &search_space)?;

        let mut queue: VecDeque<ExecutePath> =
            search_space.sorted_edges().map(ExecutePath::new).collect();
        let mut stats = MiningStats {
            search_space_nodes: search_space.node_count(),
            search_space_edges: search_space.edge_count(),
            seeded: queue.len(),
            ..MiningStats::default()
        };
        tracing::info!(
            score_function = self.score_function.name(),
            graphs = self.graphs.len(),
            seeds = stats.seeded,
            result_limit = self.config.result_limit,
            max_path_edges = self.config.max_path_edges,
            "mining started"
        );

        let mut score_limit = 0.0;
        while let Some(path) = queue.pop_front() {
            if let Some(budget) = self.config.expansion_budget {
                if stats.dequeued >= budget {
                    stats.budget_exhausted = true;
                    tracing::warn!(
                        budget,
                        pending = queue.len() + 1,
                        results = self.results.len(),
                        "expansion budget exhausted, returning partial top-k"
                    );
                    break;
                }
            }
            stats.dequeued += 1;

            if path.len() > self.config.max_path_edges {
                stats.discarded_by_depth += 1;
                continue;
            }

            let result = self.score_function.score(self.graphs, path);
            stats.scored += 1;

            if result.max_possible_score > 0.0 {
                if let Some(vector) = search_space.vector(result.path.last_node()) {
                    for next in vector.successors() {
                        if result.path.contains_node(next) {
                            continue;
                        }
                        let extended = result.path.extend(next);
                        if self.checker.check(&extended) {
                            queue.push_back(extended);
                        } else {
                            stats.rejected_by_checker += 1;
                        }
                    }
                }
            }

            if result.score > 0.0 && approx_cmp(result.score, score_limit) != Ordering::Less {
                tracing::debug!(path = %result.path, score = result.score, "candidate result");
                if self.add_result(result) {
                    stats.admitted += 1;
                    // Evictions can shrink the list below k again.
                    score_limit = if self.results.len() >= self.config.result_limit {
                        self.results.last().map_or(0.0, |r| r.score)
                    } else {
                        0.0
                    };
                }
            }
        }

        tracing::info!(
            results = self.results.len(),
            dequeued = stats.dequeued,
            scored = stats.scored,
            admitted = stats.admitted,
            rejected_by_checker = stats.rejected_by_checker,
            discarded_by_depth = stats.discarded_by_depth,
            "mining finished"
        );
        Ok(MiningOutcome {
            results: self.results,
            stats,
        })
    }

    /// Offer `candidate` to the top-k list. Returns whether it was kept.
    fn add_result(&mut self, candidate: MiningResult) -> bool {
        let limit = self.config.result_limit;
        let idx = match self.results.binary_search_by(|r| r.rank_cmp(&candidate)) {
            Ok(i) | Err(i) => i,
        };
        if idx >= limit {
            return false;
        }
        if self.results[..idx]
            .iter()
            .any(|r| r.path.is_nested_with(&candidate.path))
        {
            return false;
        }

        let mut worse = self.results.split_off(idx);
        worse.retain(|r| !r.path.is_nested_with(&candidate.path));
        self.results.push(candidate);
        self.results.append(&mut worse);
        self.results.truncate(limit);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::score::fixtures::{path, single_function};
    use crate::score::ScoreKind;
    use faultgraph_trace::NodeInfo;
    use std::collections::HashMap;

    fn collection(runs: &[(bool, &[u32])], infos: &NodeInfoCollection) -> GraphCollection {
        GraphCollection::from_graphs(
            runs.iter()
                .map(|(ok, nodes)| Graph::from_nodes(*ok, nodes, infos).unwrap())
                .collect(),
        )
    }

    fn config(kind: ScoreKind) -> MiningConfig {
        MiningConfig {
            score_function: kind,
            ..MiningConfig::default()
        }
    }

    fn nodes(outcome: &MiningOutcome) -> Vec<Vec<u32>> {
        outcome
            .results
            .iter()
            .map(|r| r.path.nodes().to_vec())
            .collect()
    }

    #[test]
    fn fail_only_edge_is_the_single_representative() {
        let infos = single_function(41);
        let graphs = collection(&[(false, &[10, 20, 30]), (true, &[10, 20, 40])], &infos);

        for kind in [ScoreKind::Fisher, ScoreKind::InformationGain] {
            let outcome = GraphMining::from_config(&graphs, &infos, config(kind))
                .mine()
                .unwrap();
            assert_eq!(nodes(&outcome), vec![vec![20, 30]], "{kind}");
            assert_eq!(outcome.stats.seeded, 2);
            assert_eq!(outcome.stats.search_space_edges, 2);
            assert!(!outcome.stats.budget_exhausted);
        }
    }

    #[test]
    fn one_sided_suite_is_rejected() {
        let infos = single_function(3);
        let graphs = collection(&[(false, &[0, 1, 2])], &infos);
        assert!(GraphMining::from_config(&graphs, &infos, MiningConfig::default())
            .mine()
            .is_err());
    }

    #[test]
    fn depth_bound_discards_long_paths() {
        let infos = single_function(10);
        let graphs = collection(
            &[(false, &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]), (true, &[0, 9])],
            &infos,
        );
        let cfg = MiningConfig {
            max_path_edges: 2,
            ..config(ScoreKind::InformationGain)
        };
        let outcome = GraphMining::from_config(&graphs, &infos, cfg).mine().unwrap();
        assert!(outcome.results.iter().all(|r| r.edge_count() <= 2));
        assert!(outcome.stats.discarded_by_depth > 0);
        assert_eq!(
            outcome.stats.dequeued,
            outcome.stats.scored + outcome.stats.discarded_by_depth
        );
    }

    #[test]
    fn checker_prunes_impossible_returns() {
        // main: 0 (entry), 1, 2   f: 3 (entry), 4   g: 5 (entry), 6
        let infos: NodeInfoCollection = [
            NodeInfo::new("main", true, 1),
            NodeInfo::new("main", false, 2),
            NodeInfo::new("main", false, 3),
            NodeInfo::new("f", true, 10),
            NodeInfo::new("f", false, 11),
            NodeInfo::new("g", true, 20),
            NodeInfo::new("g", false, 21),
        ]
        .into_iter()
        .collect();
        let graphs = collection(&[(false, &[1, 3, 4, 6]), (true, &[0, 1, 2])], &infos);
        let outcome = GraphMining::from_config(&graphs, &infos, config(ScoreKind::InformationGain))
            .mine()
            .unwrap();
        assert!(outcome.stats.rejected_by_checker >= 1);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.path.nodes() != [1, 3, 4, 6]));
    }

    #[test]
    fn budget_stops_the_search_early() {
        let infos = single_function(6);
        let graphs = collection(&[(false, &[0, 1, 2, 3, 4, 5]), (true, &[0, 5])], &infos);
        let cfg = MiningConfig {
            expansion_budget: Some(1),
            ..config(ScoreKind::InformationGain)
        };
        let outcome = GraphMining::from_config(&graphs, &infos, cfg).mine().unwrap();
        assert!(outcome.stats.budget_exhausted);
        assert_eq!(outcome.stats.dequeued, 1);
        assert!(outcome.results.len() <= 1);
    }

    #[test]
    fn add_result_keeps_one_representative_per_family() {
        let infos = single_function(10);
        let graphs = collection(&[(false, &[0, 1]), (true, &[0, 2])], &infos);
        let cfg = MiningConfig {
            result_limit: 2,
            ..MiningConfig::default()
        };
        let mut mining = GraphMining::from_config(&graphs, &infos, cfg);
        fn offer(mining: &mut GraphMining<'_>, nodes: &[u32], score: f64) -> bool {
            mining.add_result(MiningResult::new(path(nodes), score, score))
        }

        assert!(offer(&mut mining, &[1, 2], 0.5));
        // A better super-path evicts its sub-path.
        assert!(offer(&mut mining, &[1, 2, 3], 0.9));
        assert_eq!(mining.results.len(), 1);
        // A worse sub-path of a kept result is refused.
        assert!(!offer(&mut mining, &[2, 3], 0.3));
        assert!(offer(&mut mining, &[5, 6], 0.7));
        // The list is full and this ranks past the limit.
        assert!(!offer(&mut mining, &[7, 8], 0.1));

        let kept: Vec<Vec<u32>> = mining.results.iter().map(|r| r.path.nodes().to_vec()).collect();
        assert_eq!(kept, vec![vec![1, 2, 3], vec![5, 6]]);

        // A new best result pushes the last one out.
        assert!(offer(&mut mining, &[8, 9], 1.5));
        let scores: Vec<f64> = mining.results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.5, 0.9]);
    }

    /// Scores looked up by node sequence; every path may be extended.
    struct ScriptedScore(HashMap<Vec<u32>, f64>);

    impl ScoreFunction for ScriptedScore {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn init(&mut self, _: &GraphCollection, _: &Graph) -> Result<()> {
            Ok(())
        }

        fn score(&mut self, _: &GraphCollection, path: ExecutePath) -> MiningResult {
            let score = self.0.get(path.nodes()).copied().unwrap_or(0.0);
            MiningResult::new(path, score, 1.0)
        }
    }

    #[test]
    fn threshold_resets_when_evictions_shrink_the_list() {
        let infos = single_function(8);
        let graphs = collection(&[(false, &[1, 2, 3]), (false, &[5, 6, 7])], &infos);
        let scores = HashMap::from([
            (vec![1, 2], 0.5),
            (vec![2, 3], 0.4),
            (vec![1, 2, 3], 0.9),
            (vec![5, 6, 7], 0.2),
        ]);
        let cfg = MiningConfig {
            result_limit: 2,
            ..MiningConfig::default()
        };

        // (1,2,3) evicts both kept sub-paths, so (5,6,7) must fit below the
        // old k-th score.
        let outcome = GraphMining::new(&graphs, &infos, Box::new(ScriptedScore(scores)), cfg)
            .mine()
            .unwrap();
        assert_eq!(nodes(&outcome), vec![vec![1, 2, 3], vec![5, 6, 7]]);
        assert_eq!(outcome.stats.admitted, 4);
    }
}

use super::ScoreFunction;
use crate::collection::GraphCollection;
use crate::edge::EdgeKey;
use crate::graph::Graph;
use crate::numeric::approx_eq;
use crate::path::{CandidateSet, ExecutePath};
use crate::result::{EdgeAverages, MiningResult};
use anyhow::Result;
use roaring::RoaringBitmap;
use std::sync::Arc;

/// Fisher discriminant over edge frequencies.
///
/// For every path edge the frequency is averaged over all successful and
/// all failing runs (runs without the path contribute 0). The edge scores
/// `(s - f)² / (var_s + var_f)` when it is more frequent in failing runs,
/// and 0 otherwise. A path scores the mean of its edges.
///
/// Candidate graphs (those containing the path) are cached on the returned
/// path, so extensions only re-filter their parent's candidates.
#[derive(Debug, Default)]
pub struct FisherScore {
    success_total: usize,
    fail_total: usize,
    success_values: Vec<f64>,
    fail_values: Vec<f64>,
}

impl FisherScore {
    pub fn new() -> Self {
        Self::default()
    }

    fn candidates(graphs: &GraphCollection, path: &ExecutePath) -> CandidateSet {
        let full;
        let base: &CandidateSet = match path.data() {
            Some(data) => data.as_ref(),
            None => {
                full = CandidateSet::full(graphs.success_count(), graphs.fail_count());
                &full
            }
        };
        let edges = path.edges();
        CandidateSet {
            successes: base
                .successes
                .iter()
                .filter(|&i| graphs.success(i as usize).contains_all(edges))
                .collect::<RoaringBitmap>(),
            fails: base
                .fails
                .iter()
                .filter(|&i| graphs.fail(i as usize).contains_all(edges))
                .collect::<RoaringBitmap>(),
        }
    }

    /// Returns `(score, bound, averages)` of one edge.
    fn score_edge(
        &mut self,
        graphs: &GraphCollection,
        candidates: &CandidateSet,
        edge: EdgeKey,
    ) -> (f64, f64, EdgeAverages) {
        self.success_values.clear();
        self.success_values.extend(
            candidates
                .successes
                .iter()
                .map(|i| frequency(graphs.success(i as usize), edge)),
        );
        self.fail_values.clear();
        self.fail_values.extend(
            candidates
                .fails
                .iter()
                .map(|i| frequency(graphs.fail(i as usize), edge)),
        );

        let (success_avg, success_var) = moments(&self.success_values, self.success_total);
        let (fail_avg, fail_var) = moments(&self.fail_values, self.fail_total);
        let averages = EdgeAverages {
            edge,
            success: success_avg,
            fail: fail_avg,
        };

        if approx_eq(success_avg, fail_avg) || success_avg > fail_avg {
            return (0.0, 0.0, averages);
        }

        let diff = success_avg - fail_avg;
        let score = diff * diff / (success_var + fail_var);
        let bound = if approx_eq(success_avg, 0.0) {
            fail_avg / fail_var
        } else if approx_eq(fail_avg, 0.0) {
            success_avg / success_var
        } else {
            (success_avg / success_var).max(fail_avg / fail_var)
        };
        (score, bound, averages)
    }
}

impl ScoreFunction for FisherScore {
    fn name(&self) -> &'static str {
        "fisher"
    }

    fn init(&mut self, graphs: &GraphCollection, _search_space: &Graph) -> Result<()> {
        graphs.ensure_both_verdicts()?;
        self.success_total = graphs.success_count();
        self.fail_total = graphs.fail_count();
        self.success_values = Vec::with_capacity(self.success_total);
        self.fail_values = Vec::with_capacity(self.fail_total);
        Ok(())
    }

    fn score(&mut self, graphs: &GraphCollection, path: ExecutePath) -> MiningResult {
        let candidates = Self::candidates(graphs, &path);

        if candidates.is_empty() {
            return MiningResult::new(path.with_data(Arc::new(candidates)), 0.0, 0.0);
        }

        let mut score = 0.0;
        let mut bound = 0.0;
        let mut averages = Vec::with_capacity(path.len());
        for &edge in path.edges() {
            let (edge_score, edge_bound, edge_averages) =
                self.score_edge(graphs, &candidates, edge);
            score += edge_score;
            bound += edge_bound;
            averages.push(edge_averages);
        }
        let edges = path.len() as f64;

        MiningResult::new(
            path.with_data(Arc::new(candidates)),
            score / edges,
            bound / edges,
        )
        .with_edge_averages(averages)
    }
}

fn frequency(graph: &Graph, edge: EdgeKey) -> f64 {
    graph.edge(edge).map_or(0.0, |stats| stats.frequency)
}

/// Mean and population variance over `total` runs, where runs missing from
/// `values` are implicit zeros.
fn moments(values: &[f64], total: usize) -> (f64, f64) {
    let total_f = total as f64;
    let avg = values.iter().sum::<f64>() / total_f;
    let explicit: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    let implicit = (total - values.len()) as f64 * avg * avg;
    (avg, (explicit + implicit) / total_f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::fixtures::{collection, path};
    use approx::assert_relative_eq;

    #[test]
    fn fail_only_edge_outranks_shared_and_success_only_edges() {
        let (graphs, space) = collection(&[(false, &[10, 20, 30]), (true, &[10, 20, 40])]);
        let mut fisher = FisherScore::new();
        fisher.init(&graphs, &space).unwrap();

        let shared = fisher.score(&graphs, path(&[10, 20]));
        let fail_only = fisher.score(&graphs, path(&[20, 30]));
        let success_only = fisher.score(&graphs, path(&[20, 40]));

        assert_eq!(shared.score, 0.0);
        assert!(fail_only.score > 0.0);
        assert_eq!(success_only.score, 0.0);
        assert_eq!(success_only.max_possible_score, 0.0);
        assert!(fail_only.rank_cmp(&success_only).is_lt());
    }

    #[test]
    fn identical_runs_are_not_discriminative() {
        let (graphs, space) = collection(&[
            (false, &[0, 1, 2]),
            (true, &[0, 1, 2]),
            (false, &[0, 1, 2]),
            (true, &[0, 1, 2]),
        ]);
        let mut fisher = FisherScore::new();
        fisher.init(&graphs, &space).unwrap();
        let result = fisher.score(&graphs, path(&[0, 1, 2]));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.max_possible_score, 0.0);
        assert_eq!(result.edge_averages.len(), 2);
        assert!(result
            .edge_averages
            .iter()
            .all(|a| a.success == 1.0 && a.fail == 1.0));
    }

    #[test]
    fn averages_count_missing_runs_as_zero() {
        let (graphs, space) = collection(&[
            (false, &[0, 1, 0, 2]),
            (false, &[0, 1]),
            (true, &[0, 2]),
            (true, &[0, 2, 0, 1]),
        ]);
        let mut fisher = FisherScore::new();
        fisher.init(&graphs, &space).unwrap();
        let result = fisher.score(&graphs, path(&[0, 1]));

        let averages = result.edge_averages[0];
        assert_relative_eq!(averages.success, 0.25);
        assert_relative_eq!(averages.fail, 0.75);
        // var_s = var_f = 0.0625
        assert_relative_eq!(result.score, 2.0);
        assert_relative_eq!(result.max_possible_score, 12.0);

        let cached = result.path.data().unwrap();
        assert_eq!(cached.successes.iter().collect::<Vec<_>>(), vec![1]);
        assert_eq!(cached.fails.iter().collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn perfect_separation_scores_infinity() {
        let (graphs, space) = collection(&[(false, &[0, 1]), (false, &[0, 1]), (true, &[0, 2])]);
        let mut fisher = FisherScore::new();
        fisher.init(&graphs, &space).unwrap();
        let result = fisher.score(&graphs, path(&[0, 1]));
        assert!(result.score.is_infinite() && result.score > 0.0);
        assert!(result.max_possible_score.is_infinite());
    }

    #[test]
    fn cached_candidates_restrict_extensions() {
        let (graphs, space) = collection(&[(false, &[0, 1, 2]), (true, &[0, 3])]);
        let mut fisher = FisherScore::new();
        fisher.init(&graphs, &space).unwrap();

        let parent = path(&[0, 1]).with_data(Arc::new(CandidateSet::default()));
        let result = fisher.score(&graphs, parent.extend(2));
        assert_eq!(result.score, 0.0);
        assert_eq!(result.max_possible_score, 0.0);
        assert!(result.path.data().unwrap().is_empty());
    }

    #[test]
    fn init_requires_both_verdicts() {
        let (graphs, space) = collection(&[(false, &[0, 1])]);
        assert!(FisherScore::new().init(&graphs, &space).is_err());
    }
}

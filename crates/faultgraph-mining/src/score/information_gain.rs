use super::ScoreFunction;
use crate::collection::GraphCollection;
use crate::graph::Graph;
use crate::path::ExecutePath;
use crate::result::MiningResult;
use anyhow::Result;

/// Information gain of splitting the runs by "contains the path".
///
/// Counts are recomputed from every graph on each call; no candidates are
/// cached on the path.
#[derive(Debug, Default)]
pub struct InformationGain {
    success_total: usize,
    fail_total: usize,
    entropy: f64,
}

impl InformationGain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gain of a split where `s` successes and `f` fails contain the path.
    fn gain(&self, s: usize, f: usize) -> f64 {
        let total = (self.success_total + self.fail_total) as f64;
        let inside = (s + f) as f64;
        let outside = total - inside;
        self.entropy
            - inside / total * entropy(s, f)
            - outside / total * entropy(self.success_total - s, self.fail_total - f)
    }
}

impl ScoreFunction for InformationGain {
    fn name(&self) -> &'static str {
        "information-gain"
    }

    fn init(&mut self, graphs: &GraphCollection, _search_space: &Graph) -> Result<()> {
        graphs.ensure_both_verdicts()?;
        self.success_total = graphs.success_count();
        self.fail_total = graphs.fail_count();
        self.entropy = entropy(self.success_total, self.fail_total);
        Ok(())
    }

    fn score(&mut self, graphs: &GraphCollection, path: ExecutePath) -> MiningResult {
        let s = graphs
            .successes()
            .filter(|g| g.contains_all(path.edges()))
            .count();
        let f = graphs
            .fails()
            .filter(|g| g.contains_all(path.edges()))
            .count();

        let score = self.gain(s, f);
        let bound = self.gain(s, 0).max(self.gain(0, f));
        MiningResult::new(path, score, bound)
    }
}

/// Binary entropy (bits) of a `(a, b)` split; 0 for an empty or pure split.
fn entropy(a: usize, b: usize) -> f64 {
    let total = (a + b) as f64;
    [a, b]
        .into_iter()
        .filter(|&n| n > 0)
        .map(|n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum()
}

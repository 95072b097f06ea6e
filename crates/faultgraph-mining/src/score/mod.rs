//! Discriminative scoring strategies.
//!
//! A `ScoreFunction` assigns a path a score (how well "graph contains this
//! path" separates failing from passing executions) and an admissible upper
//! bound on the score of any of the path's extensions. The search uses the
//! bound to stop expanding a branch.

mod fisher;
mod information_gain;

pub use fisher::FisherScore;
pub use information_gain::InformationGain;

use crate::collection::GraphCollection;
use crate::graph::Graph;
use crate::path::ExecutePath;
use crate::result::MiningResult;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub trait ScoreFunction {
    fn name(&self) -> &'static str;

    /// Capture collection-wide totals. Fails unless the collection has both
    /// passing and failing executions.
    fn init(&mut self, graphs: &GraphCollection, search_space: &Graph) -> Result<()>;

    /// Score `path` against `graphs`. The returned result owns the path,
    /// possibly annotated with cached candidates for its extensions.
    fn score(&mut self, graphs: &GraphCollection, path: ExecutePath) -> MiningResult;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Fisher,
    #[default]
    InformationGain,
}

impl ScoreKind {
    pub fn build(self) -> Box<dyn ScoreFunction> {
        match self {
            ScoreKind::Fisher => Box::new(FisherScore::new()),
            ScoreKind::InformationGain => Box::new(InformationGain::new()),
        }
    }
}

impl FromStr for ScoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fisher" => Ok(ScoreKind::Fisher),
            "information-gain" | "information_gain" | "ig" => Ok(ScoreKind::InformationGain),
            other => bail!("unknown score function `{other}` (expected `fisher` or `information-gain`)"),
        }
    }
}

impl fmt::Display for ScoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScoreKind::Fisher => "fisher",
            ScoreKind::InformationGain => "information-gain",
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::collection::GraphCollection;
    use crate::graph::{merge_graphs, Graph};
    use crate::path::ExecutePath;
    use crate::EdgeKey;
    use faultgraph_trace::{NodeInfo, NodeInfoCollection};

    pub fn single_function(n: u32) -> NodeInfoCollection {
        (0..n).map(|i| NodeInfo::new("main", i == 0, i + 1)).collect()
    }

    /// Build a collection from `(is_successful, nodes)` pairs over one function.
    pub fn collection(runs: &[(bool, &[u32])]) -> (GraphCollection, Graph) {
        let max = runs
            .iter()
            .flat_map(|(_, nodes)| nodes.iter().copied())
            .max()
            .unwrap_or(0);
        let infos = single_function(max + 1);
        let graphs = runs
            .iter()
            .map(|(ok, nodes)| Graph::from_nodes(*ok, nodes, &infos).unwrap())
            .collect();
        let collection = GraphCollection::from_graphs(graphs);
        let space = merge_graphs(collection.fails());
        (collection, space)
    }

    pub fn path(nodes: &[u32]) -> ExecutePath {
        let mut p = ExecutePath::new(EdgeKey::new(nodes[0], nodes[1]));
        for &n in &nodes[2..] {
            p = p.extend(n);
        }
        p
    }
}

//! Tarantula: per-node suspiciousness, the single-node analogue of path
//! scoring.

use crate::collection::GraphCollection;
use crate::numeric::approx_cmp;
use crate::NodeId;
use anyhow::Result;
use faultgraph_trace::NodeInfoCollection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Execution counts of one node across the suite.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NodeStats {
    /// Executions summed over successful runs
    pub success_count: u64,
    /// Executions summed over failing runs
    pub fail_count: u64,
    pub total_success: usize,
    pub total_fail: usize,
}

impl NodeStats {
    /// `(f/F) / (s/S + f/F)`; NaN when the node never executed.
    pub fn suspiciousness(&self) -> f64 {
        let fail_freq = self.fail_count as f64 / self.total_fail as f64;
        let success_freq = self.success_count as f64 / self.total_success as f64;
        fail_freq / (success_freq + fail_freq)
    }
}

/// Suspiciousness of every node id below `node_count`, indexed by id.
pub fn tarantula(graphs: &GraphCollection, node_count: usize) -> Result<Vec<f64>> {
    graphs.ensure_both_verdicts()?;

    let mut stats = vec![
        NodeStats {
            total_success: graphs.success_count(),
            total_fail: graphs.fail_count(),
            ..NodeStats::default()
        };
        node_count
    ];
    for graph in graphs.graphs() {
        for vector in graph.vectors() {
            let Some(node) = stats.get_mut(vector.id() as usize) else {
                continue;
            };
            let count = u64::from(vector.execute_count());
            if graph.is_successful() {
                node.success_count += count;
            } else {
                node.fail_count += count;
            }
        }
    }
    Ok(stats.iter().map(NodeStats::suspiciousness).collect())
}

/// One source line in the Tarantula ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineRank {
    pub rank: usize,
    pub line: u32,
    pub score: f64,
}

/// Rank source lines by their most suspicious node, best first.
///
/// Nodes that never executed (NaN) or lack metadata are left out.
pub fn rank_lines(scores: &[f64], infos: &NodeInfoCollection) -> Vec<LineRank> {
    let mut by_line: BTreeMap<u32, f64> = BTreeMap::new();
    for (id, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        let Some(info) = infos.get(id as NodeId) else {
            continue;
        };
        by_line
            .entry(info.line)
            .and_modify(|best| *best = best.max(score))
            .or_insert(score);
    }

    let mut lines: Vec<(u32, f64)> = by_line.into_iter().collect();
    lines.sort_by(|a, b| approx_cmp(b.1, a.1).then(a.0.cmp(&b.0)));
    lines
        .into_iter()
        .enumerate()
        .map(|(i, (line, score))| LineRank {
            rank: i + 1,
            line,
            score,
        })
        .collect()
}

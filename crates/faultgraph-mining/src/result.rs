use crate::edge::EdgeKey;
use crate::numeric::approx_cmp;
use crate::path::ExecutePath;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Average frequency of one path edge over successful and failing runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeAverages {
    pub edge: EdgeKey,
    pub success: f64,
    pub fail: f64,
}

/// A scored path.
///
/// Results are totally ordered best-first: descending score (within
/// `numeric::EPSILON`), then fewer edges, then lexicographically smaller
/// node sequence.
#[derive(Debug, Clone)]
pub struct MiningResult {
    pub path: ExecutePath,
    pub score: f64,
    /// Admissible upper bound on the score of any extension of `path`.
    pub max_possible_score: f64,
    /// Rendered report line, filled by `report::render_report`.
    pub text: Option<String>,
    /// Per-edge averages recorded by scorers that compute them.
    pub edge_averages: Vec<EdgeAverages>,
}

impl MiningResult {
    pub fn new(path: ExecutePath, score: f64, max_possible_score: f64) -> Self {
        Self {
            path,
            score,
            max_possible_score,
            text: None,
            edge_averages: Vec::new(),
        }
    }

    pub fn with_edge_averages(mut self, averages: Vec<EdgeAverages>) -> Self {
        self.edge_averages = averages;
        self
    }

    pub fn edge_count(&self) -> usize {
        self.path.len()
    }

    /// `Less` means `self` ranks before (better than) `other`.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        approx_cmp(other.score, self.score)
            .then_with(|| self.edge_count().cmp(&other.edge_count()))
            .then_with(|| self.path.nodes().cmp(other.path.nodes()))
    }
}

impl fmt::Display for MiningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {}", self.score, self.path)
    }
}

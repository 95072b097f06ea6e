//! Behavior-graph edges.
//!
//! Identity and statistics are separate types: `EdgeKey` is the only thing
//! that goes into sets, maps and subset/superset tests, while `EdgeStats`
//! holds the mutable counters and lives in the owning `Vector`. Updating
//! counters can never disturb hashing or equality.

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A directed transition between two trace nodes, compared by endpoints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from: NodeId,
    pub to: NodeId,
}

impl EdgeKey {
    pub const fn new(from: NodeId, to: NodeId) -> Self {
        Self { from, to }
    }
}

impl From<(NodeId, NodeId)> for EdgeKey {
    fn from((from, to): (NodeId, NodeId)) -> Self {
        Self::new(from, to)
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Observed execution statistics of one edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStats {
    /// How often the transition was taken.
    pub execute_count: u32,
    /// Branch probability within the source's function, or 1.0 for
    /// call-site transfers. NaN until assigned.
    pub frequency: f64,
}

impl Default for EdgeStats {
    fn default() -> Self {
        Self {
            execute_count: 0,
            frequency: f64::NAN,
        }
    }
}

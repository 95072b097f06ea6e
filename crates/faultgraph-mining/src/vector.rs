use crate::edge::{EdgeKey, EdgeStats};
use crate::NodeId;
use std::collections::BTreeMap;

/// A behavior-graph node: a trace node id with its outgoing edges.
///
/// Out-edges are keyed by target id and iterate in ascending target order.
#[derive(Debug, Clone)]
pub struct Vector {
    id: NodeId,
    execute_count: u32,
    out_edges: BTreeMap<NodeId, EdgeStats>,
}

impl Vector {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            execute_count: 0,
            out_edges: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// How many times the node occurred in the execution.
    pub fn execute_count(&self) -> u32 {
        self.execute_count
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    pub fn edge(&self, to: NodeId) -> Option<&EdgeStats> {
        self.out_edges.get(&to)
    }

    pub fn out_edges(&self) -> impl Iterator<Item = (EdgeKey, &EdgeStats)> + '_ {
        self.out_edges
            .iter()
            .map(move |(to, stats)| (EdgeKey::new(self.id, *to), stats))
    }

    pub fn successors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.out_edges.keys().copied()
    }

    pub(crate) fn record_visit(&mut self) {
        self.execute_count += 1;
    }

    pub(crate) fn get_or_add_edge(&mut self, to: NodeId) -> &mut EdgeStats {
        self.out_edges.entry(to).or_default()
    }

    pub(crate) fn out_edges_mut(&mut self) -> impl Iterator<Item = (&NodeId, &mut EdgeStats)> {
        self.out_edges.iter_mut()
    }
}

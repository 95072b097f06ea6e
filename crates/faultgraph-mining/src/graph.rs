//! Behavior graphs.
//!
//! A `Graph` is built either from a single execution trace (one graph per
//! test run) or by merging the edge sets of several graphs (the failure
//! search space).
//!
//! Edge frequencies of a trace graph encode branch probabilities:
//!
//! - if any out-edge of a node crosses into a different function, the node
//!   is a call site / structural transfer and **every** out-edge gets 1.0;
//! - otherwise each out-edge gets `execute_count / sum(sibling counts)`.

use crate::edge::{EdgeKey, EdgeStats};
use crate::vector::Vector;
use crate::NodeId;
use ahash::AHashSet;
use anyhow::{anyhow, Result};
use faultgraph_trace::{NodeInfoCollection, Trace};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    vectors: BTreeMap<NodeId, Vector>,
    edges: AHashSet<EdgeKey>,
    is_successful: bool,
}

impl Graph {
    /// Build the behavior graph of one execution, consuming the trace.
    pub fn from_trace(trace: &mut Trace, infos: &NodeInfoCollection) -> Result<Self> {
        let is_successful = trace.is_successful();
        let mut graph = Self {
            is_successful,
            ..Self::default()
        };

        let mut last: Option<NodeId> = None;
        for node in trace.nodes() {
            let node = node?;
            if infos.get(node).is_none() {
                return Err(anyhow!(
                    "trace references node {node}, but only {} nodes have metadata",
                    infos.len()
                ));
            }
            graph.visit(node);
            if let Some(prev) = last {
                graph.add_edge(prev, node);
            }
            last = Some(node);
        }

        graph.assign_frequencies(infos);
        Ok(graph)
    }

    /// Convenience constructor over an in-memory node sequence.
    pub fn from_nodes(
        is_successful: bool,
        nodes: &[NodeId],
        infos: &NodeInfoCollection,
    ) -> Result<Self> {
        Self::from_trace(&mut Trace::from_nodes(is_successful, nodes), infos)
    }

    fn visit(&mut self, node: NodeId) {
        self.vectors
            .entry(node)
            .or_insert_with(|| Vector::new(node))
            .record_visit();
    }

    /// Insert `from -> to` (idempotent on the key), bumping its count.
    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.vectors
            .entry(to)
            .or_insert_with(|| Vector::new(to));
        let source = self
            .vectors
            .entry(from)
            .or_insert_with(|| Vector::new(from));
        source.get_or_add_edge(to).execute_count += 1;
        self.edges.insert(EdgeKey::new(from, to));
    }

    fn assign_frequencies(&mut self, infos: &NodeInfoCollection) {
        for vector in self.vectors.values_mut() {
            let Some(function) = infos.get(vector.id()).map(|i| i.owned_function.as_str()) else {
                continue;
            };
            let crosses_function = vector.successors().any(|to| {
                infos
                    .get(to)
                    .is_some_and(|info| info.owned_function != function)
            });

            if crosses_function {
                for (_, stats) in vector.out_edges_mut() {
                    stats.frequency = 1.0;
                }
                continue;
            }

            let total: u64 = vector
                .out_edges()
                .map(|(_, stats)| u64::from(stats.execute_count))
                .sum();
            if total > 0 {
                for (_, stats) in vector.out_edges_mut() {
                    stats.frequency = f64::from(stats.execute_count) / total as f64;
                }
            }
        }
    }

    /// Whether this graph comes from a passing test run.
    pub fn is_successful(&self) -> bool {
        self.is_successful
    }

    pub fn vectors(&self) -> impl Iterator<Item = &Vector> + '_ {
        self.vectors.values()
    }

    pub fn vector(&self, id: NodeId) -> Option<&Vector> {
        self.vectors.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.vectors.len()
    }

    pub fn edges(&self) -> &AHashSet<EdgeKey> {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges in ascending `(from, to)` order.
    pub fn sorted_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.vectors
            .values()
            .flat_map(|v| v.out_edges().map(|(key, _)| key))
    }

    pub fn edge(&self, key: EdgeKey) -> Option<&EdgeStats> {
        self.vectors.get(&key.from).and_then(|v| v.edge(key.to))
    }

    pub fn contains_edge(&self, key: &EdgeKey) -> bool {
        self.edges.contains(key)
    }

    /// Superset test: does this graph contain every edge in `edges`?
    pub fn contains_all<'a>(&self, edges: impl IntoIterator<Item = &'a EdgeKey>) -> bool {
        edges.into_iter().all(|e| self.edges.contains(e))
    }
}

/// Union of the edge sets of `graphs`, ignoring execution statistics.
///
/// The merged graph is labelled as failing; its edge counts record how many
/// input graphs contain each edge and its frequencies stay unassigned.
pub fn merge_graphs<'a>(graphs: impl IntoIterator<Item = &'a Graph>) -> Graph {
    graphs
        .into_iter()
        .flat_map(|g| g.sorted_edges())
        .fold(Graph::default(), |mut merged, key| {
            merged.add_edge(key.from, key.to);
            merged
        })
}

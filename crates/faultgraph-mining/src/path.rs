//! Search paths.
//!
//! An `ExecutePath` is an immutable simple path: its node sequence plus the
//! induced edge set. `extend` produces a new path and leaves the original
//! untouched.
//!
//! Each path may carry a `CandidateSet`: the successful/failing graphs known
//! to contain the path, cached by the scorer and inherited by extensions.
//! A child's candidates are always a subset of its parent's, so scoring an
//! extension only needs to re-filter the parent's set.

use crate::edge::EdgeKey;
use crate::NodeId;
use roaring::RoaringBitmap;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Indices (into `GraphCollection::success`/`fail`) of graphs containing a path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateSet {
    pub successes: RoaringBitmap,
    pub fails: RoaringBitmap,
}

impl CandidateSet {
    /// Every graph of a collection with the given partition sizes.
    pub fn full(success_count: usize, fail_count: usize) -> Self {
        Self {
            successes: (0..success_count as u32).collect(),
            fails: (0..fail_count as u32).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.successes.is_empty() && self.fails.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ExecutePath {
    edges: BTreeSet<EdgeKey>,
    nodes: Vec<NodeId>,
    data: Option<Arc<CandidateSet>>,
}

impl ExecutePath {
    /// A single-edge path.
    pub fn new(edge: EdgeKey) -> Self {
        Self {
            edges: BTreeSet::from([edge]),
            nodes: vec![edge.from, edge.to],
            data: None,
        }
    }

    pub fn edges(&self) -> &BTreeSet<EdgeKey> {
        &self.edges
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Path length in edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn first_node(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn last_node(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// New path with `node` appended (edge `last -> node` added).
    ///
    /// The cached candidate set is inherited.
    pub fn extend(&self, node: NodeId) -> ExecutePath {
        let mut edges = self.edges.clone();
        edges.insert(EdgeKey::new(self.last_node(), node));
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.extend_from_slice(&self.nodes);
        nodes.push(node);
        ExecutePath {
            edges,
            nodes,
            data: self.data.clone(),
        }
    }

    pub fn data(&self) -> Option<&Arc<CandidateSet>> {
        self.data.as_ref()
    }

    pub fn with_data(mut self, data: Arc<CandidateSet>) -> Self {
        self.data = Some(data);
        self
    }

    /// Whether one path's edge set contains the other's.
    pub fn is_nested_with(&self, other: &ExecutePath) -> bool {
        self.edges.is_subset(&other.edges) || self.edges.is_superset(&other.edges)
    }
}

impl PartialEq for ExecutePath {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes && self.edges == other.edges
    }
}

impl Eq for ExecutePath {}

impl fmt::Display for ExecutePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                f.write_str("->")?;
            }
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

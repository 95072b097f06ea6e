//! Static per-node metadata produced by the instrumenter.
//!
//! File format: one node per line, in id order (line `i` describes node `i`):
//!
//! ```text
//! main true 3
//! main false 4
//! helper true 11
//! ```

use crate::sections::parse_node_info_line;
use crate::{NodeId, TraceError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Metadata for one instrumented statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Name of the function that owns the statement.
    pub owned_function: String,
    /// Whether this is the entry node of its function (a call target).
    pub is_first_node: bool,
    /// 1-based source line.
    pub line: u32,
}

impl NodeInfo {
    pub fn new(owned_function: impl Into<String>, is_first_node: bool, line: u32) -> Self {
        Self {
            owned_function: owned_function.into(),
            is_first_node,
            line,
        }
    }
}

/// Node metadata indexed by `NodeId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfoCollection {
    infos: Vec<NodeInfo>,
}

impl NodeInfoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Append a node, returning its id.
    pub fn add(&mut self, info: NodeInfo) -> NodeId {
        let id = self.infos.len() as NodeId;
        self.infos.push(info);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeInfo> {
        self.infos.get(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeInfo)> + '_ {
        self.infos
            .iter()
            .enumerate()
            .map(|(i, info)| (i as NodeId, info))
    }

    /// All node ids instrumented on `line`, ascending.
    pub fn ids_for_line(&self, line: u32) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, info)| info.line == line)
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of distinct source lines carrying at least one node.
    pub fn executable_statement_count(&self) -> usize {
        self.infos
            .iter()
            .map(|info| info.line)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Parse one node per line. Blank lines are only allowed at the end,
    /// since an interior one would shift every later id.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, TraceError> {
        let mut out = Self::new();
        let mut blank = None;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                blank.get_or_insert(i + 1);
                continue;
            }
            if let Some(blank) = blank {
                return Err(TraceError::NodeInfo {
                    line: blank,
                    message: "blank line before the last node".to_string(),
                });
            }
            let (function, is_first, src_line) =
                parse_node_info_line(&line).map_err(|message| TraceError::NodeInfo {
                    line: i + 1,
                    message,
                })?;
            out.add(NodeInfo::new(function, is_first, src_line));
        }
        Ok(out)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), TraceError> {
        for info in &self.infos {
            writeln!(
                out,
                "{} {} {}",
                info.owned_function, info.is_first_node, info.line
            )?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TraceError> {
        let file = File::create(path.as_ref())?;
        self.write_to(BufWriter::new(file))
    }
}

impl std::ops::Index<NodeId> for NodeInfoCollection {
    type Output = NodeInfo;

    fn index(&self, id: NodeId) -> &NodeInfo {
        &self.infos[id as usize]
    }
}

impl FromIterator<NodeInfo> for NodeInfoCollection {
    fn from_iter<I: IntoIterator<Item = NodeInfo>>(iter: I) -> Self {
        Self {
            infos: iter.into_iter().collect(),
        }
    }
}

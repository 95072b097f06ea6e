//! Call/return validity of search paths.
//!
//! Walking a path pairwise:
//!
//! - same owning function: ordinary control flow, no stack change;
//! - different function, target is its function's first node: a **call**,
//!   push the caller's function;
//! - different function, target is not a first node: a **return**. Pop and
//!   require the popped caller to be the target's function. With an empty
//!   stack the return leaves the path's visible call context and is accepted.

use crate::path::ExecutePath;
use faultgraph_trace::NodeInfoCollection;

pub struct PathChecker<'a> {
    infos: &'a NodeInfoCollection,
    callers: Vec<&'a str>,
}

impl<'a> PathChecker<'a> {
    pub fn new(infos: &'a NodeInfoCollection) -> Self {
        Self {
            infos,
            callers: Vec::new(),
        }
    }

    /// Nodes without metadata make the path invalid.
    pub fn check(&mut self, path: &ExecutePath) -> bool {
        self.callers.clear();

        let nodes = path.nodes();
        let Some(mut last) = nodes.first().and_then(|&n| self.infos.get(n)) else {
            return false;
        };

        for &node in &nodes[1..] {
            let Some(current) = self.infos.get(node) else {
                return false;
            };
            if current.owned_function == last.owned_function {
                continue;
            }
            if current.is_first_node {
                self.callers.push(last.owned_function.as_str());
            } else if let Some(caller) = self.callers.pop() {
                if caller != current.owned_function {
                    return false;
                }
            }
            last = current;
        }
        true
    }
}

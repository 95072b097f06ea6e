//! Faultgraph: Behavior-Graph Mining for Fault Localization
//!
//! Given execution traces of passing and failing test runs, find short edge
//! sequences (paths in a behavior graph) that best discriminate failing
//! executions from passing ones, and rank them as candidate bug locations.
//!
//! Pipeline:
//!
//! ```text
//! TraceSet + NodeInfoCollection
//!        │
//!        ▼
//! GraphCollection ── one behavior Graph per execution (successes / fails)
//!        │
//!        ▼
//! GraphMining ── search space = edge-union of failing graphs
//!        │        BFS over ExecutePaths, PathChecker filters call/return
//!        │        ScoreFunction (Fisher | InformationGain) scores + bounds
//!        ▼
//! top-k MiningResults (dominance-pruned, best first)
//! ```
//!
//! ## Module Organization
//!
//! - `edge`, `vector`, `graph`: behavior graphs built from traces
//! - `collection`: per-execution graphs partitioned by verdict
//! - `path`: immutable search paths and their cached candidate sets
//! - `checker`: call/return validity of paths
//! - `score`: discriminative scoring strategies
//! - `result`, `mining`: ranking and the branch-and-bound search
//! - `tarantula`, `report`: per-node companion ranking and text rendering

pub mod checker;
pub mod collection;
pub mod config;
pub mod edge;
pub mod graph;
pub mod mining;
pub mod numeric;
pub mod path;
pub mod report;
pub mod result;
pub mod score;
pub mod tarantula;
pub mod vector;

pub use checker::PathChecker;
pub use collection::GraphCollection;
pub use config::MiningConfig;
pub use edge::{EdgeKey, EdgeStats};
pub use graph::{merge_graphs, Graph};
pub use mining::{GraphMining, MiningOutcome, MiningStats};
pub use path::{CandidateSet, ExecutePath};
pub use report::{render_report, render_tarantula};
pub use result::{EdgeAverages, MiningResult};
pub use score::{FisherScore, InformationGain, ScoreFunction, ScoreKind};
pub use tarantula::{rank_lines, tarantula, LineRank, NodeStats};
pub use vector::Vector;

pub use faultgraph_trace::{NodeId, NodeInfo, NodeInfoCollection, Trace, TraceSet};

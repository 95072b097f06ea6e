//! Faultgraph trace inputs
//!
//! The mining engine consumes exactly two data products from the
//! instrumentation/execution side of the pipeline:
//!
//! - an ordered, **single-pass** collection of execution traces
//!   (`TraceSet` → `Trace`), each a sequence of instrumented-statement ids
//!   plus a pass/fail verdict, and
//! - per-node static metadata (`NodeInfoCollection`): owning function,
//!   whether the node is its function's entry node, and its source line.
//!
//! This crate defines both types and their line-oriented text formats
//! (readers and writers). It knows nothing about behavior graphs.
//!
//! Notes:
//! - Traces are forward-only. A `TraceSet` yields each `Trace` once, and a
//!   `Trace` hands out its node iterator once; re-reading yields nothing.
//! - Malformed input is fatal (`TraceError`): a truncated trace would
//!   otherwise corrupt graph construction silently.

pub mod error;
pub mod node_info;
mod sections;
pub mod trace_set;

pub use error::TraceError;
pub use node_info::{NodeInfo, NodeInfoCollection};
pub use trace_set::{RecordedTrace, Trace, TraceNodes, TraceSet, TraceSetHeader, TraceSetWriter};

/// Identifier of an instrumented statement (a behavior-graph node).
pub type NodeId = u32;

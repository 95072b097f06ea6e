//! Loading a test suite from disk.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use faultgraph_mining::GraphCollection;
use faultgraph_trace::{NodeInfoCollection, TraceSet};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct SuiteArgs {
    /// Trace set file (`[TestCaseCount : N]` header, then one record per test)
    #[arg(long)]
    pub traces: PathBuf,
    /// Node metadata file (`<function> <is_first_node> <line>` per node id)
    #[arg(long)]
    pub nodes: PathBuf,
}

pub struct Suite {
    pub infos: NodeInfoCollection,
    pub graphs: GraphCollection,
    pub instrument_level: String,
}

impl SuiteArgs {
    pub fn load(&self) -> Result<Suite> {
        let infos = NodeInfoCollection::load(&self.nodes)
            .with_context(|| format!("failed to load node metadata {}", self.nodes.display()))?;
        let traces = TraceSet::from_path(&self.traces)
            .with_context(|| format!("failed to open trace set {}", self.traces.display()))?;
        let instrument_level = traces.instrument_level().to_string();
        let graphs = GraphCollection::from_trace_set(traces, &infos)
            .with_context(|| format!("in trace set {}", self.traces.display()))?;
        tracing::info!(
            traces = graphs.len(),
            successes = graphs.success_count(),
            fails = graphs.fail_count(),
            nodes = infos.len(),
            "loaded test suite"
        );
        Ok(Suite {
            infos,
            graphs,
            instrument_level,
        })
    }
}

/// Lines of the instrumented source file, for rendering statements.
pub fn load_source(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read source {}", path.display()))?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Write `contents` to `out` when given, otherwise to stdout.
pub fn emit(contents: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => print!("{contents}"),
    }
    Ok(())
}

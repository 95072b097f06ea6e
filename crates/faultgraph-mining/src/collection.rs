use crate::graph::Graph;
use anyhow::{bail, Result};
use faultgraph_trace::{NodeInfoCollection, Trace, TraceSet};
use std::io::BufRead;

/// All per-execution behavior graphs of a test suite, partitioned by verdict.
///
/// Graphs are stored once in trace order; `successes`/`fails` index into
/// them and preserve the relative order within each partition.
#[derive(Debug, Clone, Default)]
pub struct GraphCollection {
    graphs: Vec<Graph>,
    successes: Vec<usize>,
    fails: Vec<usize>,
}

impl GraphCollection {
    /// Build one graph per trace, reading the trace set exactly once.
    pub fn from_trace_set<R: BufRead>(traces: TraceSet<R>, infos: &NodeInfoCollection) -> Result<Self> {
        let header = traces.header().clone();
        let collection = Self::from_traces(traces, infos)?;

        if collection.len() != header.count
            || collection.success_count() != header.success_count
            || collection.fail_count() != header.fail_count
        {
            tracing::warn!(
                declared_count = header.count,
                declared_successes = header.success_count,
                declared_fails = header.fail_count,
                successes = collection.success_count(),
                fails = collection.fail_count(),
                "trace set header disagrees with its records"
            );
        }
        Ok(collection)
    }

    pub fn from_traces<I, E>(traces: I, infos: &NodeInfoCollection) -> Result<Self>
    where
        I: IntoIterator<Item = std::result::Result<Trace, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut graphs = Vec::new();
        for trace in traces {
            let mut trace = trace?;
            graphs.push(Graph::from_trace(&mut trace, infos)?);
        }
        let collection = Self::from_graphs(graphs);
        tracing::debug!(
            graphs = collection.len(),
            successes = collection.success_count(),
            fails = collection.fail_count(),
            "built behavior graphs"
        );
        Ok(collection)
    }

    pub fn from_graphs(graphs: Vec<Graph>) -> Self {
        let (successes, fails): (Vec<usize>, Vec<usize>) =
            (0..graphs.len()).partition(|&i| graphs[i].is_successful());
        Self {
            graphs,
            successes,
            fails,
        }
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Every graph, in trace order.
    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn fail_count(&self) -> usize {
        self.fails.len()
    }

    pub fn successes(&self) -> impl ExactSizeIterator<Item = &Graph> + '_ {
        self.successes.iter().map(|&i| &self.graphs[i])
    }

    pub fn fails(&self) -> impl ExactSizeIterator<Item = &Graph> + '_ {
        self.fails.iter().map(|&i| &self.graphs[i])
    }

    /// The `i`-th successful graph.
    pub fn success(&self, i: usize) -> &Graph {
        &self.graphs[self.successes[i]]
    }

    /// The `i`-th failing graph.
    pub fn fail(&self, i: usize) -> &Graph {
        &self.graphs[self.fails[i]]
    }

    /// Fail unless the suite has at least one passing and one failing run.
    ///
    /// Every per-verdict average divides by these counts.
    pub fn ensure_both_verdicts(&self) -> Result<()> {
        if self.successes.is_empty() || self.fails.is_empty() {
            bail!(
                "mining needs at least one passing and one failing execution (got {} passing, {} failing)",
                self.success_count(),
                self.fail_count()
            );
        }
        Ok(())
    }
}

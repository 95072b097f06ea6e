//! Faultgraph CLI
//!
//! Command-line interface for:
//! - Mining discriminative behavior-graph paths from passing/failing traces
//! - Ranking source lines by Tarantula suspiciousness
//! - Summarizing a test suite and its failure search space

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use faultgraph_mining::{
    merge_graphs, rank_lines, render_report, render_tarantula, tarantula, EdgeAverages,
    GraphMining, MiningConfig, MiningResult, MiningStats, NodeId, ScoreKind,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod inputs;

use inputs::{emit, load_source, SuiteArgs};

#[derive(Parser)]
#[command(name = "faultgraph")]
#[command(
    author,
    version,
    about = "Faultgraph: behavior-graph mining for fault localization"
)]
struct Cli {
    /// Log progress (info level)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Log search internals (debug level)
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank edge paths that separate failing runs from passing ones.
    Mine {
        #[command(flatten)]
        suite: SuiteArgs,
        /// Instrumented source file, used to print statements instead of node ids
        #[arg(long)]
        source: Option<PathBuf>,
        /// Mining config JSON (flags below override it)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Maximum number of results
        #[arg(short = 'k', long = "limit")]
        limit: Option<usize>,
        /// Maximum path length in edges
        #[arg(long)]
        max_edges: Option<usize>,
        /// Scoring strategy: `fisher` or `information-gain`
        #[arg(long)]
        score: Option<ScoreKind>,
        /// Stop after dequeuing this many paths
        #[arg(long)]
        budget: Option<usize>,
        /// Write the report here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Emit JSON instead of the text report
        #[arg(long)]
        json: bool,
    },

    /// Rank source lines by Tarantula suspiciousness.
    Tarantula {
        #[command(flatten)]
        suite: SuiteArgs,
        /// Write the table here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Print suite and search-space counts.
    Stats {
        #[command(flatten)]
        suite: SuiteArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    match cli.command {
        Commands::Mine {
            suite,
            source,
            config,
            limit,
            max_edges,
            score,
            budget,
            out,
            json,
        } => {
            let mut config = match config {
                Some(path) => MiningConfig::load(path)?,
                None => MiningConfig::default(),
            };
            if let Some(limit) = limit {
                config.result_limit = limit;
            }
            if let Some(max_edges) = max_edges {
                config.max_path_edges = max_edges;
            }
            if let Some(score) = score {
                config.score_function = score;
            }
            if budget.is_some() {
                config.expansion_budget = budget;
            }
            cmd_mine(&suite, source, config, out, json)?;
        }
        Commands::Tarantula { suite, out } => cmd_tarantula(&suite, out)?,
        Commands::Stats { suite } => cmd_stats(&suite)?,
    }
    Ok(())
}

/// `--debug` > `--verbose` > `RUST_LOG` > warn.
fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Serialize)]
struct MineReport<'a> {
    score_function: ScoreKind,
    stats: &'a MiningStats,
    results: Vec<ResultView<'a>>,
}

/// JSON view of a result. Infinite scores serialize as `null`.
#[derive(Serialize)]
struct ResultView<'a> {
    rank: usize,
    score: f64,
    max_possible_score: f64,
    nodes: &'a [NodeId],
    text: Option<&'a str>,
    edge_averages: &'a [EdgeAverages],
}

impl<'a> ResultView<'a> {
    fn new(rank: usize, result: &'a MiningResult) -> Self {
        Self {
            rank,
            score: result.score,
            max_possible_score: result.max_possible_score,
            nodes: result.path.nodes(),
            text: result.text.as_deref(),
            edge_averages: &result.edge_averages,
        }
    }
}

fn cmd_mine(
    suite: &SuiteArgs,
    source: Option<PathBuf>,
    config: MiningConfig,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    config.validate()?;
    let suite = suite.load()?;
    let source_lines = match source {
        Some(path) => load_source(&path)?,
        None => Vec::new(),
    };

    let score_function = config.score_function;
    let outcome = GraphMining::from_config(&suite.graphs, &suite.infos, config).mine()?;
    let mut results = outcome.results;
    let lines = render_report(&mut results, &suite.infos, &source_lines);

    eprintln!(
        "{} {} result(s) with {} ({} paths scored, {} admitted)",
        "Mined".green().bold(),
        results.len(),
        score_function,
        outcome.stats.scored,
        outcome.stats.admitted
    );
    if outcome.stats.budget_exhausted {
        eprintln!(
            "{} expansion budget exhausted after {} paths; results are partial",
            "warning:".yellow().bold(),
            outcome.stats.dequeued
        );
    }

    let contents = if json {
        let report = MineReport {
            score_function,
            stats: &outcome.stats,
            results: results
                .iter()
                .enumerate()
                .map(|(i, r)| ResultView::new(i + 1, r))
                .collect(),
        };
        let mut text = serde_json::to_string_pretty(&report)?;
        text.push('\n');
        text
    } else if lines.is_empty() {
        eprintln!("{}", "no discriminative paths found".yellow());
        String::new()
    } else {
        lines.join("\n") + "\n"
    };
    emit(&contents, out.as_deref())
}

fn cmd_tarantula(suite: &SuiteArgs, out: Option<PathBuf>) -> Result<()> {
    let suite = suite.load()?;
    let scores = tarantula(&suite.graphs, suite.infos.len())?;
    let ranking = rank_lines(&scores, &suite.infos);

    let mut contents = String::from("rank\tline\tscore\n");
    for row in render_tarantula(&ranking) {
        contents.push_str(&row);
        contents.push('\n');
    }
    emit(&contents, out.as_deref())
}

fn cmd_stats(suite: &SuiteArgs) -> Result<()> {
    let suite = suite.load()?;
    let space = merge_graphs(suite.graphs.fails());

    println!("{}", "Test suite".green().bold());
    println!("  instrument level:      {}", suite.instrument_level);
    println!("  traces:                {}", suite.graphs.len());
    println!("  successes:             {}", suite.graphs.success_count());
    println!("  fails:                 {}", suite.graphs.fail_count());
    println!("  nodes:                 {}", suite.infos.len());
    println!(
        "  executable statements: {}",
        suite.infos.executable_statement_count()
    );
    println!("{}", "Failure search space".green().bold());
    println!("  nodes:                 {}", space.node_count());
    println!("  edges:                 {}", space.edge_count());
    Ok(())
}

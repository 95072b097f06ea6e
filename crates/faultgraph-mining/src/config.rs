use crate::score::ScoreKind;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_RESULT_LIMIT: usize = 100;
pub const DEFAULT_MAX_PATH_EDGES: usize = 5;

/// Configuration for a mining run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Maximum number of retained results (k)
    pub result_limit: usize,
    /// Paths with more edges are discarded unscored
    pub max_path_edges: usize,
    /// Scoring strategy
    pub score_function: ScoreKind,
    /// Stop after dequeuing this many paths
    pub expansion_budget: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
            max_path_edges: DEFAULT_MAX_PATH_EDGES,
            score_function: ScoreKind::default(),
            expansion_budget: None,
        }
    }
}

impl MiningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.result_limit == 0 {
            bail!("result_limit must be at least 1");
        }
        if self.max_path_edges == 0 {
            bail!("max_path_edges must be at least 1");
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid mining config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }
}

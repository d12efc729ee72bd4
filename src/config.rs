//! Engine configuration.
//!
//! Every tunable the algorithms use lives here instead of in module-level
//! constants, so callers can load a `killweb.toml` and pass the result
//! into each engine call. Defaults reproduce the stock behavior.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Weights for blending the six network metrics into the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricWeights {
    pub connectivity: f64,
    pub coverage: f64,
    pub redundancy: f64,
    pub robustness: f64,
    pub efficiency: f64,
    pub reliability: f64,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self {
            connectivity: 0.20,
            coverage: 0.15,
            redundancy: 0.15,
            robustness: 0.20,
            efficiency: 0.15,
            reliability: 0.15,
        }
    }
}

/// Tunables for the network evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub weights: MetricWeights,
    /// Side length of one coverage sampling cell.
    pub coverage_grid_size: f64,
    /// Margin added around the node bounding box when sampling coverage.
    pub coverage_margin: f64,
    /// Average degree at which redundancy saturates to 1.0.
    pub target_degree: f64,
    /// How many of the highest-degree nodes the robustness simulation removes.
    pub robustness_top_k: usize,
    /// Coverage below this ratio is flagged as a vulnerability.
    pub coverage_warning_threshold: f64,
    /// Networks smaller than this get a generic grow-the-network suggestion.
    pub min_node_count: usize,
    /// Edge density below this ratio gets a layout suggestion.
    pub density_warning_threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            weights: MetricWeights::default(),
            coverage_grid_size: 20.0,
            coverage_margin: 100.0,
            target_degree: 3.0,
            robustness_top_k: 3,
            coverage_warning_threshold: 0.5,
            min_node_count: 5,
            density_warning_threshold: 0.3,
        }
    }
}

/// Tunables for kill-chain search.
///
/// The canonical chain is always four nodes deep; `max_chains` bounds the
/// enumeration on pathological dense graphs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_chains: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { max_chains: 1000 }
    }
}

/// Top-level engine configuration, loadable from `killweb.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub evaluation: EvaluationConfig,
    pub search: SearchConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

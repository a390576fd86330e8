//! Hybrid search configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::default_true;
use crate::error::ConfigError;

/// Search section: orchestration plus fusion parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub hybrid: HybridSearchConfig,

    #[serde(default)]
    pub fusion: FusionConfig,
}

/// Supported fusion algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    ReciprocalRank,
    Weighted,
}

impl FusionMethod {
    /// Accepted spellings, for error messages.
    pub const NAMES: &'static [&'static str] =
        &["rrf", "reciprocal_rank", "reciprocal-rank", "weighted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReciprocalRank => "rrf",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for FusionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FusionMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rrf" | "reciprocal_rank" | "reciprocal-rank" => Ok(Self::ReciprocalRank),
            "weighted" => Ok(Self::Weighted),
            other => Err(ConfigError::invalid_value(
                "search.hybrid.fusion_method",
                format!(
                    "unknown fusion method '{}', valid values: {:?}",
                    other,
                    Self::NAMES
                ),
            )),
        }
    }
}

/// Orchestration settings for the hybrid searcher.
///
/// `fusion_method` stays a string here and is parsed when the searcher is
/// built, so an unknown value fails construction instead of config loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HybridSearchConfig {
    #[serde(default = "default_fusion_method")]
    pub fusion_method: String,

    #[serde(default = "default_true")]
    pub enable_dense: bool,

    #[serde(default = "default_true")]
    pub enable_sparse: bool,

    /// Issue dense and sparse calls concurrently.
    #[serde(default = "default_true")]
    pub parallel_execution: bool,

    #[serde(default = "default_top_k_retriever")]
    pub top_k_dense: usize,

    #[serde(default = "default_top_k_retriever")]
    pub top_k_sparse: usize,

    #[serde(default = "default_top_k_final")]
    pub top_k_final: usize,

    /// Dense results scoring below this are dropped before fusion.
    #[serde(default)]
    pub dense_threshold: f32,

    /// Sparse results scoring below this are dropped before fusion.
    #[serde(default)]
    pub sparse_threshold: f32,
}

impl HybridSearchConfig {
    pub fn with_fusion_method(mut self, method: impl Into<String>) -> Self {
        self.fusion_method = method.into();
        self
    }

    pub fn dense_only(mut self) -> Self {
        self.enable_dense = true;
        self.enable_sparse = false;
        self
    }

    pub fn sparse_only(mut self) -> Self {
        self.enable_dense = false;
        self.enable_sparse = true;
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel_execution = false;
        self
    }

    pub fn with_thresholds(mut self, dense: f32, sparse: f32) -> Self {
        self.dense_threshold = dense;
        self.sparse_threshold = sparse;
        self
    }

    pub fn with_top_k(mut self, dense: usize, sparse: usize, final_k: usize) -> Self {
        self.top_k_dense = dense;
        self.top_k_sparse = sparse;
        self.top_k_final = final_k;
        self
    }

    /// Parse `fusion_method`.
    pub fn method(&self) -> Result<FusionMethod, ConfigError> {
        self.fusion_method.parse()
    }
}

impl Default for HybridSearchConfig {
    fn default() -> Self {
        Self {
            fusion_method: default_fusion_method(),
            enable_dense: true,
            enable_sparse: true,
            parallel_execution: true,
            top_k_dense: default_top_k_retriever(),
            top_k_sparse: default_top_k_retriever(),
            top_k_final: default_top_k_final(),
            dense_threshold: 0.0,
            sparse_threshold: 0.0,
        }
    }
}

fn default_fusion_method() -> String {
    "rrf".to_string()
}

fn default_top_k_retriever() -> usize {
    20
}

fn default_top_k_final() -> usize {
    10
}

/// Parameters shared by the fusion algorithms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// RRF parameter k (typically 60). Larger values flatten rank decay.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Weight of dense scores in weighted fusion.
    #[serde(default = "default_weight")]
    pub dense_weight: f32,

    /// Weight of sparse scores in weighted fusion. Weights need not sum to 1.
    #[serde(default = "default_weight")]
    pub sparse_weight: f32,

    /// Cap on the length of a fused list.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            rrf_k: default_rrf_k(),
            dense_weight: default_weight(),
            sparse_weight: default_weight(),
            max_results: default_max_results(),
        }
    }
}

impl FusionConfig {
    pub fn with_weights(mut self, dense: f32, sparse: f32) -> Self {
        self.dense_weight = dense;
        self.sparse_weight = sparse;
        self
    }

    pub fn with_rrf_k(mut self, k: f32) -> Self {
        self.rrf_k = k;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_weight() -> f32 {
    0.5
}

fn default_max_results() -> usize {
    100
}

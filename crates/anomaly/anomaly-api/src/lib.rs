//! Graph Anomaly Detection API
//!
//! Configuration types for the spectral control-chart detector and the
//! embedders it drives.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// Re-export SPI types
pub use anomaly_spi::{
    AnomalyError, AnomalyResult, ControlChart, EmbeddingPair, GraphAnomalyDiagnostics,
    PairEmbedder, Result, VertexAnomaly, VertexAnomalyDiagnostics,
};

/// Smallest moving window the control chart supports.
pub const MIN_TIME_WINDOW: usize = 3;

// ============================================================================
// Embedding Method
// ============================================================================

/// Joint embedding strategy applied to each consecutive pair of graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EmbedMethod {
    /// Omnibus embedding.
    #[default]
    Omni,
    /// Multiple adjacency spectral embedding.
    Mase,
}

impl EmbedMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbedMethod::Omni => "omni",
            EmbedMethod::Mase => "mase",
        }
    }
}

impl fmt::Display for EmbedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmbedMethod {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "omni" => Ok(EmbedMethod::Omni),
            "mase" => Ok(EmbedMethod::Mase),
            _ => Err(AnomalyError::invalid_parameter(
                "method",
                format!("must be one of {{omni, mase}}, not {}", s),
            )),
        }
    }
}

impl TryFrom<String> for EmbedMethod {
    type Error = AnomalyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EmbedMethod> for String {
    fn from(method: EmbedMethod) -> Self {
        method.as_str().to_string()
    }
}

// ============================================================================
// SVD Solver
// ============================================================================

/// Singular value decomposition solver used by the embedders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SvdAlgorithm {
    /// Exact decomposition of the whole matrix.
    Full,
    /// Top components only, from the Gram matrix eigendecomposition.
    Truncated,
    /// Randomized range finder with power iterations.
    #[default]
    Randomized,
}

impl SvdAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SvdAlgorithm::Full => "full",
            SvdAlgorithm::Truncated => "truncated",
            SvdAlgorithm::Randomized => "randomized",
        }
    }
}

impl fmt::Display for SvdAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SvdAlgorithm {
    type Err = AnomalyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(SvdAlgorithm::Full),
            "truncated" => Ok(SvdAlgorithm::Truncated),
            "randomized" => Ok(SvdAlgorithm::Randomized),
            _ => Err(AnomalyError::invalid_parameter(
                "algorithm",
                format!("must be one of {{full, truncated, randomized}}, not {}", s),
            )),
        }
    }
}

impl TryFrom<String> for SvdAlgorithm {
    type Error = AnomalyError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SvdAlgorithm> for String {
    fn from(algorithm: SvdAlgorithm) -> Self {
        algorithm.as_str().to_string()
    }
}

// ============================================================================
// Embedding Configuration
// ============================================================================

/// Options shared by the omnibus and MASE embedders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Embedding dimensionality; `None` selects it with the elbow heuristic (default: None).
    pub n_components: Option<usize>,
    /// Elbow to use when `n_components` is `None` (default: 2).
    pub n_elbows: usize,
    /// SVD solver (default: randomized).
    pub algorithm: SvdAlgorithm,
    /// Power iterations for the randomized solver (default: 5).
    pub n_iter: usize,
    /// Augment adjacency diagonals before embedding (default: true).
    pub diag_aug: bool,
    /// MASE only: scale per-graph eigenvectors by root singular values (default: true).
    pub scaled: bool,
    /// Seed for the randomized solver (default: 0).
    pub seed: u64,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            n_components: None,
            n_elbows: 2,
            algorithm: SvdAlgorithm::Randomized,
            n_iter: 5,
            diag_aug: true,
            scaled: true,
            seed: 0,
        }
    }
}

impl EmbedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    pub fn with_n_elbows(mut self, n_elbows: usize) -> Self {
        self.n_elbows = n_elbows;
        self
    }

    pub fn with_algorithm(mut self, algorithm: SvdAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_n_iter(mut self, n_iter: usize) -> Self {
        self.n_iter = n_iter;
        self
    }

    pub fn with_diag_aug(mut self, diag_aug: bool) -> Self {
        self.diag_aug = diag_aug;
        self
    }

    pub fn with_scaled(mut self, scaled: bool) -> Self {
        self.scaled = scaled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check option ranges that do not depend on the input graphs.
    pub fn validate(&self) -> Result<()> {
        if self.n_components == Some(0) {
            return Err(AnomalyError::invalid_parameter(
                "n_components",
                "must be positive",
            ));
        }
        if self.n_components.is_none() && self.n_elbows == 0 {
            return Err(AnomalyError::invalid_parameter(
                "n_elbows",
                "must be positive",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Detector Configuration
// ============================================================================

/// Graph anomaly detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Embedding method (default: omni).
    pub method: EmbedMethod,
    /// Graphs per moving window; must lie in `[3, n_graphs)` (default: 3).
    pub time_window: usize,
    /// Flag against the lower control line as well; not supported (default: false).
    pub use_lower_line: bool,
    /// Embed consecutive pairs on the rayon pool (default: false).
    pub parallel: bool,
    /// Options forwarded to the embedder.
    pub embed: EmbedConfig,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            method: EmbedMethod::Omni,
            time_window: MIN_TIME_WINDOW,
            use_lower_line: false,
            parallel: false,
            embed: EmbedConfig::default(),
        }
    }
}

impl AnomalyConfig {
    pub fn new(method: EmbedMethod, time_window: usize) -> Self {
        Self {
            method,
            time_window,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AnomalyError::invalid_parameter("config", e.to_string()))
    }

    pub fn with_method(mut self, method: EmbedMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_time_window(mut self, time_window: usize) -> Self {
        self.time_window = time_window;
        self
    }

    pub fn with_lower_line(mut self, use_lower_line: bool) -> Self {
        self.use_lower_line = use_lower_line;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_embed(mut self, embed: EmbedConfig) -> Self {
        self.embed = embed;
        self
    }

    /// Validate against a sequence of `n_graphs` graphs.
    pub fn validate(&self, n_graphs: usize) -> Result<()> {
        if self.time_window < MIN_TIME_WINDOW || self.time_window >= n_graphs {
            return Err(AnomalyError::invalid_parameter(
                "time_window",
                format!("must be within [{}, {})", MIN_TIME_WINDOW, n_graphs),
            ));
        }
        if self.use_lower_line {
            return Err(AnomalyError::NotImplemented(
                "anomaly selection against the lower control line".to_string(),
            ));
        }
        self.embed.validate()
    }
}

//! Spectral control-chart anomaly detector.

use anomaly_api::AnomalyConfig;
use anomaly_spi::{
    AnomalyError, AnomalyResult, EmbeddingPair, GraphAnomalyDiagnostics, PairEmbedder, Result,
    VertexAnomalyDiagnostics,
};
use nalgebra::DMatrix;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::control_chart::build_control_chart;
use crate::embed::Embedder;
use crate::graphs::{import_graphs, is_almost_symmetric, GraphInput, SYMMETRY_ATOL};
use crate::selector::select_anomalies;
use crate::statistics::compute_statistics;

/// Detects anomalous time steps and vertices in a sequence of undirected
/// graphs over a common vertex set.
///
/// Each consecutive pair is embedded jointly; the spectral norm of the
/// embedding difference and its per-vertex row norms are charted with a
/// moving window and compared against the upper 3-sigma control line.
///
/// # Example
///
/// ```rust,ignore
/// use anomaly_core::{GraphAnomalyDetector, GraphInput};
/// use anomaly_api::{AnomalyConfig, EmbedMethod};
///
/// let detector = GraphAnomalyDetector::new(AnomalyConfig::new(EmbedMethod::Omni, 3));
/// let result = detector.detect(GraphInput::Matrices(graphs))?;
/// println!("anomalous steps: {:?}", result.graph_anomaly_indices);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphAnomalyDetector {
    config: AnomalyConfig,
}

impl GraphAnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    /// Run detection with the embedder named by the configuration.
    pub fn detect(&self, input: GraphInput) -> Result<AnomalyResult> {
        let embedder = Embedder::new(self.config.method, self.config.embed.clone());
        self.detect_with(input, &embedder)
    }

    /// Run detection with a caller-supplied embedder.
    #[instrument(skip_all, fields(method = embedder.name(), time_window = self.config.time_window))]
    pub fn detect_with<E: PairEmbedder>(&self, input: GraphInput, embedder: &E) -> Result<AnomalyResult> {
        let graphs = import_graphs(input)?;
        let n_graphs = graphs.len();
        self.config.validate(n_graphs)?;

        if let Some(index) = graphs
            .iter()
            .position(|g| !is_almost_symmetric(g, SYMMETRY_ATOL))
        {
            warn!(index, "rejecting directed graph");
            return Err(AnomalyError::invalid_graph(index, "all input graphs must be undirected"));
        }

        let n_vertices = graphs[0].nrows();
        debug!(n_graphs, n_vertices, "embedding consecutive pairs");
        let pairs = self.embed_pairs(&graphs, embedder)?;

        let stats = compute_statistics(&pairs)?;
        let time_window = self.config.time_window;
        let chart = build_control_chart(&stats.graph, &stats.vertex, time_window)?;
        let (graph_anomaly_indices, vertex_anomaly_indices) = select_anomalies(
            &stats.graph,
            &stats.vertex,
            &chart,
            time_window,
            self.config.use_lower_line,
        )?;

        info!(
            graph_anomalies = graph_anomaly_indices.len(),
            vertex_anomaly_steps = vertex_anomaly_indices.len(),
            "anomaly detection complete"
        );

        let offset = time_window - 1;
        let graph_anomaly_diagnostics = GraphAnomalyDiagnostics {
            statistics: stats.graph[offset..].to_vec(),
            means: chart.graph_means,
            stds: chart.graph_stds,
            upper_central_line: chart.graph_upper,
            lower_central_line: chart.graph_lower,
        };
        let vertex_anomaly_diagnostics = VertexAnomalyDiagnostics {
            statistics: stats
                .vertex
                .row_iter()
                .skip(offset)
                .map(|row| row.iter().copied().collect())
                .collect(),
            means: chart.vertex_means,
            stds: chart.vertex_stds,
            upper_central_line: chart.vertex_upper,
            lower_central_line: chart.vertex_lower,
        };

        Ok(AnomalyResult {
            graph_anomaly_indices,
            graph_anomaly_diagnostics,
            vertex_anomaly_indices,
            vertex_anomaly_diagnostics,
        })
    }

    /// Embed every consecutive pair; pair `i` covers graphs `i` and `i + 1`.
    fn embed_pairs<E: PairEmbedder>(
        &self,
        graphs: &[DMatrix<f64>],
        embedder: &E,
    ) -> Result<Vec<EmbeddingPair>> {
        let embed = |i: usize| {
            let pair = embedder.embed_pair(&graphs[i], &graphs[i + 1])?;
            debug!(pair = i, n_components = pair.n_components(), "embedded pair");
            Ok(pair)
        };

        let n_pairs = graphs.len().saturating_sub(1);
        if self.config.parallel {
            (0..n_pairs).into_par_iter().map(embed).collect()
        } else {
            (0..n_pairs).map(embed).collect()
        }
    }
}

/// Detect anomalies in `input` with `config`.
pub fn anomaly_detection(input: GraphInput, config: &AnomalyConfig) -> Result<AnomalyResult> {
    GraphAnomalyDetector::new(config.clone()).detect(input)
}

//! Graph anomaly detection result types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Raw graph statistics and control chart for the charted time steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphAnomalyDiagnostics {
    /// Spectral-norm statistics from offset `time_window - 1` onward.
    pub statistics: Vec<f64>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    pub upper_central_line: Vec<f64>,
    pub lower_central_line: Vec<f64>,
}

/// Raw vertex statistics and pooled control chart for the charted time steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexAnomalyDiagnostics {
    /// One row of per-vertex statistics per charted time step.
    pub statistics: Vec<Vec<f64>>,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
    pub upper_central_line: Vec<f64>,
    pub lower_central_line: Vec<f64>,
}

/// Vertices flagged at one time step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexAnomaly {
    pub time: usize,
    pub vertices: BTreeSet<usize>,
}

/// Output of the graph anomaly detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Anomalous time steps, ascending.
    pub graph_anomaly_indices: Vec<usize>,
    pub graph_anomaly_diagnostics: GraphAnomalyDiagnostics,
    /// Anomalous vertices grouped by time step, ascending by time.
    pub vertex_anomaly_indices: Vec<VertexAnomaly>,
    pub vertex_anomaly_diagnostics: VertexAnomalyDiagnostics,
}

impl AnomalyResult {
    /// Count of anomalous time steps.
    pub fn graph_anomaly_count(&self) -> usize {
        self.graph_anomaly_indices.len()
    }

    /// Total count of (time, vertex) anomalies.
    pub fn vertex_anomaly_count(&self) -> usize {
        self.vertex_anomaly_indices
            .iter()
            .map(|entry| entry.vertices.len())
            .sum()
    }

    /// Vertices flagged at `time`, if any.
    pub fn vertices_at(&self, time: usize) -> Option<&BTreeSet<usize>> {
        self.vertex_anomaly_indices
            .iter()
            .find(|entry| entry.time == time)
            .map(|entry| &entry.vertices)
    }
}

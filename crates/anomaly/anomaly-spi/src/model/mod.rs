//! Data models for graph anomaly detection.
//!
//! This module contains data structures used throughout the detection pipeline.

mod anomaly_result;
mod control_chart;
mod embedding_pair;

pub use anomaly_result::{
    AnomalyResult, GraphAnomalyDiagnostics, VertexAnomaly, VertexAnomalyDiagnostics,
};
pub use control_chart::ControlChart;
pub use embedding_pair::EmbeddingPair;

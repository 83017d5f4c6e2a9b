//! Graph Anomaly Detection Service Provider Interface
//!
//! Defines the embedding contract, result models and error types shared by
//! the spectral control-chart detector.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::PairEmbedder;
pub use error::{AnomalyError, Result};
pub use model::{
    AnomalyResult, ControlChart, EmbeddingPair, GraphAnomalyDiagnostics, VertexAnomaly,
    VertexAnomalyDiagnostics,
};

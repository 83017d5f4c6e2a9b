//! # anomaly
//!
//! Anomaly detection for time series of undirected graphs.
//!
//! Consecutive graphs are embedded jointly (omnibus embedding or MASE), the
//! embedding differences are summarized per pair and per vertex, and a
//! moving-window 3-sigma control chart decides which time steps and which
//! vertices are anomalous.
//!
//! ```rust,ignore
//! use anomaly::prelude::*;
//!
//! let config = AnomalyConfig::new(EmbedMethod::Omni, 3);
//! let result = anomaly_detection(GraphInput::Matrices(graphs), &config)?;
//! for t in &result.graph_anomaly_indices {
//!     println!("graph {} is anomalous", t);
//! }
//! ```

pub use anomaly_facade::*;
pub use nalgebra::DMatrix;

/// Commonly used types.
pub mod prelude {
    pub use anomaly_facade::{
        anomaly_detection, AnomalyConfig, AnomalyError, AnomalyResult, EmbedConfig, EmbedMethod,
        GraphAnomalyDetector, GraphInput, PairEmbedder, Result, SvdAlgorithm,
    };
    pub use nalgebra::DMatrix;
}

//! Anomaly Detection Facade
//!
//! Unified re-exports for the graph anomaly detection module.
//!
//! This facade provides a single entry point to all anomaly detection functionality:
//! - `PairEmbedder` trait, `AnomalyResult` and `AnomalyError` from SPI
//! - Configuration types from API
//! - Graph import, embedders, control charts and `GraphAnomalyDetector` from Core

// Re-export everything from SPI
pub use anomaly_spi::*;

// Re-export everything from API
pub use anomaly_api::*;

// Re-export everything from Core
pub use anomaly_core::*;

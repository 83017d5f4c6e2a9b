//! Contract definitions for graph anomaly detection.
//!
//! This module contains trait definitions that embedding providers must implement.

mod pair_embedder;

pub use pair_embedder::PairEmbedder;

//! Anomaly Detection Core
//!
//! Graph import, joint spectral embedding, pair statistics, control charts
//! and anomaly selection for sequences of undirected graphs.

mod control_chart;
mod detector;
pub mod embed;
mod graphs;
mod selector;
mod statistics;

pub use control_chart::*;
pub use detector::*;
pub use embed::{Embedder, MaseFit, MultipleAseEmbedder, OmnibusEmbedder};
pub use graphs::*;
pub use selector::*;
pub use statistics::*;

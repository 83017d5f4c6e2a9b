//! Joint spectral embedders for consecutive graph pairs.

mod mase;
mod omni;
pub mod svd;

pub use mase::{MaseFit, MultipleAseEmbedder};
pub use omni::{omnibus_matrix, OmnibusEmbedder};
pub use svd::{select_dimension, select_svd, singular_values, SvdOptions, SvdResult};

use anomaly_api::{EmbedConfig, EmbedMethod};
use anomaly_spi::{AnomalyError, EmbeddingPair, PairEmbedder, Result};
use nalgebra::DMatrix;

use crate::graphs::augment_diagonal;

/// Embedding strategy selected by [`EmbedMethod`].
#[derive(Debug, Clone)]
pub enum Embedder {
    Omni(OmnibusEmbedder),
    Mase(MultipleAseEmbedder),
}

impl Embedder {
    pub fn new(method: EmbedMethod, config: EmbedConfig) -> Self {
        match method {
            EmbedMethod::Omni => Embedder::Omni(OmnibusEmbedder::new(config)),
            EmbedMethod::Mase => Embedder::Mase(MultipleAseEmbedder::new(config)),
        }
    }

    pub fn method(&self) -> EmbedMethod {
        match self {
            Embedder::Omni(_) => EmbedMethod::Omni,
            Embedder::Mase(_) => EmbedMethod::Mase,
        }
    }
}

impl PairEmbedder for Embedder {
    fn embed_pair(&self, first: &DMatrix<f64>, second: &DMatrix<f64>) -> Result<EmbeddingPair> {
        match self {
            Embedder::Omni(e) => e.embed_pair(first, second),
            Embedder::Mase(e) => e.embed_pair(first, second),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Embedder::Omni(e) => e.name(),
            Embedder::Mase(e) => e.name(),
        }
    }
}

pub(crate) fn svd_options(config: &EmbedConfig) -> SvdOptions {
    SvdOptions {
        n_components: config.n_components,
        n_elbows: config.n_elbows,
        algorithm: config.algorithm,
        n_iter: config.n_iter,
        seed: config.seed,
    }
}

/// Check that all graphs share one square shape and optionally augment
/// their diagonals.
pub(crate) fn prepare(graphs: &[DMatrix<f64>], diag_aug: bool) -> Result<Vec<DMatrix<f64>>> {
    let first = graphs.first().ok_or(AnomalyError::InsufficientData {
        required: 1,
        got: 0,
    })?;
    let expected = (first.nrows(), first.nrows());
    for (index, graph) in graphs.iter().enumerate() {
        if graph.shape() != expected {
            return Err(AnomalyError::ShapeMismatch {
                context: format!("embedder input graph {}", index),
                expected,
                actual: graph.shape(),
            });
        }
    }

    Ok(graphs
        .iter()
        .map(|g| if diag_aug { augment_diagonal(g) } else { g.clone() })
        .collect())
}

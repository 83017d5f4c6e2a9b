//! Omnibus joint embedding.

use anomaly_api::EmbedConfig;
use anomaly_spi::{AnomalyError, EmbeddingPair, PairEmbedder, Result};
use nalgebra::DMatrix;

use super::svd::select_svd;
use super::{prepare, svd_options};

/// Embeds graphs jointly through the omnibus matrix, whose `(i, j)` block is
/// `(A_i + A_j) / 2`.
///
/// The leading scaled left singular vectors of the omnibus matrix are split
/// into one `n_vertices × d` block per graph.
#[derive(Debug, Clone, Default)]
pub struct OmnibusEmbedder {
    config: EmbedConfig,
}

impl OmnibusEmbedder {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    /// Embed any number of graphs; returns one latent block per graph.
    pub fn fit_transform(&self, graphs: &[DMatrix<f64>]) -> Result<Vec<DMatrix<f64>>> {
        let graphs = prepare(graphs, self.config.diag_aug)?;
        let n = graphs[0].nrows();
        let omni = omnibus_matrix(&graphs);

        let svd = select_svd(&omni, &svd_options(&self.config))?;
        let latent = svd.scaled_left();

        Ok((0..graphs.len())
            .map(|g| latent.rows(g * n, n).into_owned())
            .collect())
    }
}

impl PairEmbedder for OmnibusEmbedder {
    fn embed_pair(&self, first: &DMatrix<f64>, second: &DMatrix<f64>) -> Result<EmbeddingPair> {
        let mut blocks = self
            .fit_transform(&[first.clone(), second.clone()])?
            .into_iter();
        match (blocks.next(), blocks.next()) {
            (Some(a), Some(b)) => Ok(EmbeddingPair::new(a, b)),
            _ => Err(AnomalyError::Embedding(
                "omnibus embedding returned fewer than two blocks".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "omni"
    }
}

/// Block matrix with `(A_i + A_j) / 2` in block `(i, j)`.
pub fn omnibus_matrix(graphs: &[DMatrix<f64>]) -> DMatrix<f64> {
    let m = graphs.len();
    let n = graphs.first().map_or(0, |g| g.nrows());
    let mut omni = DMatrix::zeros(m * n, m * n);
    for (i, a) in graphs.iter().enumerate() {
        for (j, b) in graphs.iter().enumerate() {
            omni.view_mut((i * n, j * n), (n, n))
                .copy_from(&((a + b) * 0.5));
        }
    }
    omni
}

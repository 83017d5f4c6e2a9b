//! Multiple adjacency spectral embedding (MASE).

use anomaly_api::{EmbedConfig, SvdAlgorithm};
use anomaly_spi::{AnomalyError, EmbeddingPair, PairEmbedder, Result};
use nalgebra::DMatrix;

use super::svd::{select_dimension, select_svd, SvdOptions, SvdResult};
use super::{prepare, svd_options};

/// Shared invariant subspace and per-graph score matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct MaseFit {
    /// `n_vertices × d` orthonormal basis shared by every graph.
    pub latent: DMatrix<f64>,
    /// `d × d` score matrix `Vᵀ A_i V` per graph.
    pub scores: Vec<DMatrix<f64>>,
}

/// Embeds each graph separately, then finds the subspace common to all of
/// them with a second SVD over the concatenated embeddings.
///
/// As a [`PairEmbedder`] it rescales the shared basis by the root of each
/// graph's score matrix, so every graph gets its own `n_vertices × d`
/// embedding in the shared space.
#[derive(Debug, Clone, Default)]
pub struct MultipleAseEmbedder {
    config: EmbedConfig,
}

impl MultipleAseEmbedder {
    pub fn new(config: EmbedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EmbedConfig {
        &self.config
    }

    pub fn fit(&self, graphs: &[DMatrix<f64>]) -> Result<MaseFit> {
        let graphs = prepare(graphs, self.config.diag_aug)?;
        let n = graphs[0].nrows();
        let options = svd_options(&self.config);

        // individual embeddings use at least ceil(log2 n) components
        let log_dim = (n as f64).log2().ceil() as usize;
        let first_stage = log_dim
            .max(self.config.n_components.unwrap_or(0))
            .clamp(1, n);
        let stage_options = SvdOptions {
            n_components: Some(first_stage),
            ..options
        };
        let individual = graphs
            .iter()
            .map(|g| select_svd(g, &stage_options))
            .collect::<Result<Vec<_>>>()?;

        let best = match self.config.n_components {
            Some(k) => k.min(first_stage),
            None => individual
                .iter()
                .map(|svd| {
                    select_dimension(svd.singular_values.as_slice(), self.config.n_elbows)
                        .last()
                        .copied()
                        .unwrap_or(1)
                })
                .max()
                .unwrap_or(1),
        };

        let stacked = self.concatenate(&individual, best);
        let latent = select_svd(&stacked, &options)?.u;
        let scores = graphs
            .iter()
            .map(|g| latent.transpose() * g * &latent)
            .collect();

        Ok(MaseFit { latent, scores })
    }

    fn concatenate(&self, individual: &[SvdResult], best: usize) -> DMatrix<f64> {
        let n = individual[0].u.nrows();
        let mut stacked = DMatrix::zeros(n, best * individual.len());
        for (g, svd) in individual.iter().enumerate() {
            let mut block = svd.u.columns(0, best).into_owned();
            if self.config.scaled {
                for (j, mut col) in block.column_iter_mut().enumerate() {
                    col *= svd.singular_values[j].sqrt();
                }
            }
            stacked.columns_mut(g * best, best).copy_from(&block);
        }
        stacked
    }
}

/// `V · U sqrt(Σ) Wᵀ` where `R = U Σ Wᵀ` is a graph's score matrix.
fn rescale(latent: &DMatrix<f64>, score: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let options = SvdOptions {
        n_components: Some(score.nrows()),
        n_elbows: 1,
        algorithm: SvdAlgorithm::Full,
        n_iter: 0,
        seed: 0,
    };
    let svd = select_svd(score, &options)?;
    let mut root = svd.u.clone();
    for (j, mut col) in root.column_iter_mut().enumerate() {
        col *= svd.singular_values[j].sqrt();
    }
    Ok(latent * root * svd.v_t)
}

impl PairEmbedder for MultipleAseEmbedder {
    fn embed_pair(&self, first: &DMatrix<f64>, second: &DMatrix<f64>) -> Result<EmbeddingPair> {
        let fit = self.fit(&[first.clone(), second.clone()])?;
        match fit.scores.as_slice() {
            [a, b] => Ok(EmbeddingPair::new(
                rescale(&fit.latent, a)?,
                rescale(&fit.latent, b)?,
            )),
            _ => Err(AnomalyError::Embedding(
                "MASE returned fewer than two score matrices".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "mase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blocks(n: usize, within: f64, between: f64) -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |i, j| {
            if i == j {
                0.0
            } else if (i < n / 2) == (j < n / 2) {
                within
            } else {
                between
            }
        })
    }

    #[test]
    fn test_fit_shapes() {
        let embedder = MultipleAseEmbedder::new(EmbedConfig::new().with_n_components(2));
        let fit = embedder
            .fit(&[two_blocks(8, 0.8, 0.1), two_blocks(8, 0.6, 0.2)])
            .unwrap();
        assert_eq!(fit.latent.shape(), (8, 2));
        assert_eq!(fit.scores.len(), 2);
        assert_eq!(fit.scores[0].shape(), (2, 2));
    }

    #[test]
    fn test_latent_is_orthonormal() {
        let embedder = MultipleAseEmbedder::new(
            EmbedConfig::new()
                .with_n_components(2)
                .with_algorithm(SvdAlgorithm::Full),
        );
        let fit = embedder
            .fit(&[two_blocks(8, 0.8, 0.1), two_blocks(8, 0.6, 0.2)])
            .unwrap();
        let gram = fit.latent.transpose() * &fit.latent;
        assert!((gram - DMatrix::identity(2, 2)).norm() < 1e-8);
    }

    #[test]
    fn test_embed_pair_shapes() {
        let embedder = MultipleAseEmbedder::new(EmbedConfig::new().with_n_components(2));
        let pair = embedder
            .embed_pair(&two_blocks(8, 0.8, 0.1), &two_blocks(8, 0.6, 0.2))
            .unwrap();
        assert_eq!(pair.first.shape(), (8, 2));
        assert_eq!(pair.second.shape(), (8, 2));
    }

    #[test]
    fn test_identical_graphs_embed_identically() {
        let embedder = MultipleAseEmbedder::default();
        let graph = two_blocks(8, 0.7, 0.1);
        let pair = embedder.embed_pair(&graph, &graph).unwrap();
        assert!(pair.difference().unwrap().norm() < 1e-8);
    }

    #[test]
    fn test_different_graphs_embed_differently() {
        let embedder = MultipleAseEmbedder::new(EmbedConfig::new().with_n_components(2));
        let pair = embedder
            .embed_pair(&two_blocks(8, 0.9, 0.1), &two_blocks(8, 0.3, 0.1))
            .unwrap();
        assert!(pair.difference().unwrap().norm() > 1e-3);
    }
}

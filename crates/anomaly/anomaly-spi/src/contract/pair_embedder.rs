//! Pair embedder trait definition.

use nalgebra::DMatrix;

use crate::error::Result;
use crate::model::EmbeddingPair;

/// Joint spectral embedder for two graphs over the same vertex set.
///
/// Implementations must place both embeddings in one latent space with
/// rows aligned by vertex index, and must not keep state between calls.
pub trait PairEmbedder: Send + Sync {
    /// Embed two adjacency matrices jointly.
    fn embed_pair(&self, first: &DMatrix<f64>, second: &DMatrix<f64>) -> Result<EmbeddingPair>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

impl<E: PairEmbedder + ?Sized> PairEmbedder for &E {
    fn embed_pair(&self, first: &DMatrix<f64>, second: &DMatrix<f64>) -> Result<EmbeddingPair> {
        (**self).embed_pair(first, second)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

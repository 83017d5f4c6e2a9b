//! Joint embedding of two consecutive graphs.

use nalgebra::DMatrix;

/// Vertex embeddings of two graphs in a shared latent space.
///
/// Row `v` of `first` and row `v` of `second` describe the same vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingPair {
    pub first: DMatrix<f64>,
    pub second: DMatrix<f64>,
}

impl EmbeddingPair {
    /// Create a new embedding pair.
    pub fn new(first: DMatrix<f64>, second: DMatrix<f64>) -> Self {
        Self { first, second }
    }

    /// Number of vertices (rows) in the first embedding.
    pub fn n_vertices(&self) -> usize {
        self.first.nrows()
    }

    /// Latent dimensionality (columns) of the first embedding.
    pub fn n_components(&self) -> usize {
        self.first.ncols()
    }

    /// `first - second`, or `None` if the shapes differ.
    pub fn difference(&self) -> Option<DMatrix<f64>> {
        if self.first.shape() != self.second.shape() {
            return None;
        }
        Some(&self.first - &self.second)
    }
}

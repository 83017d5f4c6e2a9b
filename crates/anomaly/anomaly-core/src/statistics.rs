//! Graph-level and vertex-level dissimilarity statistics.

use anomaly_spi::{AnomalyError, EmbeddingPair, Result};
use nalgebra::DMatrix;

use crate::embed::singular_values;

/// Statistics for every consecutive pair of graphs.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStatistics {
    /// Spectral norm of each pair's embedding difference.
    pub graph: Vec<f64>,
    /// `n_pairs × n_vertices`; row-wise L2 norms of each difference.
    pub vertex: DMatrix<f64>,
}

impl PairStatistics {
    pub fn n_pairs(&self) -> usize {
        self.graph.len()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertex.ncols()
    }
}

/// Compute graph and vertex statistics for a sequence of embedding pairs.
pub fn compute_statistics(pairs: &[EmbeddingPair]) -> Result<PairStatistics> {
    let n_vertices = pairs
        .first()
        .ok_or(AnomalyError::InsufficientData {
            required: 1,
            got: 0,
        })?
        .n_vertices();

    let mut graph = Vec::with_capacity(pairs.len());
    let mut vertex = DMatrix::zeros(pairs.len(), n_vertices);

    for (i, pair) in pairs.iter().enumerate() {
        if !pair.first.iter().chain(pair.second.iter()).all(|x| x.is_finite()) {
            return Err(AnomalyError::Embedding(format!(
                "embedding pair {} contains non-finite values",
                i
            )));
        }
        let diff = pair.difference().ok_or_else(|| AnomalyError::ShapeMismatch {
            context: format!("embedding pair {}", i),
            expected: pair.first.shape(),
            actual: pair.second.shape(),
        })?;
        if diff.nrows() != n_vertices {
            return Err(AnomalyError::ShapeMismatch {
                context: format!("embedding pair {}", i),
                expected: (n_vertices, diff.ncols()),
                actual: diff.shape(),
            });
        }

        let spectral_norm = if diff.iter().all(|&x| x == 0.0) {
            0.0
        } else {
            singular_values(&diff)?.max()
        };
        graph.push(spectral_norm);

        for (v, row) in diff.row_iter().enumerate() {
            vertex[(i, v)] = row.norm();
        }
    }

    Ok(PairStatistics { graph, vertex })
}

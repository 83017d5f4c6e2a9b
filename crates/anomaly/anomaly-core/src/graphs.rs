//! Graph import and validation.

use anomaly_spi::{AnomalyError, Result};
use nalgebra::DMatrix;
use petgraph::graph::{Graph, IndexType};
use petgraph::visit::EdgeRef;
use petgraph::EdgeType;

/// Absolute tolerance used by [`is_almost_symmetric`] in the detector.
pub const SYMMETRY_ATOL: f64 = 1e-15;

/// Relative tolerance used by [`is_almost_symmetric`].
const SYMMETRY_RTOL: f64 = 1e-5;

/// A time-ordered sequence of graphs in one of the accepted representations.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphInput {
    /// One square adjacency matrix per time step.
    Matrices(Vec<DMatrix<f64>>),
    /// A dense `graphs × rows × cols` array.
    Tensor(Vec<Vec<Vec<f64>>>),
}

impl GraphInput {
    /// Build adjacency matrices from petgraph graphs.
    ///
    /// Edge weights become matrix entries and parallel edges are summed.
    /// Undirected graphs fill both triangles.
    pub fn from_graphs<N, E, Ty, Ix>(graphs: &[Graph<N, E, Ty, Ix>]) -> Self
    where
        E: Copy + Into<f64>,
        Ty: EdgeType,
        Ix: IndexType,
    {
        let matrices = graphs
            .iter()
            .map(|graph| {
                let n = graph.node_count();
                let mut adjacency = DMatrix::zeros(n, n);
                for edge in graph.edge_references() {
                    let (s, t) = (edge.source().index(), edge.target().index());
                    let w: f64 = (*edge.weight()).into();
                    adjacency[(s, t)] += w;
                    if !graph.is_directed() && s != t {
                        adjacency[(t, s)] += w;
                    }
                }
                adjacency
            })
            .collect();
        GraphInput::Matrices(matrices)
    }

    /// Number of graphs in the sequence.
    pub fn len(&self) -> usize {
        match self {
            GraphInput::Matrices(m) => m.len(),
            GraphInput::Tensor(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<DMatrix<f64>>> for GraphInput {
    fn from(matrices: Vec<DMatrix<f64>>) -> Self {
        GraphInput::Matrices(matrices)
    }
}

impl From<Vec<Vec<Vec<f64>>>> for GraphInput {
    fn from(tensor: Vec<Vec<Vec<f64>>>) -> Self {
        GraphInput::Tensor(tensor)
    }
}

/// Normalize the input into square adjacency matrices of equal dimension.
pub fn import_graphs(input: GraphInput) -> Result<Vec<DMatrix<f64>>> {
    let graphs = match input {
        GraphInput::Matrices(matrices) => matrices,
        GraphInput::Tensor(tensor) => tensor
            .into_iter()
            .enumerate()
            .map(|(index, rows)| matrix_from_rows(index, rows))
            .collect::<Result<Vec<_>>>()?,
    };

    let first = graphs.first().ok_or(AnomalyError::InsufficientData {
        required: 1,
        got: 0,
    })?;
    let n_vertices = first.nrows();

    for (index, graph) in graphs.iter().enumerate() {
        if !graph.is_square() {
            return Err(AnomalyError::invalid_graph(
                index,
                format!("adjacency matrix must be square, got {:?}", graph.shape()),
            ));
        }
        if graph.nrows() != n_vertices {
            return Err(AnomalyError::invalid_graph(
                index,
                format!(
                    "expected {} vertices like graph 0, got {}",
                    n_vertices,
                    graph.nrows()
                ),
            ));
        }
        if graph.iter().any(|x| !x.is_finite()) {
            return Err(AnomalyError::invalid_graph(
                index,
                "adjacency matrix contains non-finite values",
            ));
        }
    }

    Ok(graphs)
}

fn matrix_from_rows(index: usize, rows: Vec<Vec<f64>>) -> Result<DMatrix<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != n_cols) {
        return Err(AnomalyError::invalid_graph(
            index,
            format!("ragged rows: expected {} columns, got {}", n_cols, bad.len()),
        ));
    }
    Ok(DMatrix::from_fn(n_rows, n_cols, |i, j| rows[i][j]))
}

/// Whether `m` is square and equal to its transpose within tolerance.
///
/// Entries are compared as `|a_ij - a_ji| <= atol + 1e-5 * |a_ji|` in both
/// directions, so `m` and its transpose always agree.
pub fn is_almost_symmetric(m: &DMatrix<f64>, atol: f64) -> bool {
    if !m.is_square() {
        return false;
    }
    let n = m.nrows();
    (0..n).all(|i| {
        (i + 1..n).all(|j| {
            let (a, b) = (m[(i, j)], m[(j, i)]);
            (a - b).abs() <= atol + SYMMETRY_RTOL * a.abs().min(b.abs())
        })
    })
}

/// Replace the diagonal with each vertex's mean degree divided by `n - 1`.
///
/// Self loops are dropped first. Degrees average in- and out-strength.
pub fn augment_diagonal(graph: &DMatrix<f64>) -> DMatrix<f64> {
    let n = graph.nrows();
    let mut augmented = graph.clone();
    augmented.fill_diagonal(0.0);
    if n < 2 {
        return augmented;
    }

    let divisor = (n - 1) as f64;
    let out_degrees: Vec<f64> = augmented.row_iter().map(|row| row.sum()).collect();
    let in_degrees: Vec<f64> = augmented.column_iter().map(|col| col.sum()).collect();
    for i in 0..n {
        augmented[(i, i)] = (out_degrees[i] + in_degrees[i]) / 2.0 / divisor;
    }
    augmented
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::{DiGraph, UnGraph};

    fn path_graph() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            3,
            3,
            &[0.0, 1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 0.0],
        )
    }

    #[test]
    fn test_import_matrices() {
        let graphs = import_graphs(vec![path_graph(), path_graph()].into()).unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[1].shape(), (3, 3));
    }

    #[test]
    fn test_import_tensor() {
        let tensor = vec![
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            vec![vec![0.0, 0.5], vec![0.5, 0.0]],
        ];
        let graphs = import_graphs(tensor.into()).unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[1][(0, 1)], 0.5);
    }

    #[test]
    fn test_import_rejects_ragged_tensor() {
        let tensor = vec![vec![vec![0.0, 1.0], vec![1.0]]];
        let err = import_graphs(tensor.into()).unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidGraph { index: 0, .. }));
    }

    #[test]
    fn test_import_rejects_mismatched_sizes() {
        let err = import_graphs(vec![path_graph(), DMatrix::zeros(4, 4)].into()).unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidGraph { index: 1, .. }));
    }

    #[test]
    fn test_import_rejects_non_square() {
        let err = import_graphs(vec![DMatrix::zeros(2, 3)].into()).unwrap_err();
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_import_rejects_nan() {
        let mut graph = path_graph();
        graph[(0, 0)] = f64::NAN;
        assert!(import_graphs(vec![graph].into()).is_err());
    }

    #[test]
    fn test_import_rejects_empty() {
        let err = import_graphs(GraphInput::Matrices(vec![])).unwrap_err();
        assert!(matches!(err, AnomalyError::InsufficientData { .. }));
    }

    #[test]
    fn test_from_undirected_petgraph() {
        let mut graph = UnGraph::<(), f64>::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node(());
        let c = graph.add_node(());
        graph.add_edge(a, b, 1.0);
        graph.add_edge(b, c, 2.0);

        let graphs = import_graphs(GraphInput::from_graphs(&[graph])).unwrap();
        assert_eq!(graphs[0], path_graph());
        assert!(is_almost_symmetric(&graphs[0], SYMMETRY_ATOL));
    }

    #[test]
    fn test_from_directed_petgraph_is_asymmetric() {
        let mut graph = DiGraph::<(), f64>::new();
        let a = graph.add_node(());
        let b = graph.add_node(());
        graph.add_edge(a, b, 1.0);

        let graphs = import_graphs(GraphInput::from_graphs(&[graph])).unwrap();
        assert!(!is_almost_symmetric(&graphs[0], SYMMETRY_ATOL));
    }

    #[test]
    fn test_almost_symmetric_tolerates_noise() {
        let mut graph = path_graph();
        graph[(1, 2)] += 1e-9;
        assert!(is_almost_symmetric(&graph, SYMMETRY_ATOL));

        graph[(1, 2)] += 1e-3;
        assert!(!is_almost_symmetric(&graph, SYMMETRY_ATOL));
    }

    #[test]
    fn test_almost_symmetric_agrees_with_transpose() {
        let near = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0 + 1.000_001e-5, 0.0]);
        assert!(!is_almost_symmetric(&near, SYMMETRY_ATOL));
        assert!(!is_almost_symmetric(&near.transpose(), SYMMETRY_ATOL));

        let close = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0 + 0.5e-5, 0.0]);
        assert!(is_almost_symmetric(&close, SYMMETRY_ATOL));
        assert!(is_almost_symmetric(&close.transpose(), SYMMETRY_ATOL));
    }

    #[test]
    fn test_almost_symmetric_non_square() {
        assert!(!is_almost_symmetric(&DMatrix::zeros(2, 3), SYMMETRY_ATOL));
    }

    #[test]
    fn test_augment_diagonal() {
        let mut graph = path_graph();
        graph[(0, 0)] = 5.0;
        let augmented = augment_diagonal(&graph);
        // degrees 1, 3, 2 over n - 1 = 2
        assert_eq!(augmented[(0, 0)], 0.5);
        assert_eq!(augmented[(1, 1)], 1.5);
        assert_eq!(augmented[(2, 2)], 1.0);
        assert_eq!(augmented[(1, 2)], 2.0);
    }
}

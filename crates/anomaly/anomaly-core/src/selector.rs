//! Control-limit thresholding.
//!
//! Chart index `i` is compared with raw statistic `i + time_window - 1`, the
//! statistic of the pair ending at graph `i + time_window`. Flags are reported
//! by that later graph's index.

use std::collections::BTreeSet;

use anomaly_spi::{AnomalyError, ControlChart, Result, VertexAnomaly};
use nalgebra::DMatrix;

/// Time steps whose graph statistic exceeds the upper control line.
///
/// Returned indices are strictly increasing and lie in
/// `[time_window, n_graphs - 1]`.
pub fn select_graph_anomalies(graph_stats: &[f64], upper: &[f64], time_window: usize) -> Vec<usize> {
    let offset = time_window.saturating_sub(1);
    graph_stats
        .iter()
        .skip(offset)
        .zip(upper)
        .enumerate()
        .filter(|(_, (&stat, &limit))| stat > limit)
        .map(|(i, _)| i + time_window)
        .collect()
}

/// Vertices whose statistic exceeds the pooled upper control line, grouped
/// by time step. Steps without a flagged vertex are omitted.
pub fn select_vertex_anomalies(
    vertex_stats: &DMatrix<f64>,
    upper: &[f64],
    time_window: usize,
) -> Vec<VertexAnomaly> {
    let offset = time_window.saturating_sub(1);
    upper
        .iter()
        .enumerate()
        .filter(|(i, _)| i + offset < vertex_stats.nrows())
        .filter_map(|(i, &limit)| {
            let vertices: BTreeSet<usize> = vertex_stats
                .row(i + offset)
                .iter()
                .enumerate()
                .filter(|(_, &stat)| stat > limit)
                .map(|(v, _)| v)
                .collect();
            (!vertices.is_empty()).then(|| VertexAnomaly {
                time: i + time_window,
                vertices,
            })
        })
        .collect()
}

/// Apply both selections against `chart`.
///
/// Selection against the lower control line is not supported and fails
/// with [`AnomalyError::NotImplemented`].
pub fn select_anomalies(
    graph_stats: &[f64],
    vertex_stats: &DMatrix<f64>,
    chart: &ControlChart,
    time_window: usize,
    use_lower_line: bool,
) -> Result<(Vec<usize>, Vec<VertexAnomaly>)> {
    if use_lower_line {
        return Err(AnomalyError::NotImplemented(
            "anomaly selection against the lower control line".to_string(),
        ));
    }
    Ok((
        select_graph_anomalies(graph_stats, &chart.graph_upper, time_window),
        select_vertex_anomalies(vertex_stats, &chart.vertex_upper, time_window),
    ))
}

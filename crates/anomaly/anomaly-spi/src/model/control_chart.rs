//! Moving-window control chart.

use serde::{Deserialize, Serialize};

/// Moving means, standard deviations and 3-sigma limits for graph-level and
/// vertex-level statistics.
///
/// Every sequence has the same length, `n_graphs - time_window`. Index `i`
/// describes raw statistic `i + time_window - 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlChart {
    pub graph_means: Vec<f64>,
    pub graph_stds: Vec<f64>,
    pub graph_upper: Vec<f64>,
    pub graph_lower: Vec<f64>,
    pub vertex_means: Vec<f64>,
    pub vertex_stds: Vec<f64>,
    pub vertex_upper: Vec<f64>,
    pub vertex_lower: Vec<f64>,
}

impl ControlChart {
    /// Number of charted time steps.
    pub fn len(&self) -> usize {
        self.graph_means.len()
    }

    /// True when no time step is charted.
    pub fn is_empty(&self) -> bool {
        self.graph_means.is_empty()
    }
}

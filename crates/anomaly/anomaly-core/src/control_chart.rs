//! Moving-window control chart over pair statistics.
//!
//! Graph-level spread is estimated from the average moving range, vertex-level
//! spread from the average per-step sample standard deviation, each divided
//! by its unbiasing constant.

use anomaly_api::MIN_TIME_WINDOW;
use anomaly_spi::{AnomalyError, ControlChart, Result};
use nalgebra::DMatrix;

/// `d2` for moving ranges of two consecutive observations.
pub const MOVING_RANGE_D2: f64 = 1.128;

/// Width of the control band in standard deviations.
pub const SIGMA_MULTIPLIER: f64 = 3.0;

/// Build the control chart for `graph_stats` (length `m - 1`) and
/// `vertex_stats` (`m - 1` rows, one column per vertex).
///
/// The chart covers `m - time_window` steps; entry `i` summarizes the window
/// ending just before raw statistic `i + time_window - 1`.
pub fn build_control_chart(
    graph_stats: &[f64],
    vertex_stats: &DMatrix<f64>,
    time_window: usize,
) -> Result<ControlChart> {
    let el = time_window;
    let m = graph_stats.len() + 1;
    let n = vertex_stats.ncols();

    if el < MIN_TIME_WINDOW {
        return Err(AnomalyError::invalid_parameter(
            "time_window",
            format!("must be at least {}, got {}", MIN_TIME_WINDOW, el),
        ));
    }
    if m <= el {
        return Err(AnomalyError::InsufficientData {
            required: el + 1,
            got: m,
        });
    }
    if vertex_stats.nrows() != graph_stats.len() {
        return Err(AnomalyError::ShapeMismatch {
            context: "vertex statistics".to_string(),
            expected: (graph_stats.len(), n),
            actual: vertex_stats.shape(),
        });
    }
    if n < 2 {
        return Err(AnomalyError::InsufficientData {
            required: 2,
            got: n,
        });
    }

    let k = m - el;
    let window = (el - 1) as f64;

    let graph_means: Vec<f64> = (0..k)
        .map(|i| graph_stats[i..i + el - 1].iter().sum::<f64>() / window)
        .collect();
    let vertex_means: Vec<f64> = (0..k)
        .map(|i| vertex_stats.rows(i, el - 1).sum() / (n as f64 * window))
        .collect();

    let graph_diffs: Vec<f64> = graph_stats.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    let graph_stds: Vec<f64> = (0..k)
        .map(|i| {
            graph_diffs[i..i + el - 2].iter().sum::<f64>()
                / (MOVING_RANGE_D2 * (el - 2) as f64)
        })
        .collect();

    let sample_stds: Vec<f64> = vertex_stats
        .row_iter()
        .map(|row| sample_std(&row.iter().copied().collect::<Vec<_>>()))
        .collect();
    let constant = c4(n);
    let vertex_stds: Vec<f64> = (0..k)
        .map(|i| sample_stds[i..i + el - 1].iter().sum::<f64>() / (constant * window))
        .collect();

    let (graph_upper, graph_lower) = control_limits(&graph_means, &graph_stds);
    let (vertex_upper, vertex_lower) = control_limits(&vertex_means, &vertex_stds);

    Ok(ControlChart {
        graph_means,
        graph_stds,
        graph_upper,
        graph_lower,
        vertex_means,
        vertex_stds,
        vertex_upper,
        vertex_lower,
    })
}

/// Unbiasing constant for a standard deviation estimated from `n` samples,
/// `Γ(n/2) · sqrt(2/(n-1)) / Γ((n-1)/2)`.
///
/// Evaluated through `ln Γ` so large `n` does not overflow.
pub fn c4(n: usize) -> f64 {
    let n = n as f64;
    (libm::lgamma(n / 2.0) - libm::lgamma((n - 1.0) / 2.0)).exp() * (2.0 / (n - 1.0)).sqrt()
}

/// Sample standard deviation with one degree of freedom removed.
fn sample_std(values: &[f64]) -> f64 {
    let count = values.len();
    if count < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / count as f64;
    let squares: f64 = values.iter().map(|x| (x - mean).powi(2)).sum();
    (squares / (count - 1) as f64).sqrt()
}

fn control_limits(means: &[f64], stds: &[f64]) -> (Vec<f64>, Vec<f64>) {
    means
        .iter()
        .zip(stds)
        .map(|(&mean, &std)| (mean + SIGMA_MULTIPLIER * std, mean - SIGMA_MULTIPLIER * std))
        .unzip()
}

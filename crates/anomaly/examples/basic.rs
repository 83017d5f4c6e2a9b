//! Basic example demonstrating graph anomaly detection
//!
//! Run with: cargo run --example basic -p anomaly

use anomaly::prelude::*;

fn community_graph(n: usize, within: f64, between: f64, jitter: f64) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            return 0.0;
        }
        let base = if (i < n / 2) == (j < n / 2) { within } else { between };
        base + jitter * (((i + j) % 3) as f64)
    })
}

fn main() -> Result<()> {
    println!("=== anomaly Basic Examples ===\n");

    // Ten snapshots of a two-community network; snapshot 7 merges the communities
    let graphs: Vec<DMatrix<f64>> = (0..10)
        .map(|t| {
            if t == 7 {
                community_graph(20, 0.5, 0.5, 0.01)
            } else {
                community_graph(20, 0.8, 0.1, 0.01 * (t % 2) as f64)
            }
        })
        .collect();

    for method in [EmbedMethod::Omni, EmbedMethod::Mase] {
        println!("{} embedding (time_window=3)", method);
        let config = AnomalyConfig::new(method, 3)
            .with_embed(EmbedConfig::new().with_n_components(2));
        let result = anomaly_detection(GraphInput::Matrices(graphs.clone()), &config)?;

        println!("   Anomalous graphs: {:?}", result.graph_anomaly_indices);
        let diagnostics = &result.graph_anomaly_diagnostics;
        println!(
            "   Statistics: {:?}",
            diagnostics.statistics.iter().map(|s| format!("{:.3}", s)).collect::<Vec<_>>()
        );
        println!(
            "   Upper line: {:?}",
            diagnostics
                .upper_central_line
                .iter()
                .map(|s| format!("{:.3}", s))
                .collect::<Vec<_>>()
        );
        for entry in &result.vertex_anomaly_indices {
            println!("   t={}: vertices {:?}", entry.time, entry.vertices);
        }
        println!();
    }

    Ok(())
}

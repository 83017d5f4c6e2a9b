//! Benchmark suite for graph anomaly detection.

use anomaly_api::{AnomalyConfig, EmbedConfig, EmbedMethod, SvdAlgorithm};
use anomaly_core::embed::{select_svd, SvdOptions};
use anomaly_core::{GraphAnomalyDetector, GraphInput};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use nalgebra::DMatrix;

fn create_graphs(count: usize, n_vertices: usize) -> Vec<DMatrix<f64>> {
    (0..count)
        .map(|t| {
            DMatrix::from_fn(n_vertices, n_vertices, |i, j| {
                if i == j {
                    0.0
                } else {
                    let same_block = (i < n_vertices / 2) == (j < n_vertices / 2);
                    let base = if same_block { 0.8 } else { 0.2 };
                    base + 0.05 * (((i + j + t) as f64) * 0.7).sin()
                }
            })
        })
        .collect()
}

fn bench_select_svd(c: &mut Criterion) {
    let mut group = c.benchmark_group("SelectSvd");

    for n in [50, 100, 200].iter() {
        let graphs = create_graphs(1, *n);
        let graph = &graphs[0];

        for algorithm in [SvdAlgorithm::Full, SvdAlgorithm::Truncated, SvdAlgorithm::Randomized] {
            let options = SvdOptions {
                n_components: Some(4),
                n_elbows: 2,
                algorithm,
                n_iter: 5,
                seed: 0,
            };
            group.bench_with_input(BenchmarkId::new(algorithm.as_str(), n), graph, |b, graph| {
                b.iter(|| select_svd(black_box(graph), black_box(&options)))
            });
        }
    }

    group.finish();
}

fn bench_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("Detector");
    group.sample_size(10);

    for n in [30, 60].iter() {
        let graphs = create_graphs(12, *n);

        for method in [EmbedMethod::Omni, EmbedMethod::Mase] {
            for parallel in [false, true] {
                let config = AnomalyConfig::new(method, 3)
                    .with_parallel(parallel)
                    .with_embed(EmbedConfig::new().with_n_components(3));
                let detector = GraphAnomalyDetector::new(config);
                let label = format!("{}/{}", method, if parallel { "parallel" } else { "sequential" });

                group.bench_with_input(BenchmarkId::new(label, n), &graphs, |b, graphs| {
                    b.iter(|| detector.detect(GraphInput::Matrices(black_box(graphs.clone()))))
                });
            }
        }
    }

    group.finish();
}

criterion_group!(benches, bench_select_svd, bench_detector);
criterion_main!(benches);

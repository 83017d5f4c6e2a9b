//! # graph-anomaly
//!
//! Command-line interface for anomaly detection in graph sequences.

use anomaly::{
    anomaly_detection, AnomalyConfig, AnomalyResult, EmbedMethod, GraphInput, SvdAlgorithm,
};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "graph-anomaly")]
#[command(about = "Anomaly detection for time series of graphs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalous graphs and vertices in a graph sequence
    Detect {
        /// Input JSON file: a graphs x rows x cols array, or {"graphs": [...]}
        #[arg(short, long)]
        input: PathBuf,

        /// Configuration JSON file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Embedding method (omni, mase)
        #[arg(short, long)]
        method: Option<String>,

        /// Graphs per moving window
        #[arg(short, long)]
        time_window: Option<usize>,

        /// Embedding dimension (default: elbow selection)
        #[arg(short, long)]
        n_components: Option<usize>,

        /// SVD solver (full, truncated, randomized)
        #[arg(short, long)]
        algorithm: Option<String>,

        /// Embed graph pairs in parallel
        #[arg(long)]
        parallel: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default configuration as JSON
    Config,
}

/// Accepted layouts of the input file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphFile {
    Bare(Vec<Vec<Vec<f64>>>),
    Wrapped { graphs: Vec<Vec<Vec<f64>>> },
}

impl GraphFile {
    fn into_tensor(self) -> Vec<Vec<Vec<f64>>> {
        match self {
            GraphFile::Bare(graphs) => graphs,
            GraphFile::Wrapped { graphs } => graphs,
        }
    }
}

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Default)]
struct Overrides {
    method: Option<String>,
    time_window: Option<usize>,
    n_components: Option<usize>,
    algorithm: Option<String>,
    parallel: bool,
}

fn parse_graphs(json: &str) -> CliResult<Vec<Vec<Vec<f64>>>> {
    serde_json::from_str::<GraphFile>(json)
        .map(GraphFile::into_tensor)
        .map_err(|e| format!("Failed to parse graphs: {}", e))
}

fn load_graphs(path: &Path) -> CliResult<Vec<Vec<Vec<f64>>>> {
    let json = std::fs::read_to_string(path).map_err(|e| format!("Failed to open file: {}", e))?;
    parse_graphs(&json)
}

fn load_config(path: Option<&Path>) -> CliResult<AnomalyConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config: {}", e))?;
            AnomalyConfig::from_json_str(&json).map_err(|e| e.to_string())
        }
        None => Ok(AnomalyConfig::default()),
    }
}

fn apply_overrides(mut config: AnomalyConfig, overrides: Overrides) -> CliResult<AnomalyConfig> {
    if let Some(method) = overrides.method {
        config.method = method.parse::<EmbedMethod>().map_err(|e| e.to_string())?;
    }
    if let Some(time_window) = overrides.time_window {
        config.time_window = time_window;
    }
    if let Some(n_components) = overrides.n_components {
        config.embed.n_components = Some(n_components);
    }
    if let Some(algorithm) = overrides.algorithm {
        config.embed.algorithm = algorithm.parse::<SvdAlgorithm>().map_err(|e| e.to_string())?;
    }
    if overrides.parallel {
        config.parallel = true;
    }
    Ok(config)
}

fn write_result(result: &AnomalyResult, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            let mut file =
                File::create(path).map_err(|e| format!("Failed to create output: {}", e))?;
            serde_json::to_writer_pretty(&mut file, result)
                .map_err(|e| format!("Failed to write JSON: {}", e))?;
            info!(path = %path.display(), "results written");
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, result)
                .map_err(|e| format!("Failed to write JSON: {}", e))?;
            writeln!(handle).map_err(|e| e.to_string())?;
        }
    }
    Ok(())
}

fn run_detect(
    input: PathBuf,
    config: Option<PathBuf>,
    overrides: Overrides,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let config = apply_overrides(load_config(config.as_deref())?, overrides)?;
    let graphs = load_graphs(&input)?;
    info!(
        n_graphs = graphs.len(),
        input = %input.display(),
        method = %config.method,
        time_window = config.time_window,
        "loaded graph sequence"
    );

    let result =
        anomaly_detection(GraphInput::Tensor(graphs), &config).map_err(|e| e.to_string())?;
    info!(
        graph_anomalies = result.graph_anomaly_count(),
        vertex_anomalies = result.vertex_anomaly_count(),
        "detection finished"
    );

    write_result(&result, output.as_deref())
}

fn run_config() -> CliResult<()> {
    let json = serde_json::to_string_pretty(&AnomalyConfig::default())
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "graph_anomaly=info,anomaly_core=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect {
            input,
            config,
            method,
            time_window,
            n_components,
            algorithm,
            parallel,
            output,
        } => run_detect(
            input,
            config,
            Overrides {
                method,
                time_window,
                n_components,
                algorithm,
                parallel,
            },
            output,
        ),

        Commands::Config => run_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let graphs = parse_graphs("[[[0, 1], [1, 0]], [[0, 2], [2, 0]]]").unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[1][0][1], 2.0);
    }

    #[test]
    fn test_parse_wrapped_object() {
        let graphs = parse_graphs(r#"{"graphs": [[[0.0, 1.0], [1.0, 0.0]]]}"#).unwrap();
        assert_eq!(graphs.len(), 1);
    }

    #[test]
    fn test_parse_rejects_flat_array() {
        assert!(parse_graphs("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let base = AnomalyConfig::from_json_str(r#"{"method": "omni", "time_window": 5}"#).unwrap();
        let config = apply_overrides(
            base,
            Overrides {
                method: Some("MASE".to_string()),
                time_window: Some(4),
                n_components: Some(2),
                algorithm: Some("full".to_string()),
                parallel: true,
            },
        )
        .unwrap();

        assert_eq!(config.method, EmbedMethod::Mase);
        assert_eq!(config.time_window, 4);
        assert_eq!(config.embed.n_components, Some(2));
        assert_eq!(config.embed.algorithm, SvdAlgorithm::Full);
        assert!(config.parallel);
    }

    #[test]
    fn test_missing_overrides_keep_config() {
        let base = AnomalyConfig::from_json_str(r#"{"time_window": 6}"#).unwrap();
        let config = apply_overrides(base.clone(), Overrides::default()).unwrap();
        assert_eq!(config, base);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let overrides = Overrides {
            method: Some("unknown".to_string()),
            ..Overrides::default()
        };
        let err = apply_overrides(AnomalyConfig::default(), overrides).unwrap_err();
        assert!(err.contains("method"));
    }

    #[test]
    fn test_cli_parses_detect() {
        let cli = Cli::try_parse_from([
            "graph-anomaly",
            "detect",
            "--input",
            "graphs.json",
            "--method",
            "mase",
            "--time-window",
            "4",
            "--parallel",
        ])
        .unwrap();
        match cli.command {
            Commands::Detect {
                method,
                time_window,
                parallel,
                ..
            } => {
                assert_eq!(method.as_deref(), Some("mase"));
                assert_eq!(time_window, Some(4));
                assert!(parallel);
            }
            Commands::Config => panic!("expected detect"),
        }
    }

    fn two_blocks(n: usize, within: f64, between: f64) -> Vec<Vec<f64>> {
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            0.0
                        } else if (i < n / 2) == (j < n / 2) {
                            within
                        } else {
                            between
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_run_detect_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("graphs.json");
        let output = dir.path().join("result.json");

        let mut graphs = vec![two_blocks(10, 0.8, 0.1); 5];
        graphs[3] = two_blocks(10, 0.1, 0.8);
        let mut file = File::create(&input).unwrap();
        write!(file, "{}", serde_json::json!({ "graphs": graphs })).unwrap();
        drop(file);

        let overrides = Overrides {
            method: Some("omni".to_string()),
            time_window: Some(3),
            n_components: Some(2),
            ..Overrides::default()
        };
        run_detect(input, None, overrides, Some(output.clone())).unwrap();

        let json = std::fs::read_to_string(&output).unwrap();
        let result: AnomalyResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.graph_anomaly_indices, vec![3]);
        assert_eq!(result.graph_anomaly_diagnostics.means.len(), 2);
    }

    #[test]
    fn test_run_detect_reports_invalid_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::json!(vec![two_blocks(4, 0.8, 0.1); 4])).unwrap();

        let overrides = Overrides {
            time_window: Some(2),
            ..Overrides::default()
        };
        let err = run_detect(file.path().to_path_buf(), None, overrides, None).unwrap_err();
        assert!(err.contains("time_window"));
    }
}

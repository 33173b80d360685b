use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use stockcast::application::workflow::{AnalysisMode, AnalysisWorkflow};
use stockcast::config::Config;
use stockcast::infrastructure::{CsvOhlcvSource, JsonFileArtifactStore};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model artifact path (overrides STOCKCAST_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Seed for sampling, splitting and the forest (overrides STOCKCAST_SEED)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute labeled feature rows
    Features {
        /// Daily OHLCV CSV (Date,Open,High,Low,Close,Volume)
        input: PathBuf,
    },
    /// Train the model and replace the stored artifact
    Train {
        /// Daily OHLCV CSV (Date,Open,High,Low,Close,Volume)
        input: PathBuf,
    },
    /// Recommend from the stored model
    Predict {
        /// Daily OHLCV CSV (Date,Open,High,Low,Close,Volume)
        input: PathBuf,
    },
    /// Retrain, then recommend from the new model
    Analyze {
        /// Daily OHLCV CSV (Date,Open,High,Low,Close,Volume)
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries only the JSON result
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model.model_path = model;
    }
    if let Some(seed) = cli.seed {
        config.model.seed = seed;
    }

    let (input, mode) = match cli.command {
        Commands::Features { input } => (input, AnalysisMode::Features),
        Commands::Train { input } => (input, AnalysisMode::Train),
        Commands::Predict { input } => (input, AnalysisMode::Predict),
        Commands::Analyze { input } => (input, AnalysisMode::TrainAndPredict),
    };

    info!(
        "Running {:?} on {:?} (model {:?}, seed {})",
        mode, input, config.model.model_path, config.model.seed
    );

    let store = JsonFileArtifactStore::new(config.model.model_path.clone());
    let workflow = AnalysisWorkflow::new(store, &config.model);
    let entries = workflow.run_source(&CsvOhlcvSource::new(input), mode);

    let output = if cli.pretty {
        serde_json::to_string_pretty(&entries)
    } else {
        serde_json::to_string(&entries)
    }
    .context("Failed to serialize output")?;
    println!("{}", output);

    Ok(())
}

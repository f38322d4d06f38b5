//! Malaria model trainer CLI
//!
//! Fits the predictor network on the monthly case spreadsheet (CSV export)
//! and writes the model and scaler artifacts the server loads.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use malaria_core::constants::{DEFAULT_MODEL_PATH, DEFAULT_SCALER_PATH};
use malaria_core::logic::training::{self, TrainingConfig};

#[derive(Parser, Debug)]
#[command(name = "malaria-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train the malaria risk network from a case spreadsheet", long_about = None)]
struct Args {
    /// Workbook (.xlsx, .xls, .ods) or CSV with `avg temp`, `humidity (%)`, `rainy days`, `sick of malaria` columns
    #[arg(short, long)]
    input: PathBuf,

    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    model_out: PathBuf,

    #[arg(long, default_value = DEFAULT_SCALER_PATH)]
    scaler_out: PathBuf,

    #[arg(long, default_value = "1000")]
    epochs: usize,

    /// Epochs without validation improvement before stopping
    #[arg(long, default_value = "100")]
    patience: usize,

    #[arg(long, default_value = "32")]
    hidden_size: usize,

    #[arg(long, default_value = "0.01")]
    learning_rate: f32,

    /// Share of rows held out for early stopping
    #[arg(long, default_value = "0.2")]
    val_fraction: f64,

    /// Seed for initialization, split and dropout
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if !(0.0..1.0).contains(&args.val_fraction) {
        anyhow::bail!("--val-fraction must be in [0, 1), got {}", args.val_fraction);
    }

    log::info!("Malaria trainer v{}", env!("CARGO_PKG_VERSION"));

    let config = TrainingConfig {
        hidden_size: args.hidden_size,
        epochs: args.epochs,
        patience: args.patience,
        learning_rate: args.learning_rate,
        val_fraction: args.val_fraction,
        seed: args.seed,
        ..Default::default()
    };

    let report = training::run(&args.input, &args.model_out, &args.scaler_out, config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

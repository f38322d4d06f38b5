//! Offline training job
//!
//! Reads the case spreadsheet (workbook or CSV), fits the standard scaler and network,
//! and writes the two artifacts the inference pipeline loads at startup.

pub mod dataset;
pub mod standardize;
pub mod trainer;

pub use dataset::Dataset;
pub use trainer::{TrainedModel, Trainer, TrainingConfig, TrainingReport};

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::logic::model::{ModelSource, ModelStore};

/// Train on `input` and write the model and scaler artifacts
pub fn run(
    input: &Path,
    model_out: &Path,
    scaler_out: &Path,
    config: TrainingConfig,
) -> Result<TrainingReport> {
    let dataset = Dataset::load(input)?;
    log::info!("Loaded {} rows from {}", dataset.len(), input.display());

    let trained = Trainer::new(config).fit(&dataset)?;

    // both artifacts land together or not at all
    let model_tmp = staging_path(model_out);
    let scaler_tmp = staging_path(scaler_out);
    let staged = ModelStore::new(&model_tmp)
        .save(&trained.params, ModelSource::Trained)
        .context("Failed to save model")
        .and_then(|_| {
            trained
                .scaler
                .save(&scaler_tmp)
                .context("Failed to save scaler")
        });
    if let Err(e) = staged {
        discard(&[&model_tmp, &scaler_tmp]);
        return Err(e);
    }

    if let Err(e) = fs::rename(&scaler_tmp, scaler_out) {
        discard(&[&model_tmp, &scaler_tmp]);
        return Err(e).with_context(|| format!("Failed to move scaler to {}", scaler_out.display()));
    }
    fs::rename(&model_tmp, model_out)
        .with_context(|| format!("Failed to move model to {}", model_out.display()))?;

    log::info!(
        "Training done: best_epoch={} val_loss={:.6} r2={:.3}",
        trained.report.best_epoch,
        trained.report.best_val_loss,
        trained.report.r2
    );
    Ok(trained.report)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn discard(paths: &[&Path]) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                log::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}

//! Inference Pipeline
//!
//! `RawInput → FeatureScaler → PredictorNetwork → classify`.
//!
//! Built once at startup and shared read-only; `predict` takes `&self` and
//! never writes to the pipeline, so concurrent callers need no locking.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::error::{PredictionError, StorageError};
use crate::logic::features::{LayoutInfo, RawInput};
use crate::logic::model::{ModelSource, ModelStore, PredictorNetwork};
use crate::logic::risk::{classify, PredictionResult};
use crate::logic::scaler::{FeatureScaler, ScalerKind};

/// Where to find artifacts and how to treat a missing checkpoint
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub seed: u64,
    /// Write the seeded fallback to `model_path` so later loads agree
    pub persist_untrained: bool,
    /// Refuse to start without a trained checkpoint
    pub require_trained: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            scaler_path: PathBuf::from(constants::DEFAULT_SCALER_PATH),
            seed: constants::DEFAULT_SEED,
            persist_untrained: false,
            require_trained: false,
        }
    }
}

/// Static description of what the pipeline is serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub model_source: ModelSource,
    pub input_size: usize,
    pub hidden_size: usize,
    pub parameter_count: usize,
    pub checksum: Option<String>,
    pub scaler_kind: ScalerKind,
    pub layout: LayoutInfo,
    pub max_cases: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct InferencePipeline {
    scaler: FeatureScaler,
    network: PredictorNetwork,
    source: ModelSource,
    checksum: Option<String>,
}

impl InferencePipeline {
    /// Assemble from already-loaded parts, checking that they fit together
    pub fn new(
        scaler: FeatureScaler,
        network: PredictorNetwork,
        source: ModelSource,
    ) -> Result<Self, StorageError> {
        if scaler.output_size() != network.input_size() {
            return Err(StorageError::FeatureCountMismatch {
                scaler: scaler.output_size(),
                network: network.input_size(),
            });
        }

        Ok(Self {
            scaler,
            network,
            source,
            checksum: None,
        })
    }

    /// Load both artifacts from disk
    pub fn load(config: &PipelineConfig) -> Result<Self, StorageError> {
        let store = ModelStore::new(&config.model_path).with_seed(config.seed);
        let loaded = store.load()?;

        if loaded.source == ModelSource::Untrained {
            if config.require_trained {
                return Err(StorageError::UntrainedModel(config.model_path.clone()));
            }
            log::warn!("Serving an untrained model: predictions carry no signal");

            if config.persist_untrained && !store.exists() {
                store.save(&loaded.params, ModelSource::Untrained)?;
            }
        }

        let scaler = FeatureScaler::load(&config.scaler_path)?;
        let mut pipeline = Self::new(scaler, PredictorNetwork::new(loaded.params), loaded.source)?;
        pipeline.checksum = loaded.checksum;

        log::info!(
            "Inference pipeline ready (model={:?}, scaler={:?}, features={:?})",
            pipeline.source,
            pipeline.scaler.kind(),
            pipeline.scaler.feature_names()
        );
        Ok(pipeline)
    }

    pub fn predict(&self, raw: &RawInput) -> Result<PredictionResult, PredictionError> {
        let features = self.scaler.scale(raw)?;
        let output = self.network.forward(&features)?;
        let probability = f64::from(output) * 100.0;
        let result = classify(probability, self.scaler.max_cases());

        if log::log_enabled!(log::Level::Debug) {
            let names = self.scaler.feature_names();
            log::debug!(
                "Prediction: features={} probability={:.2} tier={}",
                features.to_log_entry(names.as_slice()),
                result.probability,
                result.risk_level
            );
        }
        Ok(result)
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn network(&self) -> &PredictorNetwork {
        &self.network
    }

    pub fn model_source(&self) -> ModelSource {
        self.source
    }

    pub fn status(&self) -> PipelineStatus {
        let params = self.network.params();

        PipelineStatus {
            model_source: self.source,
            input_size: params.input_size(),
            hidden_size: params.hidden_size(),
            parameter_count: params.parameter_count(),
            checksum: self.checksum.clone(),
            scaler_kind: self.scaler.kind(),
            layout: LayoutInfo::for_names(self.scaler.feature_names()),
            max_cases: self.scaler.max_cases(),
        }
    }
}

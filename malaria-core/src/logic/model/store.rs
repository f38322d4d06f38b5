//! Model Store - parameter persistence
//!
//! A missing file is a supported degraded mode: the store hands back seeded
//! random parameters and marks them untrained. A file that exists but does
//! not fit the topology is a hard error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::params::{NetworkParameters, Tensor};
use crate::constants::{ARTIFACT_FORMAT_VERSION, DEFAULT_HIDDEN_SIZE, DEFAULT_SEED};
use crate::logic::error::StorageError;
use crate::logic::features::FEATURE_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSource {
    /// Loaded from a checkpoint
    Trained,
    /// Seeded random initialization, statistically meaningless
    Untrained,
}

/// On-disk layout of the parameters file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ParametersFile {
    format_version: u32,
    #[serde(default = "default_trained")]
    trained: bool,
    tensors: BTreeMap<String, Tensor>,
}

fn default_trained() -> bool {
    true
}

/// Result of `ModelStore::load`
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub params: NetworkParameters,
    pub source: ModelSource,
    /// SHA-256 of the file bytes, absent for in-memory fallbacks
    pub checksum: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
    seed: u64,
    default_input_size: usize,
    default_hidden_size: usize,
}

impl ModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seed: DEFAULT_SEED,
            default_input_size: FEATURE_COUNT,
            default_hidden_size: DEFAULT_HIDDEN_SIZE,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> Result<LoadedModel, StorageError> {
        if !self.path.exists() {
            log::warn!(
                "No model at {}, using untrained parameters (seed={})",
                self.path.display(),
                self.seed
            );
            return Ok(LoadedModel {
                params: NetworkParameters::seeded(
                    self.default_input_size,
                    self.default_hidden_size,
                    self.seed,
                ),
                source: ModelSource::Untrained,
                checksum: None,
            });
        }

        let data = fs::read(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let file: ParametersFile =
            serde_json::from_slice(&data).map_err(|e| StorageError::parse(&self.path, e))?;

        if file.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(file.format_version));
        }

        let params = NetworkParameters::from_tensors(&file.tensors)?;
        let checksum = hex::encode(Sha256::digest(&data));

        log::info!(
            "Loaded model from {} (input={}, hidden={}, sha256={})",
            self.path.display(),
            params.input_size(),
            params.hidden_size(),
            &checksum[..12]
        );

        Ok(LoadedModel {
            params,
            source: if file.trained { ModelSource::Trained } else { ModelSource::Untrained },
            checksum: Some(checksum),
        })
    }

    pub fn save(&self, params: &NetworkParameters, source: ModelSource) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let file = ParametersFile {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained: source == ModelSource::Trained,
            tensors: params.to_tensors(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|e| StorageError::parse(&self.path, e))?;
        fs::write(&self.path, json).map_err(|e| StorageError::io(&self.path, e))?;

        log::info!("Model saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{FeatureVector, FEATURE_LAYOUT};
    use crate::logic::model::PredictorNetwork;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_seeded_untrained() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));

        let a = store.load().unwrap();
        let b = store.load().unwrap();
        assert_eq!(a.source, ModelSource::Untrained);
        assert_eq!(a.params, b.params);
        assert_eq!(a.params.input_size(), FEATURE_COUNT);
        assert_eq!(a.params.hidden_size(), DEFAULT_HIDDEN_SIZE);
        assert!(a.checksum.is_none());
    }

    #[test]
    fn test_save_load_preserves_forward_pass() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("models").join("model.json"));
        let params = NetworkParameters::seeded(4, 32, 11);
        let probe = FeatureVector::new(FEATURE_LAYOUT, vec![0.3, -1.2, 0.8, 2.5]);
        let before = PredictorNetwork::new(params.clone()).forward(&probe).unwrap();

        store.save(&params, ModelSource::Trained).unwrap();
        let loaded = store.load().unwrap();
        let after = PredictorNetwork::new(loaded.params).forward(&probe).unwrap();

        assert_eq!(loaded.source, ModelSource::Trained);
        assert_eq!(before.to_bits(), after.to_bits());
        assert_eq!(loaded.checksum.unwrap().len(), 64);
    }

    #[test]
    fn test_untrained_flag_survives_save() {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json")).with_seed(5);
        let fallback = store.load().unwrap();
        store.save(&fallback.params, fallback.source).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.source, ModelSource::Untrained);
        assert_eq!(reloaded.params, fallback.params);
    }

    #[test]
    fn test_corrupted_shapes_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut tensors = NetworkParameters::seeded(4, 16, 1).to_tensors();
        tensors.get_mut("fc3.weight").unwrap().shape = vec![16, 32];
        let file = ParametersFile {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained: true,
            tensors,
        };
        fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();

        let err = ModelStore::new(&path).load().unwrap_err();
        assert!(matches!(err, StorageError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_garbage_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"PK\x03\x04 not a checkpoint").unwrap();
        assert!(matches!(
            ModelStore::new(&path).load(),
            Err(StorageError::Parse { .. })
        ));
    }

    #[test]
    fn test_unsupported_version_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        let file = ParametersFile {
            format_version: 99,
            trained: true,
            tensors: NetworkParameters::seeded(4, 8, 1).to_tensors(),
        };
        fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();
        assert!(matches!(
            ModelStore::new(&path).load(),
            Err(StorageError::UnsupportedVersion(99))
        ));
    }
}

//! Scaler artifact persistence
//!
//! Written by the training job, read once at startup. The artifact fixes
//! the feature ordering and optionally carries the historical case maximum
//! used to turn probabilities back into case counts.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ARTIFACT_FORMAT_VERSION;
use crate::logic::error::StorageError;
use crate::logic::features::layout::feature_index;

/// Per-feature linear transform `(value - center) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTransform {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Persisted scaler state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub format_version: u32,
    /// Feature order the network was fitted with
    pub feature_names: Vec<String>,
    /// `None` means values are fed to the network unscaled
    #[serde(default)]
    pub transform: Option<LinearTransform>,
    /// Largest monthly case count seen during training
    #[serde(default)]
    pub max_cases: Option<f64>,
    #[serde(default)]
    pub fitted_at: Option<DateTime<Utc>>,
}

impl ScalerArtifact {
    pub fn new(
        feature_names: Vec<String>,
        transform: Option<LinearTransform>,
        max_cases: Option<f64>,
    ) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names,
            transform,
            max_cases,
            fitted_at: Some(Utc::now()),
        }
    }

    /// Load and validate. Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>, StorageError> {
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(path).map_err(|e| StorageError::io(path, e))?;
        let artifact: ScalerArtifact =
            serde_json::from_slice(&data).map_err(|e| StorageError::parse(path, e))?;
        artifact.validate()?;

        log::info!(
            "Loaded scaler artifact from {} ({} features, max_cases={:?})",
            path.display(),
            artifact.feature_names.len(),
            artifact.max_cases
        );
        Ok(Some(artifact))
    }

    /// Save to disk, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let json = serde_json::to_vec_pretty(self).map_err(|e| StorageError::parse(path, e))?;
        fs::write(path, json).map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion(self.format_version));
        }
        if self.feature_names.is_empty() {
            return Err(invalid("feature_names must not be empty"));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_names {
            if feature_index(name).is_none() {
                return Err(invalid(format!("unknown feature `{}`", name)));
            }
            if !seen.insert(name.as_str()) {
                return Err(invalid(format!("duplicate feature `{}`", name)));
            }
        }

        if let Some(transform) = &self.transform {
            let n = self.feature_names.len();
            if transform.center.len() != n || transform.scale.len() != n {
                return Err(invalid(format!(
                    "transform has {} centers and {} scales for {} features",
                    transform.center.len(),
                    transform.scale.len(),
                    n
                )));
            }
            if transform.center.iter().any(|v| !v.is_finite()) {
                return Err(StorageError::NonFinite("transform.center".to_string()));
            }
            if transform.scale.iter().any(|v| !v.is_finite() || *v == 0.0) {
                return Err(invalid("transform.scale must be finite and non-zero"));
            }
        }

        if let Some(max_cases) = self.max_cases {
            if !max_cases.is_finite() || max_cases < 0.0 {
                return Err(invalid(format!("max_cases must be >= 0, got {}", max_cases)));
            }
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> StorageError {
    StorageError::InvalidScaler(msg.into())
}

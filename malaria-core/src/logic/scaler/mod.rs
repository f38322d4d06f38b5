//! Scaler Module - raw input to network input
//!
//! Two strategies behind one type, picked once at load time:
//! - `Fitted`: driven by the training job's artifact (authoritative).
//! - `FixedRange`: documented min-max constants, used only without an artifact.

pub mod artifact;
pub mod fixed_range;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::error::{StorageError, ValidationError};
use crate::logic::features::{FeatureVector, RawInput, FEATURE_COUNT, FEATURE_LAYOUT};

pub use artifact::{LinearTransform, ScalerArtifact};
pub use fixed_range::{FixedRangeScaler, RangeRule, FIXED_RANGE_RULES};

/// Largest magnitude a scaled feature may carry into the network
pub const MAX_SCALED_MAGNITUDE: f32 = 1.0e6;

/// Narrow a scaled value to network precision
pub(crate) fn to_network_value(field: &str, raw: f64, scaled: f64) -> Result<f32, ValidationError> {
    let value = scaled as f32;
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
            value: f64::from(value),
        });
    }
    if value.abs() > MAX_SCALED_MAGNITUDE {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: raw,
        });
    }
    Ok(value)
}

/// Scaler built from a persisted artifact
#[derive(Debug, Clone, PartialEq)]
pub struct FittedScaler {
    artifact: ScalerArtifact,
}

impl FittedScaler {
    pub fn new(artifact: ScalerArtifact) -> Result<Self, StorageError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn artifact(&self) -> &ScalerArtifact {
        &self.artifact
    }

    pub fn transform(&self, raw: &RawInput) -> Result<FeatureVector, ValidationError> {
        let reading = raw.resolve()?;
        let names = &self.artifact.feature_names;

        let mut values = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let value = reading.value(name)?;
            let scaled = match &self.artifact.transform {
                Some(t) => (value - t.center[i]) / t.scale[i],
                None => value,
            };
            values.push(to_network_value(name, value, scaled)?);
        }

        Ok(FeatureVector::new(names.as_slice(), values))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalerKind {
    Fitted,
    FixedRange,
}

/// Feature scaling capability
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureScaler {
    Fitted(FittedScaler),
    FixedRange(FixedRangeScaler),
}

impl FeatureScaler {
    /// Fitted when the artifact exists, fixed-range otherwise
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        match ScalerArtifact::load(path)? {
            Some(artifact) => Ok(FeatureScaler::Fitted(FittedScaler::new(artifact)?)),
            None => {
                log::warn!(
                    "No scaler artifact at {}, using fixed-range normalization",
                    path.display()
                );
                Ok(FeatureScaler::FixedRange(FixedRangeScaler::new()))
            }
        }
    }

    pub fn scale(&self, raw: &RawInput) -> Result<FeatureVector, ValidationError> {
        match self {
            FeatureScaler::Fitted(s) => s.transform(raw),
            FeatureScaler::FixedRange(s) => s.transform(&raw.resolve()?),
        }
    }

    pub fn kind(&self) -> ScalerKind {
        match self {
            FeatureScaler::Fitted(_) => ScalerKind::Fitted,
            FeatureScaler::FixedRange(_) => ScalerKind::FixedRange,
        }
    }

    /// Width of the vectors this scaler produces
    pub fn output_size(&self) -> usize {
        match self {
            FeatureScaler::Fitted(s) => s.artifact.feature_names.len(),
            FeatureScaler::FixedRange(_) => FEATURE_COUNT,
        }
    }

    pub fn feature_names(&self) -> Vec<String> {
        match self {
            FeatureScaler::Fitted(s) => s.artifact.feature_names.clone(),
            FeatureScaler::FixedRange(_) => FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Historical case ceiling, only known with an artifact
    pub fn max_cases(&self) -> Option<f64> {
        match self {
            FeatureScaler::Fitted(s) => s.artifact.max_cases,
            FeatureScaler::FixedRange(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::layout::{compute_layout_hash, layout_hash};
    use tempfile::tempdir;

    fn fitted(names: &[&str], center: Vec<f64>, scale: Vec<f64>) -> FeatureScaler {
        let artifact = ScalerArtifact::new(
            names.iter().map(|s| s.to_string()).collect(),
            Some(LinearTransform { center, scale }),
            Some(200.0),
        );
        FeatureScaler::Fitted(FittedScaler::new(artifact).unwrap())
    }

    #[test]
    fn test_fitted_applies_transform() {
        let scaler = fitted(FEATURE_LAYOUT, vec![25.0, 50.0, 0.0, 0.0], vec![5.0, 10.0, 1.0, 2.0]);
        let raw = RawInput::builder()
            .temperature(30.0)
            .humidity(70.0)
            .rainy_days(3.0)
            .previous_cases(10.0)
            .build();

        let v = scaler.scale(&raw).unwrap();
        assert_eq!(v.values, vec![1.0, 2.0, 3.0, 5.0]);
        assert_eq!(v.layout_hash, layout_hash());
    }

    #[test]
    fn test_fitted_follows_artifact_order() {
        let names = ["previous_cases", "temperature"];
        let scaler = fitted(&names, vec![0.0, 0.0], vec![1.0, 1.0]);
        let raw = RawInput::builder().temperature(31.0).previous_cases(7.0).build();

        let v = scaler.scale(&raw).unwrap();
        assert_eq!(v.values, vec![7.0, 31.0]);
        assert_eq!(v.layout_hash, compute_layout_hash(&names));
        assert_eq!(scaler.output_size(), 2);
    }

    #[test]
    fn test_fitted_without_transform_passes_values_through() {
        let artifact = ScalerArtifact::new(
            FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            None,
            None,
        );
        let scaler = FeatureScaler::Fitted(FittedScaler::new(artifact).unwrap());
        let v = scaler.scale(&RawInput::default()).unwrap();
        assert_eq!(v.values, vec![25.0, 50.0, 0.0, 0.0]);
    }

    #[test]
    fn test_missing_artifact_selects_fixed_range() {
        let dir = tempdir().unwrap();
        let scaler = FeatureScaler::load(&dir.path().join("scaler.json")).unwrap();
        assert_eq!(scaler.kind(), ScalerKind::FixedRange);
        assert_eq!(scaler.max_cases(), None);
        assert_eq!(scaler.output_size(), FEATURE_COUNT);
    }

    #[test]
    fn test_existing_artifact_selects_fitted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scaler.json");
        let artifact = ScalerArtifact::new(
            FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            None,
            Some(120.0),
        );
        artifact.save(&path).unwrap();

        let scaler = FeatureScaler::load(&path).unwrap();
        assert_eq!(scaler.kind(), ScalerKind::Fitted);
        assert_eq!(scaler.max_cases(), Some(120.0));
    }

    #[test]
    fn test_validation_error_propagates() {
        let scaler = FeatureScaler::FixedRange(FixedRangeScaler::new());
        let raw = RawInput::builder().humidity("humid").build();
        assert!(scaler.scale(&raw).is_err());
    }

    fn assert_scaled_or_rejected(scaler: &FeatureScaler, raw: &RawInput) {
        match scaler.scale(raw) {
            Ok(v) => assert!(
                v.values.iter().all(|x| x.is_finite() && x.abs() <= MAX_SCALED_MAGNITUDE),
                "{:?} -> {:?}",
                raw,
                v.values
            ),
            Err(e) => assert!(
                matches!(e, ValidationError::NotFinite { .. } | ValidationError::OutOfRange { .. }),
                "{:?} -> {}",
                raw,
                e
            ),
        }
    }

    #[test]
    fn test_extreme_values_never_leave_f32_range() {
        let extremes = [
            0.0,
            28.0,
            -40.0,
            1.0e6,
            1.0e39,
            1.0e40,
            1.0e300,
            -1.0e300,
            f64::MAX,
            f64::MIN,
            f64::MIN_POSITIVE,
        ];
        let scalers = [
            FeatureScaler::FixedRange(FixedRangeScaler::new()),
            fitted(FEATURE_LAYOUT, vec![25.0, 50.0, 3.0, 10.0], vec![5.0, 10.0, 2.0, 1.0e-3]),
        ];

        for scaler in &scalers {
            for &a in &extremes {
                for &b in &extremes {
                    let raw = RawInput::builder()
                        .temperature(a)
                        .humidity(b)
                        .rainy_days(b)
                        .previous_cases(a)
                        .build();
                    assert_scaled_or_rejected(scaler, &raw);
                }
            }
        }
    }

    #[test]
    fn test_overflowing_temperature_names_the_field() {
        let scaler = FeatureScaler::FixedRange(FixedRangeScaler::new());
        for temperature in [1.0e40, 1.0e300, -1.0e300] {
            let raw = RawInput::builder().temperature(temperature).build();
            match scaler.scale(&raw) {
                Err(ValidationError::NotFinite { field, .. }) => assert_eq!(field, "temperature"),
                other => panic!("{} gave {:?}", temperature, other),
            }
        }

        let raw = RawInput::builder().temperature(1.0e39).build();
        assert!(matches!(
            scaler.scale(&raw),
            Err(ValidationError::OutOfRange { ref field, .. }) if field == "temperature"
        ));
    }

    #[test]
    fn test_fitted_rejects_scale_overflow() {
        let scaler = fitted(FEATURE_LAYOUT, vec![0.0; 4], vec![1.0, 1.0, 1.0, 1.0e-300]);
        let raw = RawInput::builder().previous_cases(1.0).build();
        match scaler.scale(&raw) {
            Err(ValidationError::NotFinite { field, .. }) => assert_eq!(field, "previous_cases"),
            other => panic!("expected overflow, got {:?}", other),
        }
    }

    #[test]
    fn test_fixed_range_is_stable_across_calls() {
        let scaler = FeatureScaler::FixedRange(FixedRangeScaler::new());
        let raw = RawInput::builder().temperature(28.0).humidity(75.0).build();
        assert_eq!(scaler.scale(&raw).unwrap(), scaler.scale(&raw).unwrap());
    }
}

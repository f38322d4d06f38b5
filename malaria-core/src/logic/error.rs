//! Error taxonomy for the inference core
//!
//! - `ValidationError`: caller input could not be coerced.
//! - `StorageError`: a persisted artifact is unusable. Fatal at load time.
//! - `PredictionError`: the single error surfaced by `InferencePipeline::predict`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("field `{field}` must be numeric, got {value}")]
    NotNumeric { field: String, value: String },

    #[error("field `{field}` must be finite, got {value}")]
    NotFinite { field: String, value: f64 },

    #[error("field `{field}` is outside the supported range, got {value}")]
    OutOfRange { field: String, value: f64 },

    #[error("unknown feature `{0}`")]
    UnknownFeature(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported artifact format version {0}")]
    UnsupportedVersion(u32),

    #[error("missing tensor `{0}`")]
    MissingTensor(String),

    #[error("unexpected tensor `{0}`")]
    UnexpectedTensor(String),

    #[error("tensor `{name}` has shape {actual:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("tensor `{name}` holds {actual} values, shape requires {expected}")]
    DataLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("`{0}` contains non-finite values")]
    NonFinite(String),

    #[error("invalid scaler artifact: {0}")]
    InvalidScaler(String),

    #[error("scaler produces {scaler} features but the network expects {network}")]
    FeatureCountMismatch { scaler: usize, network: usize },

    #[error("no trained model at {}", .0.display())]
    UntrainedModel(PathBuf),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StorageError::Parse { path: path.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("model unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("feature vector has {actual} values, network expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("network produced a non-finite output")]
    NonFiniteOutput,
}

impl PredictionError {
    /// True when the caller, not the model, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictionError::Validation(_))
    }
}

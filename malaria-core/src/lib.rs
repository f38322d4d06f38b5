//! Malaria risk inference core
//!
//! Shared by the HTTP server and the `malaria-train` binary.

pub mod constants;
pub mod logic;

pub use logic::error::{PredictionError, StorageError, ValidationError};
pub use logic::features::{ClimateReading, RawInput, RawValue};
pub use logic::model::ModelSource;
pub use logic::pipeline::{InferencePipeline, PipelineConfig, PipelineStatus};
pub use logic::risk::{Confidence, PredictionResult, RiskTier};

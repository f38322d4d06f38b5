//! Logic Module - inference and training engines
//!
//! - `features/` - canonical feature schema, raw input coercion, vectors
//! - `scaler/` - fitted and fixed-range feature scaling
//! - `model/` - network parameters, forward pass, persistence
//! - `risk` - probability to tier/recommendation mapping
//! - `pipeline` - the assembled `RawInput → PredictionResult` path
//! - `training/` - offline trainer producing both artifacts

pub mod error;
pub mod features;
pub mod model;
pub mod pipeline;
pub mod risk;
pub mod scaler;
pub mod training;

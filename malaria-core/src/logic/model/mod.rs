//! Model Module - network parameters, forward pass, persistence
//!
//! Pure-Rust dense inference over `ndarray`; no runtime session to manage.

pub mod network;
pub mod params;
pub mod store;

// Re-export common types
pub use network::{PredictorNetwork, DROPOUT_RATES};
pub use params::{DenseLayer, NetworkParameters, Tensor, LAYER_NAMES};
pub use store::{LoadedModel, ModelSource, ModelStore};

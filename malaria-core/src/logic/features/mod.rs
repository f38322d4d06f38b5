//! Features Module - raw input, layout and vectors
//!
//! Owns the canonical 4-feature schema. Scalers turn a `RawInput` into a
//! `FeatureVector` following either this layout or an artifact's ordering.

pub mod input;
pub mod layout;
pub mod vector;

// Re-export common types
pub use input::{ClimateReading, RawInput, RawInputBuilder, RawValue};
pub use layout::{layout_hash, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::FeatureVector;

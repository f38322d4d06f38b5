//! Feature Vector - Core data structure for ML input
//!
//! Carries the normalized values together with the hash of the ordering
//! they were produced in, so a vector can be checked against a network or
//! scaler before it is consumed.

use serde::{Deserialize, Serialize};

use super::layout::compute_layout_hash;

/// Normalized, ordered network input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the ordering used to build `values`
    pub layout_hash: u32,
    /// Normalized values
    pub values: Vec<f32>,
}

impl FeatureVector {
    /// Build from values produced in the given feature order
    pub fn new<S: AsRef<str>>(names: &[S], values: Vec<f32>) -> Self {
        Self {
            layout_hash: compute_layout_hash(names),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry<S: AsRef<str>>(&self, names: &[S]) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": names.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.as_ref().to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

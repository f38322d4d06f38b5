//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema.**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! Scaler artifacts and checkpoints are fitted against a specific ordering.
//! The layout hash lets a running service tell which ordering a vector used.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in the exact order the network consumes them
pub const FEATURE_LAYOUT: &[&str] = &[
    "temperature",      // 0: mean air temperature (°C)
    "humidity",         // 1: relative humidity (%)
    "rainy_days",       // 2: rainy days in the period
    "previous_cases",   // 3: cases reported in the previous month
];

/// Total number of features
/// IMPORTANT: Must match FEATURE_LAYOUT.len()!
pub const FEATURE_COUNT: usize = 4;

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and an ordered list of feature names
pub fn compute_layout_hash<S: AsRef<str>>(names: &[S]) -> u32 {
    let mut hasher = Hasher::new();

    hasher.update(&[FEATURE_VERSION]);

    for name in names {
        hasher.update(name.as_ref().as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Hash of the canonical layout
pub fn layout_hash() -> u32 {
    compute_layout_hash(FEATURE_LAYOUT)
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Ordering a scaler produces, as reported by the status endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn for_names(feature_names: Vec<String>) -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: compute_layout_hash(feature_names.as_slice()),
            feature_count: feature_names.len(),
            feature_names,
        }
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Get feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

// ============================================================================
// TESTS
// ============================================================================

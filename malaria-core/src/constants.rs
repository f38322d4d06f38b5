//! Central Configuration Constants
//!
//! Single source of truth for artifact locations and seeds.
//! Both the server and the training job read their defaults from here.

/// Default location of the trained network parameters
pub const DEFAULT_MODEL_PATH: &str = "models/malaria_model.json";

/// Default location of the fitted scaler artifact
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";

/// Seed used for untrained fallback parameters and for training
pub const DEFAULT_SEED: u64 = 42;

/// Hidden width used when no checkpoint exists
pub const DEFAULT_HIDDEN_SIZE: usize = 64;

/// Hidden width used by the training job
pub const DEFAULT_TRAIN_HIDDEN_SIZE: usize = 32;

/// Width of the third hidden layer (fixed by the topology)
pub const THIRD_LAYER_SIZE: usize = 32;

/// On-disk format version shared by both artifacts
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get scaler path from environment or use default
pub fn get_scaler_path() -> String {
    std::env::var("SCALER_PATH")
        .unwrap_or_else(|_| DEFAULT_SCALER_PATH.to_string())
}

/// Get model seed from environment or use default
pub fn get_model_seed() -> u64 {
    std::env::var("MODEL_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED)
}

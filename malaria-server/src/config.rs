//! Configuration module

use std::env;
use std::path::PathBuf;

use malaria_core::constants;
use malaria_core::PipelineConfig;

const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:3001";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    pub model_path: PathBuf,
    pub scaler_path: PathBuf,

    /// Seed for the untrained fallback network
    pub model_seed: u64,

    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,

    /// Write the untrained fallback to `model_path` on first start
    pub persist_untrained: bool,

    /// Refuse to start without a trained checkpoint
    pub require_trained: bool,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            model_path: PathBuf::from(constants::get_model_path()),
            scaler_path: PathBuf::from(constants::get_scaler_path()),
            model_seed: constants::get_model_seed(),

            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),

            persist_untrained: env_flag("PERSIST_UNTRAINED_MODEL", true),
            require_trained: env_flag("REQUIRE_TRAINED_MODEL", false),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            model_path: self.model_path.clone(),
            scaler_path: self.scaler_path.clone(),
            seed: self.model_seed,
            persist_untrained: self.persist_untrained,
            require_trained: self.require_trained,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(String::from)
        .collect()
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

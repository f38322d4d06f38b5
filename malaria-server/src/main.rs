//! Malaria Risk API Server
//!
//! Serves predictions from the inference pipeline in `malaria-core`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    MALARIA RISK API                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌───────────┐     ┌─────────────────────────────────┐   │
//! │  │  Axum     │ ──▶ │  InferencePipeline (Arc, shared) │   │
//! │  │  Router   │     │  scaler → network → classify     │   │
//! │  └───────────┘     └───────────────┬─────────────────┘   │
//! │                                    ▼                     │
//! │                   models/malaria_model.json              │
//! │                   models/scaler.json                     │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use malaria_core::InferencePipeline;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "malaria_server=debug,malaria_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();

    tracing::info!("Malaria Risk API v{} starting ({})", env!("CARGO_PKG_VERSION"), config.environment);
    tracing::info!("Model: {}", config.model_path.display());
    tracing::info!("Scaler: {}", config.scaler_path.display());

    let pipeline = InferencePipeline::load(&config.pipeline_config())
        .context("Failed to load inference pipeline")?;

    if config.is_production() && pipeline.model_source() != malaria_core::ModelSource::Trained {
        tracing::warn!("Production environment is serving an untrained model");
    }

    // Build application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health::check))
        .route("/api/model", get(handlers::model::status))
        .route("/api/predict-malaria", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // a wildcard cannot be combined with credentials
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|o| o.as_str() != "*")
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

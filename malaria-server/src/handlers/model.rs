//! Model status handler

use axum::{extract::State, Json};

use malaria_core::PipelineStatus;

use crate::AppState;

/// What the pipeline is serving: source, sizes, checksum, scaler
pub async fn status(State(state): State<AppState>) -> Json<PipelineStatus> {
    Json(state.pipeline.status())
}

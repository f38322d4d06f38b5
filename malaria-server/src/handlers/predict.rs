//! Prediction handler

use axum::{extract::State, Json};

use malaria_core::{PredictionResult, RawInput};

use crate::{AppResult, AppState};

/// POST /api/predict-malaria
///
/// All fields are optional; missing or null ones take the documented
/// defaults. Unknown fields are ignored.
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<RawInput>,
) -> AppResult<Json<PredictionResult>> {
    tracing::debug!("Prediction request: {:?}", input);

    let result = state.pipeline.predict(&input)?;

    tracing::info!(
        "Prediction: {:.2}% ({}), cases={:?}",
        result.probability,
        result.risk_level,
        result.predicted_cases
    );
    Ok(Json(result))
}

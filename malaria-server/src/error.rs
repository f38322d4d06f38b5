//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use malaria_core::PredictionError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Request fields that could not be coerced
    #[error("{0}")]
    ValidationError(String),

    /// Anything else the pipeline reports while predicting
    #[error("Prediction error: {0}")]
    PredictionFailed(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PredictionFailed(msg) => {
                tracing::error!("Prediction error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::Validation(e) => AppError::ValidationError(e.to_string()),
            other => AppError::PredictionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malaria_core::ValidationError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_maps_to_400() {
        let err: AppError = PredictionError::Validation(ValidationError::NotNumeric {
            field: "humidity".to_string(),
            value: "\"wet\"".to_string(),
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("humidity"));
    }

    #[tokio::test]
    async fn test_other_errors_map_to_500() {
        let err: AppError = PredictionError::NonFiniteOutput.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["status"], 500);
        assert_eq!(
            body["error"],
            "Prediction error: network produced a non-finite output"
        );
    }
}

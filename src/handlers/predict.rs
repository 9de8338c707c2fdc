//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use uuid::Uuid;

use crate::models::{PredictionRequest, PredictionResponse};
use crate::{AppError, AppResult, AppState};

/// Validate -> check model -> build vector -> classify -> attribute
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictionRequest>, JsonRejection>,
) -> AppResult<Json<PredictionResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::MalformedRequest(rejection.body_text()))?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id);

    span.in_scope(|| -> AppResult<()> {
        tracing::debug!(
            season = %request.season,
            crop_type = %request.crop_type,
            "Prediction requested"
        );
        request.check().map_err(AppError::Validation)
    })?;

    // Tree traversal and attribution are CPU-bound; keep them off the runtime threads
    let context = state.context.clone();
    let conditions = request.conditions();
    let result = tokio::task::spawn_blocking(move || {
        span.in_scope(|| -> AppResult<_> {
            let predictor = context.predictor().ok_or(AppError::ModelNotLoaded)?;
            Ok(predictor.predict(&conditions)?)
        })
    })
    .await
    .map_err(|e| AppError::Internal(format!("prediction task failed: {}", e)))??;

    Ok(Json(PredictionResponse::from(result)))
}

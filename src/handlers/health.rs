//! Liveness and health check handlers

use axum::{extract::State, Json};

use crate::models::{HealthResponse, RootResponse};
use crate::AppState;

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Crop Stress API is running",
    })
}

/// `model_loaded` reflects the classifier only
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.context.is_model_loaded(),
    })
}

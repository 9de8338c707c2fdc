//! Error handling
//!
//! Prediction failures are reported in the body as `{success: false, error}`
//! with HTTP 200. Only a body that cannot be parsed gets a 422.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::logic::PredictError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// One or more range rules violated (messages already joined)
    #[error("{0}")]
    Validation(String),

    #[error("Model not loaded")]
    ModelNotLoaded,

    #[error("{0}")]
    MalformedRequest(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::OK,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Validation(msg) => tracing::info!("Rejected prediction request: {}", msg),
            AppError::ModelNotLoaded => tracing::warn!("Prediction requested but model is not loaded"),
            AppError::MalformedRequest(msg) => tracing::info!("Malformed prediction request: {}", msg),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        AppError::Internal(err.to_string())
    }
}

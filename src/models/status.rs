//! Liveness, health and model status

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logic::ModelContext;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

/// Read-only view of the loaded artifacts
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    pub schema_loaded: bool,
    pub explainer_ready: bool,
    pub feature_count: Option<usize>,
    pub layout_hash: Option<String>,
    pub model_sha256: Option<String>,
    pub num_trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub environment: String,
}

impl ModelStatus {
    pub fn from_context(context: &ModelContext, environment: &str) -> Self {
        let schema = context.schema();
        let info = context.model_info();
        Self {
            model_loaded: context.is_model_loaded(),
            schema_loaded: context.is_schema_loaded(),
            explainer_ready: context.is_explainer_ready(),
            feature_count: schema.map(|s| s.len()),
            layout_hash: schema.map(|s| format!("{:08x}", s.layout_hash())),
            model_sha256: info.map(|i| i.sha256.clone()),
            num_trees: info.map(|i| i.num_trees),
            max_depth: info.map(|i| i.max_depth),
            loaded_at: info.map(|i| i.loaded_at),
            environment: environment.to_string(),
        }
    }
}

//! Crop Stress Monitoring API
//!
//! Classifies crop stress from a handful of field observations and explains
//! which factors drove the prediction.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     CROP STRESS API                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │  Axum     │──▶│  Feature Vector  │──▶│  Attribution   │  │
//! │  │  Handlers │   │  Builder         │   │  Ranker        │  │
//! │  └───────────┘   └────────┬─────────┘   └───────┬────────┘  │
//! │                           ▼                     ▼           │
//! │                  ┌─────────────────┐   ┌─────────────────┐  │
//! │                  │ Feature Schema  │   │ XGBoost forest  │  │
//! │                  │ (+ baseline)    │   │ + TreeSHAP      │  │
//! │                  └─────────────────┘   └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod logic;
mod models;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::LogFormat;
use logic::ModelContext;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    init_logging(config.log_format);

    tracing::info!("Crop Stress API starting...");
    tracing::info!("Environment: {}", config.environment);

    // Artifacts are read synchronously; keep that off the runtime threads
    let paths = config.artifact_paths();
    let context = tokio::task::spawn_blocking(move || ModelContext::load(&paths))
        .await
        .context("model loading task failed")?;

    if !context.is_model_loaded() {
        tracing::warn!("⚠️  Serving without a model; predictions will report 'Model not loaded'");
    }

    // Build application state
    let state = AppState {
        config: config.clone(),
        context: Arc::new(context),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "crop_stress_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub context: Arc<ModelContext>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/api/health", get(handlers::health::check))
        .route("/api/model", get(handlers::model::status))
        .route("/api/predict", post(handlers::predict::predict))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Panics surface as the standard failure body
fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    AppError::Internal(detail).into_response()
}

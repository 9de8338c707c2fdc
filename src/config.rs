//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::logic::ArtifactPaths;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Trained model (XGBoost JSON)
    pub model_path: PathBuf,

    /// Training rows used for baseline means
    pub train_data_path: PathBuf,

    /// Ordered feature list
    pub features_path: PathBuf,

    pub log_format: LogFormat,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_models_dir(PathBuf::from("./models"))
    }
}

impl Config {
    fn with_models_dir(models_dir: PathBuf) -> Self {
        Self {
            port: 8001,
            model_path: models_dir.join("crop_stress_model.json"),
            train_data_path: models_dir.join("X_train.csv"),
            features_path: models_dir.join("feature_columns.json"),
            log_format: LogFormat::Pretty,
            environment: "development".to_string(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let models_dir = env::var("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./models"));
        let defaults = Self::with_models_dir(models_dir);

        let log_format = env::var("LOG_FORMAT").ok().and_then(|f| LogFormat::parse(&f));

        let mut config = Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            train_data_path: env::var("TRAIN_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.train_data_path),

            features_path: env::var("FEATURES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_path),

            log_format: log_format.unwrap_or(defaults.log_format),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        };

        // Production defaults to JSON logs
        if log_format.is_none() && config.is_production() {
            config.log_format = LogFormat::Json;
        }
        config
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        ArtifactPaths {
            model: self.model_path.clone(),
            train_data: self.train_data_path.clone(),
            features: self.features_path.clone(),
        }
    }
}

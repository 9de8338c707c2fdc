//! Startup artifact loading errors

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure while loading the schema, baseline or model artifacts.
///
/// Any of these marks the dependent subsystem unavailable for the
/// lifetime of the process.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    #[error("no baseline column for feature '{0}'")]
    MissingBaseline(String),

    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("feature layout mismatch at position {position}: model has '{model}', schema has '{schema}'")]
    LayoutMismatch {
        position: usize,
        model: String,
        schema: String,
    },
}

impl LoadError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io { path: path.to_path_buf(), source }
    }

    pub fn malformed(path: &Path, message: impl ToString) -> Self {
        LoadError::Malformed {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

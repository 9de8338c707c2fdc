//! Model Context - process-wide, read-only prediction state
//!
//! Built once before the server starts and shared behind an `Arc`. Each
//! artifact loads independently; a failure leaves that part `None` for the
//! lifetime of the process and is reported through `predictor()` returning
//! `None` instead of a crash.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::logic::error::LoadError;
use crate::logic::explain::{AttributionEngine, TreeShapExplainer};
use crate::logic::features::builder::OBSERVED_FEATURES;
use crate::logic::features::FeatureSchema;
use crate::logic::model::{Classifier, Forest, XgbClassifier};
use crate::logic::predictor::Predictor;

/// Locations of the startup artifacts
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub train_data: PathBuf,
    pub features: PathBuf,
}

/// Metadata about the loaded model file
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub num_trees: usize,
    pub max_depth: usize,
    pub sha256: String,
    pub loaded_at: DateTime<Utc>,
}

pub struct ModelContext {
    schema: Option<FeatureSchema>,
    classifier: Option<Box<dyn Classifier>>,
    explainer: Option<Box<dyn AttributionEngine>>,
    model_info: Option<ModelInfo>,
}

impl ModelContext {
    pub fn new(
        schema: Option<FeatureSchema>,
        classifier: Option<Box<dyn Classifier>>,
        explainer: Option<Box<dyn AttributionEngine>>,
    ) -> Self {
        Self {
            schema,
            classifier,
            explainer,
            model_info: None,
        }
    }

    /// Nothing loaded; every prediction reports "Model not loaded"
    pub fn unavailable() -> Self {
        Self::new(None, None, None)
    }

    /// Load every artifact, logging each outcome. Never fails as a whole.
    pub fn load(paths: &ArtifactPaths) -> Self {
        let schema = match load_schema(paths) {
            Ok(schema) => {
                tracing::info!(
                    "✅ Feature schema loaded ({} features, layout {:08x})",
                    schema.len(),
                    schema.layout_hash()
                );
                for name in OBSERVED_FEATURES {
                    if let Some(mean) = schema.baseline_value(name) {
                        tracing::debug!("Baseline {} = {:.3}", name, mean);
                    }
                }
                Some(schema)
            }
            Err(e) => {
                tracing::error!("❌ Error loading feature schema: {}", e);
                None
            }
        };

        let forest = match load_forest(paths, schema.as_ref()) {
            Ok((forest, checksum)) => {
                tracing::info!("✅ Model loaded ({} trees, sha256 {})", forest.trees().len(), checksum);
                Some((Arc::new(forest), checksum))
            }
            Err(e) => {
                tracing::error!("❌ Error loading model: {}", e);
                None
            }
        };

        // Attribution needs both the model and the training data
        let explainer: Option<Box<dyn AttributionEngine>> = match (&forest, &schema) {
            (Some((forest, _)), Some(_)) => match TreeShapExplainer::new(forest.clone()) {
                Ok(explainer) => {
                    tracing::info!("✅ TreeSHAP explainer initialized");
                    Some(Box::new(explainer))
                }
                Err(e) => {
                    tracing::warn!("⚠️  TreeSHAP explainer initialization failed: {}", e);
                    None
                }
            },
            _ => None,
        };

        let model_info = forest.as_ref().map(|(forest, checksum)| ModelInfo {
            num_trees: forest.trees().len(),
            max_depth: forest.max_depth(),
            sha256: checksum.clone(),
            loaded_at: Utc::now(),
        });
        let classifier: Option<Box<dyn Classifier>> =
            forest.map(|(forest, _)| Box::new(XgbClassifier::new(forest)) as Box<dyn Classifier>);

        Self {
            schema,
            classifier,
            explainer,
            model_info,
        }
    }

    pub fn is_model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn is_schema_loaded(&self) -> bool {
        self.schema.is_some()
    }

    pub fn is_explainer_ready(&self) -> bool {
        self.explainer.is_some()
    }

    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.schema.as_ref()
    }

    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model_info.as_ref()
    }

    /// Prediction pipeline, if the model and schema are both available
    pub fn predictor(&self) -> Option<Predictor<'_>> {
        let schema = self.schema.as_ref()?;
        let classifier = self.classifier.as_deref()?;
        Some(Predictor::new(schema, classifier, self.explainer.as_deref()))
    }
}

fn load_schema(paths: &ArtifactPaths) -> Result<FeatureSchema, LoadError> {
    let schema = FeatureSchema::load(&paths.features, &paths.train_data)?;
    schema.require(&OBSERVED_FEATURES)?;
    Ok(schema)
}

fn load_forest(paths: &ArtifactPaths, schema: Option<&FeatureSchema>) -> Result<(Forest, String), LoadError> {
    let (forest, checksum) = Forest::load(&paths.model)?;
    if let Some(schema) = schema {
        check_layout(&forest, schema)?;
    }
    Ok((forest, checksum))
}

/// The model is positional: its feature order must be the schema order
pub fn check_layout(forest: &Forest, schema: &FeatureSchema) -> Result<(), LoadError> {
    if forest.n_features() > 0 && forest.n_features() != schema.len() {
        return Err(LoadError::InvalidModel(format!(
            "model expects {} features, schema has {}",
            forest.n_features(),
            schema.len()
        )));
    }

    let names = forest.feature_names();
    if names.is_empty() {
        return Ok(());
    }
    for position in 0..names.len().max(schema.len()) {
        let model = names.get(position).map(String::as_str).unwrap_or("<none>");
        let expected = schema.name_at(position).unwrap_or("<none>");
        if model != expected {
            return Err(LoadError::LayoutMismatch {
                position,
                model: model.to_string(),
                schema: expected.to_string(),
            });
        }
    }
    Ok(())
}

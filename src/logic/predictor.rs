//! Prediction pipeline: build vector -> classify -> attribute

use serde::Serialize;
use thiserror::Error;

use crate::logic::explain::{AttributionEngine, AttributionRanker, Explanation};
use crate::logic::features::{BuildError, FeatureSchema, FeatureVectorBuilder, FieldConditions};
use crate::logic::model::{Classifier, InferenceError, StressLevel};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Class probabilities as percentages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProbabilities {
    #[serde(rename = "Healthy")]
    pub healthy: f64,
    #[serde(rename = "Moderate Stress")]
    pub moderate_stress: f64,
    #[serde(rename = "Severe Stress")]
    pub severe_stress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub prediction: StressLevel,
    pub confidence: f64,
    pub probabilities: ClassProbabilities,
    pub explanation: Explanation,
}

/// Borrowed view over the loaded model; one per request
pub struct Predictor<'a> {
    schema: &'a FeatureSchema,
    ranker: AttributionRanker<'a>,
}

impl<'a> Predictor<'a> {
    pub fn new(
        schema: &'a FeatureSchema,
        classifier: &'a dyn Classifier,
        engine: Option<&'a dyn AttributionEngine>,
    ) -> Self {
        Self {
            schema,
            ranker: AttributionRanker::new(classifier, engine),
        }
    }

    pub fn predict(&self, conditions: &FieldConditions) -> Result<PredictionResult, PredictError> {
        let vector = FeatureVectorBuilder::new(self.schema).build(conditions)?;
        tracing::debug!(features = %vector.to_log_entry(), "Feature vector built");

        let classification = self.ranker.classify(&vector)?;
        let explanation = self.ranker.attribute(&vector, classification.class);

        tracing::info!(
            "Predicted {} ({:.2}%), {} attributions",
            classification.class,
            classification.confidence(),
            explanation.feature_importance.len()
        );

        Ok(PredictionResult {
            prediction: classification.class,
            confidence: classification.confidence(),
            probabilities: ClassProbabilities {
                healthy: classification.percent(StressLevel::Healthy),
                moderate_stress: classification.percent(StressLevel::ModerateStress),
                severe_stress: classification.percent(StressLevel::SevereStress),
            },
            explanation,
        })
    }
}

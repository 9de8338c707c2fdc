//! Inference Engine - stress classification
//!
//! `Classifier` is the seam to the trained model: one ordered feature vector
//! in, one probability per stress class out.

use std::sync::Arc;

use thiserror::Error;

use super::forest::{softmax, Forest};
use super::stress::StressLevel;
use crate::logic::round_dp;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("model returned {0} class probabilities, expected 3")]
    ClassCount(usize),

    #[error("model returned non-finite probabilities")]
    NonFinite,
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

pub trait Classifier: Send + Sync {
    /// Class probabilities, indexed like `StressLevel::ALL`
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError>;
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub class: StressLevel,
    pub probabilities: [f64; StressLevel::COUNT],
}

impl Classification {
    /// Pick the most probable class (first maximum wins)
    pub fn from_probabilities(probabilities: &[f64]) -> Result<Self, InferenceError> {
        let probabilities: [f64; StressLevel::COUNT] = probabilities
            .try_into()
            .map_err(|_| InferenceError::ClassCount(probabilities.len()))?;
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(InferenceError::NonFinite);
        }

        let mut best = 0;
        for (i, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = i;
            }
        }

        let class = StressLevel::from_index(best).ok_or(InferenceError::ClassCount(best))?;
        Ok(Self { class, probabilities })
    }

    /// Maximum class probability as a percentage, 2 decimals
    pub fn confidence(&self) -> f64 {
        round_dp(self.probabilities[self.class.index()] * 100.0, 2)
    }

    /// Probability of one class as a percentage, 2 decimals
    pub fn percent(&self, level: StressLevel) -> f64 {
        round_dp(self.probabilities[level.index()] * 100.0, 2)
    }
}

// ============================================================================
// XGBOOST IMPLEMENTATION
// ============================================================================

pub struct XgbClassifier {
    forest: Arc<Forest>,
}

impl XgbClassifier {
    pub fn new(forest: Arc<Forest>) -> Self {
        Self { forest }
    }

    pub fn forest(&self) -> &Arc<Forest> {
        &self.forest
    }
}

impl Classifier for XgbClassifier {
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let expected = self.forest.n_features();
        if expected > 0 && features.len() != expected {
            return Err(InferenceError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }
        Ok(softmax(&self.forest.predict_margin(features)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::testing::sample_forest;

    #[test]
    fn test_from_probabilities() {
        let c = Classification::from_probabilities(&[0.1, 0.25, 0.65]).unwrap();
        assert_eq!(c.class, StressLevel::SevereStress);
        assert_eq!(c.confidence(), 65.0);
        assert_eq!(c.percent(StressLevel::ModerateStress), 25.0);
    }

    #[test]
    fn test_first_maximum_wins() {
        let c = Classification::from_probabilities(&[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(c.class, StressLevel::Healthy);
    }

    #[test]
    fn test_wrong_class_count() {
        let result = Classification::from_probabilities(&[0.5, 0.5]);
        assert!(matches!(result, Err(InferenceError::ClassCount(2))));
    }

    #[test]
    fn test_non_finite() {
        let result = Classification::from_probabilities(&[f64::NAN, 0.5, 0.5]);
        assert!(matches!(result, Err(InferenceError::NonFinite)));
    }

    #[test]
    fn test_confidence_rounding() {
        let c = Classification::from_probabilities(&[0.123456, 0.654321, 0.222223]).unwrap();
        assert_eq!(c.confidence(), 65.43);
        assert_eq!(c.percent(StressLevel::Healthy), 12.35);
    }

    #[test]
    fn test_xgb_classifier_dimension_check() {
        let classifier = XgbClassifier::new(Arc::new(sample_forest()));
        let result = classifier.predict_proba(&[1.0, 2.0]);
        assert!(matches!(result, Err(InferenceError::DimensionMismatch { expected: 14, actual: 2 })));
    }

    #[test]
    fn test_xgb_classifier_probabilities_sum_to_one() {
        let classifier = XgbClassifier::new(Arc::new(sample_forest()));
        let proba = classifier.predict_proba(&[0.0; 14]).unwrap();
        assert_eq!(proba.len(), 3);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
}

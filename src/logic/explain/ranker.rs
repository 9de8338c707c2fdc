//! Attribution Ranker
//!
//! Classifies one feature vector and explains the predicted class. A failing
//! or missing attribution engine degrades to an empty explanation; the
//! classification itself is unaffected.

use super::tree_shap::{AttributionEngine, ExplainError};
use super::types::{AttributionRecord, Explanation};
use crate::logic::features::FeatureVector;
use crate::logic::model::{Classification, Classifier, InferenceError, StressLevel};

pub struct AttributionRanker<'a> {
    classifier: &'a dyn Classifier,
    engine: Option<&'a dyn AttributionEngine>,
}

impl<'a> AttributionRanker<'a> {
    pub fn new(classifier: &'a dyn Classifier, engine: Option<&'a dyn AttributionEngine>) -> Self {
        Self { classifier, engine }
    }

    pub fn classify(&self, vector: &FeatureVector<'_>) -> Result<Classification, InferenceError> {
        let probabilities = self.classifier.predict_proba(vector.values())?;
        Classification::from_probabilities(&probabilities)
    }

    /// Ranked attribution for `class`, or the reason there is none
    pub fn try_attribute(
        &self,
        vector: &FeatureVector<'_>,
        class: StressLevel,
    ) -> Result<Vec<AttributionRecord>, ExplainError> {
        let engine = self.engine.ok_or(ExplainError::Unavailable)?;
        let attributions = engine.explain(vector.values())?;
        let scores = attributions
            .for_class(class.index())
            .ok_or(ExplainError::MissingClass(class.index()))?;
        if scores.len() != vector.len() {
            return Err(ExplainError::DimensionMismatch {
                expected: vector.len(),
                actual: scores.len(),
            });
        }

        let mut records: Vec<AttributionRecord> = vector
            .iter()
            .zip(scores)
            .map(|((name, value), &score)| AttributionRecord::new(name, value, score))
            .collect();
        rank(&mut records);
        Ok(records)
    }

    /// Ranked explanation; empty when attribution is unavailable
    pub fn attribute(&self, vector: &FeatureVector<'_>, class: StressLevel) -> Explanation {
        match self.try_attribute(vector, class) {
            Ok(records) => Explanation::from_ranked(records),
            Err(e) => {
                tracing::warn!("Attribution unavailable, returning empty explanation: {}", e);
                Explanation::default()
            }
        }
    }
}

/// Sort by descending absolute score; equal scores keep their schema order
pub fn rank(records: &mut [AttributionRecord]) {
    records.sort_by(|a, b| b.shap_value.abs().total_cmp(&a.shap_value.abs()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::explain::Direction;
    use crate::logic::features::{FeatureVectorBuilder, FieldConditions};
    use crate::logic::testing::{
        sample_classifier, sample_conditions, sample_explainer, sample_schema, FailingEngine,
    };

    fn severe_vector<'a>(schema: &'a crate::logic::features::FeatureSchema) -> FeatureVector<'a> {
        FeatureVectorBuilder::new(schema).build(&sample_conditions()).unwrap()
    }

    #[test]
    fn test_rank_is_stable() {
        let mut records = vec![
            AttributionRecord::new("a", 0.0, 0.1),
            AttributionRecord::new("b", 0.0, -0.5),
            AttributionRecord::new("c", 0.0, 0.5),
            AttributionRecord::new("d", 0.0, 0.0),
        ];
        rank(&mut records);
        let order: Vec<_> = records.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_classify_severe_example() {
        let schema = sample_schema();
        let classifier = sample_classifier();
        let ranker = AttributionRanker::new(&classifier, None);

        let classification = ranker.classify(&severe_vector(&schema)).unwrap();
        assert_eq!(classification.class, StressLevel::SevereStress);
    }

    #[test]
    fn test_attribute_top_factor() {
        let schema = sample_schema();
        let classifier = sample_classifier();
        let explainer = sample_explainer();
        let ranker = AttributionRanker::new(&classifier, Some(&explainer));

        let explanation = ranker.attribute(&severe_vector(&schema), StressLevel::SevereStress);
        assert_eq!(explanation.feature_importance.len(), schema.len());
        assert_eq!(explanation.top_factors.len(), 3);

        let top = &explanation.top_factors[0];
        assert_eq!(top.feature, "Pest_Damage");
        assert_eq!(top.direction, Direction::Increases);
        assert_eq!(top.shap_value, 1.145);
        assert_eq!(top.feature_value, 60.0);

        let second = &explanation.top_factors[1];
        assert_eq!(second.feature, "T2M");
        assert_eq!(second.shap_value, 0.3);
    }

    #[test]
    fn test_attribute_without_engine_degrades() {
        let schema = sample_schema();
        let classifier = sample_classifier();
        let ranker = AttributionRanker::new(&classifier, None);

        let vector = severe_vector(&schema);
        assert!(matches!(
            ranker.try_attribute(&vector, StressLevel::SevereStress),
            Err(ExplainError::Unavailable)
        ));
        assert!(ranker.attribute(&vector, StressLevel::SevereStress).is_empty());
    }

    #[test]
    fn test_attribute_with_failing_engine_degrades() {
        let schema = sample_schema();
        let classifier = sample_classifier();
        let ranker = AttributionRanker::new(&classifier, Some(&FailingEngine));

        let explanation = ranker.attribute(&severe_vector(&schema), StressLevel::SevereStress);
        assert!(explanation.feature_importance.is_empty());
        assert!(explanation.top_factors.is_empty());
    }

    #[test]
    fn test_attribute_unknown_categories() {
        let schema = sample_schema();
        let classifier = sample_classifier();
        let explainer = sample_explainer();
        let ranker = AttributionRanker::new(&classifier, Some(&explainer));

        let conditions = FieldConditions {
            season: "Autumn".to_string(),
            crop_type: "Quinoa".to_string(),
            ..sample_conditions()
        };
        let vector = FeatureVectorBuilder::new(&schema).build(&conditions).unwrap();
        let explanation = ranker.attribute(&vector, ranker.classify(&vector).unwrap().class);
        assert_eq!(explanation.feature_importance.len(), schema.len());
    }
}

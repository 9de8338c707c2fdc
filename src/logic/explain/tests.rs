//! Property tests for classification and ranking

#[cfg(test)]
mod property_tests {
    use proptest::prelude::*;

    use crate::logic::features::FieldConditions;
    use crate::logic::predictor::Predictor;
    use crate::logic::testing::{sample_classifier, sample_explainer, sample_schema};

    fn conditions() -> impl Strategy<Value = FieldConditions> {
        (
            prop_oneof![Just("Summer"), Just("Winter"), Just("Monsoon"), Just("Autumn")],
            prop_oneof![Just("Rice"), Just("Wheat"), Just("Maize")],
            -50.0f64..=60.0,
            0.0f64..=500.0,
            0.0f64..=100.0,
            0.0f64..=100.0,
        )
            .prop_map(|(season, crop_type, temperature, rainfall, soil_moisture, pest_damage)| {
                FieldConditions {
                    season: season.to_string(),
                    crop_type: crop_type.to_string(),
                    temperature,
                    rainfall,
                    soil_moisture,
                    pest_damage,
                }
            })
    }

    proptest! {
        #[test]
        fn prop_probabilities_sum_to_hundred(c in conditions()) {
            let schema = sample_schema();
            let classifier = sample_classifier();
            let result = Predictor::new(&schema, &classifier, None).predict(&c).unwrap();

            let p = &result.probabilities;
            let max = p.healthy.max(p.moderate_stress).max(p.severe_stress);
            prop_assert!((p.healthy + p.moderate_stress + p.severe_stress - 100.0).abs() <= 0.02);
            prop_assert_eq!(result.confidence, max);
        }

        #[test]
        fn prop_ranking_is_non_increasing(c in conditions()) {
            let schema = sample_schema();
            let classifier = sample_classifier();
            let explainer = sample_explainer();
            let result = Predictor::new(&schema, &classifier, Some(&explainer)).predict(&c).unwrap();

            let ranked = &result.explanation.feature_importance;
            prop_assert_eq!(ranked.len(), schema.len());
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].shap_value.abs() >= pair[1].shap_value.abs());
            }
            prop_assert_eq!(&result.explanation.top_factors[..], &ranked[..3]);
        }
    }
}

//! Shared fixtures: a 14-feature schema and a three-class forest over it.
//!
//! Forest layout (base margin 0.5 per class):
//! - Healthy: Pest_Damage < 30 -> +1.0 (cover 70) | -1.0 (cover 30)
//! - Moderate: Soil_Moisture < 25 -> +0.8 (cover 30) | -0.3 (cover 70)
//! - Severe: Pest_Damage < 50 -> (T2M < 38 -> -1.0 (50) | 0.2 (15)) | 1.5 (35)

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::logic::context::{ArtifactPaths, ModelContext};
use crate::logic::explain::{AttributionEngine, Attributions, ExplainError, TreeShapExplainer};
use crate::logic::features::{FeatureSchema, FieldConditions};
use crate::logic::model::{Forest, Node, Tree, XgbClassifier};

const SAMPLE_FEATURES: [(&str, f64); 14] = [
    ("T2M", 28.0),
    ("temp_deviation_from_normal", 1.5),
    ("Rainfall", 120.0),
    ("Soil_Moisture", 45.0),
    ("Pest_Hotspots", 2.0),
    ("Pest_Damage", 15.0),
    ("Crop_Type_Rice", 0.5),
    ("Crop_Type_Wheat", 0.5),
    ("Season_Monsoon", 0.4),
    ("Season_Summer", 0.3),
    ("Season_Winter", 0.3),
    ("pest_damage_x_moisture", 675.0),
    ("pest_damage_x_temp_deviation", 22.5),
    ("pest_hotspots_x_rainfall", 240.0),
];

pub fn sample_schema() -> FeatureSchema {
    schema_without(&[])
}

pub fn schema_without(excluded: &[&str]) -> FeatureSchema {
    let kept: Vec<(&str, f64)> = SAMPLE_FEATURES
        .iter()
        .copied()
        .filter(|(name, _)| !excluded.contains(name))
        .collect();
    let names = kept.iter().map(|(name, _)| name.to_string()).collect();
    let baseline: HashMap<String, f64> = kept.iter().map(|(name, mean)| (name.to_string(), *mean)).collect();
    FeatureSchema::new(names, &baseline).unwrap()
}

/// The severe-stress example: hot, dry, heavily damaged rice in summer
pub fn sample_conditions() -> FieldConditions {
    FieldConditions {
        season: "Summer".to_string(),
        crop_type: "Rice".to_string(),
        temperature: 42.0,
        rainfall: 5.0,
        soil_moisture: 18.0,
        pest_damage: 60.0,
    }
}

/// Observations equal to the training means
pub fn baseline_conditions(schema: &FeatureSchema) -> FieldConditions {
    let mean = |name: &str| schema.baseline_value(name).unwrap();
    FieldConditions {
        season: "Summer".to_string(),
        crop_type: "Rice".to_string(),
        temperature: mean("T2M"),
        rainfall: mean("Rainfall"),
        soil_moisture: mean("Soil_Moisture"),
        pest_damage: mean("Pest_Damage"),
    }
}

/// Raw 14-feature vector matching the trees' split features of the severe example
pub fn severe_features() -> Vec<f64> {
    let mut features = vec![0.0; SAMPLE_FEATURES.len()];
    features[0] = 42.0;
    features[3] = 18.0;
    features[5] = 60.0;
    features
}

pub fn sample_forest() -> Forest {
    let healthy = Tree::new(vec![
        Node::split(5, 30.0, 1, 2, true, 100.0),
        Node::leaf(1.0, 70.0),
        Node::leaf(-1.0, 30.0),
    ])
    .unwrap();
    let moderate = Tree::new(vec![
        Node::split(3, 25.0, 1, 2, true, 100.0),
        Node::leaf(0.8, 30.0),
        Node::leaf(-0.3, 70.0),
    ])
    .unwrap();
    let severe = Tree::new(vec![
        Node::split(5, 50.0, 1, 2, true, 100.0),
        Node::split(0, 38.0, 3, 4, true, 65.0),
        Node::leaf(1.5, 35.0),
        Node::leaf(-1.0, 50.0),
        Node::leaf(0.2, 15.0),
    ])
    .unwrap();

    let names = SAMPLE_FEATURES.iter().map(|(name, _)| name.to_string()).collect();
    Forest::new(vec![healthy, moderate, severe], vec![0, 1, 2], vec![0.5; 3], SAMPLE_FEATURES.len())
        .unwrap()
        .with_feature_names(names)
}

pub fn sample_classifier() -> XgbClassifier {
    XgbClassifier::new(Arc::new(sample_forest()))
}

pub fn sample_explainer() -> TreeShapExplainer {
    TreeShapExplainer::new(Arc::new(sample_forest())).unwrap()
}

/// Fully loaded context over the sample forest
pub fn sample_context() -> ModelContext {
    ModelContext::new(
        Some(sample_schema()),
        Some(Box::new(sample_classifier())),
        Some(Box::new(sample_explainer())),
    )
}

/// Attribution engine that always fails
pub struct FailingEngine;

impl AttributionEngine for FailingEngine {
    fn explain(&self, _features: &[f64]) -> Result<Attributions, ExplainError> {
        Err(ExplainError::Unavailable)
    }
}

/// Minimal two-feature model in XGBoost's JSON layout
pub const SAMPLE_MODEL_JSON: &str = r#"{
  "learner": {
    "attributes": {},
    "feature_names": ["x0", "x1"],
    "feature_types": ["float", "float"],
    "gradient_booster": {
      "name": "gbtree",
      "model": {
        "gbtree_model_param": {"num_parallel_tree": "1", "num_trees": "3"},
        "tree_info": [0, 1, 2],
        "trees": [
          {
            "id": 0,
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [0, 0, 0],
            "split_conditions": [0.5, 0.4, -0.2],
            "default_left": [1, 0, 0],
            "sum_hessian": [10.0, 6.0, 4.0],
            "split_type": [0, 0, 0]
          },
          {
            "id": 1,
            "left_children": [1, -1, -1],
            "right_children": [2, -1, -1],
            "split_indices": [1, 0, 0],
            "split_conditions": [2.0, -0.1, 0.3],
            "default_left": [0, 0, 0],
            "sum_hessian": [10.0, 5.0, 5.0],
            "split_type": [0, 0, 0]
          },
          {
            "id": 2,
            "left_children": [-1],
            "right_children": [-1],
            "split_indices": [0],
            "split_conditions": [0.05],
            "default_left": [0],
            "sum_hessian": [10.0],
            "split_type": [0]
          }
        ]
      }
    },
    "learner_model_param": {"base_score": "5E-1", "num_class": "3", "num_feature": "2", "num_target": "1"},
    "objective": {"name": "multi:softprob", "softmax_multiclass_param": {"num_class": "3"}}
  },
  "version": [2, 0, 3]
}"#;

/// Write model, feature list and training data matching the sample schema
pub fn write_artifacts(dir: &tempfile::TempDir) -> ArtifactPaths {
    let root = dir.path();
    let names: Vec<&str> = SAMPLE_FEATURES.iter().map(|(name, _)| *name).collect();

    let model = json!({
        "learner": {
            "feature_names": names,
            "gradient_booster": {
                "name": "gbtree",
                "model": {
                    "tree_info": [0, 1, 2],
                    "trees": [
                        {
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [5, 0, 0],
                            "split_conditions": [30.0, 1.0, -1.0],
                            "default_left": [1, 0, 0],
                            "sum_hessian": [100.0, 70.0, 30.0]
                        },
                        {
                            "left_children": [1, -1, -1],
                            "right_children": [2, -1, -1],
                            "split_indices": [3, 0, 0],
                            "split_conditions": [25.0, 0.8, -0.3],
                            "default_left": [1, 0, 0],
                            "sum_hessian": [100.0, 30.0, 70.0]
                        },
                        {
                            "left_children": [1, 3, -1, -1, -1],
                            "right_children": [2, 4, -1, -1, -1],
                            "split_indices": [5, 0, 0, 0, 0],
                            "split_conditions": [50.0, 38.0, 1.5, -1.0, 0.2],
                            "default_left": [1, 1, 0, 0, 0],
                            "sum_hessian": [100.0, 65.0, 35.0, 50.0, 15.0]
                        }
                    ]
                }
            },
            "learner_model_param": {"base_score": "5E-1", "num_class": "3", "num_feature": "14"},
            "objective": {"name": "multi:softprob"}
        },
        "version": [2, 0, 3]
    });

    let paths = ArtifactPaths {
        model: root.join("crop_stress_model.json"),
        train_data: root.join("X_train.csv"),
        features: root.join("feature_columns.json"),
    };
    write(&paths.model, &model.to_string());
    write(&paths.features, &json!(names).to_string());

    let header = names.join(",");
    let row: Vec<String> = SAMPLE_FEATURES.iter().map(|(_, mean)| mean.to_string()).collect();
    write(&paths.train_data, &format!("{}\n{}\n", header, row.join(",")));

    paths
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

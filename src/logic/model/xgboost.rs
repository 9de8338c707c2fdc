//! XGBoost JSON model document.
//!
//! Only the parts needed to rebuild a gbtree classifier are parsed; unknown
//! fields are ignored. XGBoost writes most scalars as strings ("3", "5E-1",
//! "[5E-1]"), hence the lenient deserializers.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

// =============================================================================
// Custom deserializers for XGBoost-specific formats
// =============================================================================

fn deserialize_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| SerdeError::custom("count must be a non-negative integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| SerdeError::custom(format!("cannot parse count from string: {}", s))),
        _ => Err(SerdeError::custom("count must be number or string")),
    }
}

/// `0.5`, `"5E-1"`, `"[5E-1,5E-1,5E-1]"` or `[0.5]`
fn deserialize_scores<'de, D>(deserializer: D) -> Result<Vec<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    fn parse_list(s: &str) -> Option<Vec<f32>> {
        let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
        inner
            .split(',')
            .map(|part| part.trim().parse::<f32>().ok())
            .collect()
    }

    let scores = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().map(|f| vec![f as f32]),
        Value::String(s) => parse_list(&s),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n.as_f64().map(|f| f as f32),
                Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .collect(),
        _ => None,
    };

    match scores {
        Some(scores) if !scores.is_empty() => Ok(scores),
        _ => Err(SerdeError::custom("base_score must be number, string, or array")),
    }
}

/// Array of `0`/`1` or booleans
fn deserialize_flags<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as SerdeError;

    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| match value {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => n
                .as_i64()
                .map(|i| i != 0)
                .ok_or_else(|| SerdeError::custom("invalid number for flag")),
            other => Err(SerdeError::custom(format!("unsupported flag value: {}", other))),
        })
        .collect()
}

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct XgbModelDocument {
    pub learner: Learner,
    #[serde(default)]
    pub version: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Learner {
    #[serde(default)]
    pub feature_names: Vec<String>,
    pub gradient_booster: GradientBooster,
    pub learner_model_param: LearnerModelParam,
    pub objective: Objective,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LearnerModelParam {
    #[serde(deserialize_with = "deserialize_scores")]
    pub base_score: Vec<f32>,
    #[serde(deserialize_with = "deserialize_count")]
    pub num_class: usize,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub num_feature: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Objective {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum GradientBooster {
    Gbtree { model: TreeModel },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreeModel {
    pub trees: Vec<XgbTree>,
    pub tree_info: Vec<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XgbTree {
    pub left_children: Vec<i32>,
    pub right_children: Vec<i32>,
    pub split_indices: Vec<i64>,
    /// Threshold for splits, leaf value for leaves
    pub split_conditions: Vec<f32>,
    #[serde(deserialize_with = "deserialize_flags")]
    pub default_left: Vec<bool>,
    /// Node covers; required for TreeSHAP
    #[serde(default)]
    pub sum_hessian: Vec<f64>,
    #[serde(default)]
    pub split_type: Vec<i32>,
}

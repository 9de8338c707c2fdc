//! Feature Vector - Core data structure for ML input
//!
//! One fully-populated vector per request, always in schema order.
//! Name-based access is checked against the schema: unknown names are an
//! error, never silently padded.

use serde_json::json;
use thiserror::Error;

use super::schema::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
}

/// Feature values bound to the schema that defines their order
#[derive(Debug, Clone)]
pub struct FeatureVector<'a> {
    schema: &'a FeatureSchema,
    values: Vec<f64>,
}

impl<'a> FeatureVector<'a> {
    /// Start from a fresh copy of the schema baseline
    pub fn from_baseline(schema: &'a FeatureSchema) -> Self {
        Self {
            schema,
            values: schema.baseline(),
        }
    }

    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    /// Values in schema order (what the classifier consumes)
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.index_of(name).map(|i| self.values[i])
    }

    pub fn set(&mut self, name: &str, value: f64) -> Result<(), BuildError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| BuildError::UnknownFeature(name.to_string()))?;
        self.values[index] = value;
        Ok(())
    }

    /// Set by position; positions come from the same schema
    pub(crate) fn set_at(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    /// Zero every flag of a categorical group
    pub fn clear_group(&mut self, prefix: &str) {
        for (index, _) in self.schema.group(prefix) {
            self.values[index] = 0.0;
        }
    }

    /// `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        let schema = self.schema;
        schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Bit pattern of the values, for exact comparisons
    pub fn to_bits(&self) -> Vec<u64> {
        self.values.iter().map(|v| v.to_bits()).collect()
    }

    /// Convert to JSON for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        json!({
            "layout_hash": self.schema.layout_hash(),
            "named_values": self.iter()
                .map(|(name, value)| (name.to_string(), json!(value)))
                .collect::<serde_json::Map<_, _>>(),
        })
    }
}

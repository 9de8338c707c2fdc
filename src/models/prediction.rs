//! Prediction request / response

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::logic::features::FieldConditions;
use crate::logic::PredictionResult;

/// Range-checked fields, in the order violations are reported
const VALIDATED_FIELDS: [&str; 4] = ["temperature", "rainfall", "soil_moisture", "pest_damage"];

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictionRequest {
    pub season: String,
    pub crop_type: String,

    #[validate(range(min = -50.0, max = 60.0, message = "Temperature must be between -50 and 60°C"))]
    pub temperature: f64,

    #[validate(range(min = 0.0, max = 500.0, message = "Rainfall must be between 0 and 500mm"))]
    pub rainfall: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Soil Moisture must be between 0 and 100%"))]
    pub soil_moisture: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "Pest Damage must be between 0 and 100%"))]
    pub pest_damage: f64,
}

impl PredictionRequest {
    /// Every violated rule, joined with `" | "`
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| validation_message(&errors))
    }

    pub fn conditions(&self) -> FieldConditions {
        FieldConditions {
            season: self.season.clone(),
            crop_type: self.crop_type.clone(),
            temperature: self.temperature,
            rainfall: self.rainfall,
            soil_moisture: self.soil_moisture,
            pest_damage: self.pest_damage,
        }
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    VALIDATED_FIELDS
        .iter()
        .filter_map(|field| field_errors.get(*field))
        .flat_map(|errors| errors.iter())
        .map(|error| {
            error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| error.code.to_string())
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self { success: true, result }
    }
}

//! Feature Vector Builder
//!
//! Maps field observations onto the full model layout:
//! 1. fresh copy of the baseline
//! 2. clear the season / crop type one-hot groups
//! 3. set the flag matching the request (exact column, then suffix match)
//! 4. overwrite the observed numeric features
//! 5. recompute interaction features from the final values

use super::schema::FeatureSchema;
use super::vector::{BuildError, FeatureVector};

// ============================================================================
// FEATURE NAMES
// ============================================================================

pub const SEASON_PREFIX: &str = "Season_";
pub const CROP_TYPE_PREFIX: &str = "Crop_Type_";

/// One-hot groups reset on every request
pub const CATEGORICAL_GROUPS: [&str; 2] = [SEASON_PREFIX, CROP_TYPE_PREFIX];

pub const TEMPERATURE: &str = "T2M";
pub const RAINFALL: &str = "Rainfall";
pub const SOIL_MOISTURE: &str = "Soil_Moisture";
pub const PEST_DAMAGE: &str = "Pest_Damage";

/// Features supplied directly by the user; the schema must contain all of them
pub const OBSERVED_FEATURES: [&str; 4] = [TEMPERATURE, RAINFALL, SOIL_MOISTURE, PEST_DAMAGE];

/// Interaction feature `name = left * right`
#[derive(Debug, Clone, Copy)]
pub struct DerivedFeature {
    pub name: &'static str,
    pub left: &'static str,
    pub right: &'static str,
}

pub const DERIVED_FEATURES: &[DerivedFeature] = &[
    DerivedFeature {
        name: "pest_damage_x_moisture",
        left: PEST_DAMAGE,
        right: SOIL_MOISTURE,
    },
    DerivedFeature {
        name: "pest_damage_x_temp_deviation",
        left: PEST_DAMAGE,
        right: "temp_deviation_from_normal",
    },
    DerivedFeature {
        name: "pest_hotspots_x_rainfall",
        left: "Pest_Hotspots",
        right: RAINFALL,
    },
];

// ============================================================================
// INPUT
// ============================================================================

/// Range-checked observations for one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConditions {
    pub season: String,
    pub crop_type: String,
    pub temperature: f64,
    pub rainfall: f64,
    pub soil_moisture: f64,
    pub pest_damage: f64,
}

// ============================================================================
// BUILDER
// ============================================================================

pub struct FeatureVectorBuilder<'a> {
    schema: &'a FeatureSchema,
}

impl<'a> FeatureVectorBuilder<'a> {
    pub fn new(schema: &'a FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn build(&self, conditions: &FieldConditions) -> Result<FeatureVector<'a>, BuildError> {
        let mut vector = FeatureVector::from_baseline(self.schema);

        for prefix in CATEGORICAL_GROUPS {
            vector.clear_group(prefix);
        }

        // Unknown categories leave the whole group at 0
        if let Some(index) = self.resolve_category(SEASON_PREFIX, &conditions.season) {
            vector.set_at(index, 1.0);
        }
        if let Some(index) = self.resolve_category(CROP_TYPE_PREFIX, &conditions.crop_type) {
            vector.set_at(index, 1.0);
        }

        vector.set(TEMPERATURE, conditions.temperature)?;
        vector.set(RAINFALL, conditions.rainfall)?;
        vector.set(SOIL_MOISTURE, conditions.soil_moisture)?;
        vector.set(PEST_DAMAGE, conditions.pest_damage)?;

        for derived in DERIVED_FEATURES {
            if !self.schema.contains(derived.name) {
                continue;
            }
            let left = vector.get(derived.left).unwrap_or(0.0);
            let right = vector.get(derived.right).unwrap_or(0.0);
            vector.set(derived.name, left * right)?;
        }

        Ok(vector)
    }

    /// Column position for a categorical value.
    ///
    /// Exact `<prefix><value>` column first, otherwise the first column of the
    /// group (schema order) whose full name ends with `value`, ignoring case.
    /// The value is used as given: an empty value matches the first column
    /// of the group, surrounding whitespace is never stripped.
    pub fn resolve_category(&self, prefix: &str, value: &str) -> Option<usize> {
        if let Some(index) = self.schema.index_of(&format!("{}{}", prefix, value)) {
            return Some(index);
        }

        let needle = value.to_lowercase();
        let found = self
            .schema
            .group(prefix)
            .find(|(_, name)| name.to_lowercase().ends_with(&needle))
            .map(|(index, _)| index);

        if found.is_none() {
            tracing::debug!("No '{}' column matches '{}'", prefix, value);
        }
        found
    }
}

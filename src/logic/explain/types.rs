use serde::Serialize;

use super::labels::friendly_label;
use crate::logic::round_dp;

/// Number of records surfaced as top factors
pub const TOP_FACTORS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increases,
    Decreases,
}

impl Direction {
    /// Positive scores push toward the predicted class; zero counts as decreasing
    pub fn from_score(score: f64) -> Self {
        if score > 0.0 {
            Direction::Increases
        } else {
            Direction::Decreases
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Direction::Increases => "increased",
            Direction::Decreases => "decreased",
        }
    }
}

/// One feature's contribution to the predicted class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributionRecord {
    pub feature: String,
    pub friendly_name: String,
    pub shap_value: f64,
    pub feature_value: f64,
    pub direction: Direction,
    pub farmer_friendly: String,
}

impl AttributionRecord {
    pub fn new(feature: &str, feature_value: f64, score: f64) -> Self {
        let friendly_name = friendly_label(feature).to_string();
        let direction = Direction::from_score(score);
        let farmer_friendly = format!(
            "{} {} stress risk by {:.2}%",
            friendly_name,
            direction.past_tense(),
            score.abs() * 100.0
        );

        Self {
            feature: feature.to_string(),
            friendly_name,
            shap_value: round_dp(score, 4),
            feature_value: round_dp(feature_value, 2),
            direction,
            farmer_friendly,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Explanation {
    pub feature_importance: Vec<AttributionRecord>,
    pub top_factors: Vec<AttributionRecord>,
}

impl Explanation {
    /// Wrap an already ranked list
    pub fn from_ranked(records: Vec<AttributionRecord>) -> Self {
        let top_factors = records.iter().take(TOP_FACTORS).cloned().collect();
        Self {
            feature_importance: records,
            top_factors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.feature_importance.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_positive() {
        let record = AttributionRecord::new("Pest_Damage", 60.004, 0.123456);
        assert_eq!(record.friendly_name, "🐛 Pest Damage (%)");
        assert_eq!(record.shap_value, 0.1235);
        assert_eq!(record.feature_value, 60.0);
        assert_eq!(record.direction, Direction::Increases);
        assert_eq!(record.farmer_friendly, "🐛 Pest Damage (%) increased stress risk by 12.35%");
    }

    #[test]
    fn test_record_zero_and_negative() {
        assert_eq!(AttributionRecord::new("x", 1.0, 0.0).direction, Direction::Decreases);

        let record = AttributionRecord::new("Unlisted", 1.0, -0.5);
        assert_eq!(record.direction, Direction::Decreases);
        assert_eq!(record.friendly_name, "Unlisted");
        assert_eq!(record.farmer_friendly, "Unlisted decreased stress risk by 50.00%");
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Increases).unwrap(), "\"increases\"");
    }

    #[test]
    fn test_top_factors_truncation() {
        let records: Vec<_> = (0..5).map(|i| AttributionRecord::new("x", 0.0, 1.0 - i as f64 * 0.1)).collect();
        let explanation = Explanation::from_ranked(records.clone());
        assert_eq!(explanation.top_factors, records[..3].to_vec());

        let explanation = Explanation::from_ranked(records[..2].to_vec());
        assert_eq!(explanation.top_factors.len(), 2);

        let explanation = Explanation::from_ranked(Vec::new());
        assert!(explanation.is_empty());
        assert!(explanation.top_factors.is_empty());
    }
}

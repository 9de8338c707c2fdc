//! Logic Module - Prediction Core
//!
//! Schema registry, feature vector reconstruction, tree-ensemble inference
//! and attribution ranking. Nothing here knows about HTTP.

pub mod context;
pub mod error;
pub mod explain;
pub mod features;
pub mod model;
pub mod predictor;

#[cfg(test)]
pub(crate) mod testing;

// Re-export common types
pub use context::{ArtifactPaths, ModelContext};
pub use error::LoadError;
pub use predictor::{PredictError, PredictionResult, Predictor};

/// Round to a fixed number of decimal places, from the exact decimal
/// expansion of `value` rather than a scaled product
pub fn round_dp(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(12.34567, 2), 12.35);
        assert_eq!(round_dp(-0.123456, 4), -0.1235);
        assert_eq!(round_dp(3.0, 2), 3.0);
    }

    #[test]
    fn test_round_dp_uses_stored_value() {
        // 2.675 is stored as 2.67499999..., scaling by 100 would give 267.5
        assert_eq!(round_dp(2.675, 2), 2.67);
        assert_eq!(round_dp(0.0075, 3), 0.007);
        assert_eq!(round_dp(-2.675, 2), -2.67);
        assert!(round_dp(f64::NAN, 2).is_nan());
    }
}

//! Explain Module - per-prediction feature attribution
//!
//! TreeSHAP produces signed contributions; the ranker turns them into a
//! sorted, farmer-readable factor list for the predicted class.

pub mod labels;
pub mod ranker;
pub mod tree_shap;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export common types
pub use ranker::AttributionRanker;
pub use tree_shap::{AttributionEngine, Attributions, ExplainError, TreeShapExplainer};
pub use types::{AttributionRecord, Direction, Explanation};

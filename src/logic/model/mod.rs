//! Model Module - Tree Ensemble Inference
//!
//! Loads the XGBoost JSON model and runs it behind the `Classifier` trait,
//! so the rest of the pipeline never touches trees directly.

pub mod forest;
pub mod inference;
pub mod stress;
pub mod xgboost;

// Re-export common types
pub use forest::{Forest, Node, Tree};
pub use inference::{Classification, Classifier, InferenceError, XgbClassifier};
pub use stress::StressLevel;

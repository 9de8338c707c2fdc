//! Features Module - Schema & Feature Vector Reconstruction
//!
//! Turns a handful of field observations into the complete, ordered
//! feature vector the trained model expects.

pub mod builder;
pub mod schema;
pub mod vector;


// Re-export common types
pub use builder::{FeatureVectorBuilder, FieldConditions};
pub use schema::FeatureSchema;
pub use vector::{BuildError, FeatureVector};

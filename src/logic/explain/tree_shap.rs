//! TreeSHAP explainer for the tree ensemble.
//!
//! Exact path-dependent TreeSHAP (Lundberg et al., "Consistent Individualized
//! Feature Attribution for Tree Ensembles", Algorithm 2). Contributions are in
//! margin space: for every class, the contributions plus the class expected
//! value add up to that class's raw score.

use std::sync::Arc;

use thiserror::Error;

use crate::logic::model::{Forest, Tree};

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("TreeSHAP needs node cover statistics, the model has none")]
    MissingCovers,

    #[error("explainer expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("no attributions for class {0}")]
    MissingClass(usize),

    #[error("attribution engine unavailable")]
    Unavailable,
}

/// Per-class contributions (`values[class][feature]`) and expected values
#[derive(Debug, Clone, PartialEq)]
pub struct Attributions {
    pub values: Vec<Vec<f64>>,
    pub expected_values: Vec<f64>,
}

impl Attributions {
    pub fn for_class(&self, class: usize) -> Option<&[f64]> {
        self.values.get(class).map(Vec::as_slice)
    }
}

pub trait AttributionEngine: Send + Sync {
    fn explain(&self, features: &[f64]) -> Result<Attributions, ExplainError>;
}

// ============================================================================
// PATH STATE
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// `None` for the root sentinel
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    weight: f64,
}

/// Grow the path by one split; `path.len()` before the push is the unique depth
fn extend_path(path: &mut Vec<PathElement>, zero_fraction: f64, one_fraction: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one_fraction * path[i].weight * (i + 1) as f64 / denom;
        path[i].weight = zero_fraction * path[i].weight * (depth - i) as f64 / denom;
    }
}

/// Undo the extension made for `path[index]`
fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            next_one_portion = tmp - path[i].weight * zero_fraction * (depth - i) as f64 / denom;
        } else {
            path[i].weight = path[i].weight * denom / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total path weight if `path[index]` were unwound, without mutating
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one_fraction = path[index].one_fraction;
    let zero_fraction = path[index].zero_fraction;
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].weight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion = path[i].weight - tmp * zero_fraction * ((depth - i) as f64 / denom);
        } else if zero_fraction != 0.0 {
            total += (path[i].weight / zero_fraction) / ((depth - i) as f64 / denom);
        }
    }
    total
}

// ============================================================================
// EXPLAINER
// ============================================================================

pub struct TreeShapExplainer {
    forest: Arc<Forest>,
    expected_values: Vec<f64>,
}

impl TreeShapExplainer {
    pub fn new(forest: Arc<Forest>) -> Result<Self, ExplainError> {
        if !forest.has_covers() {
            return Err(ExplainError::MissingCovers);
        }

        let mut expected_values: Vec<f64> = (0..forest.n_groups()).map(|g| forest.base_margin(g)).collect();
        for (i, tree) in forest.trees().iter().enumerate() {
            expected_values[forest.tree_group(i)] += tree.expected_value();
        }

        Ok(Self { forest, expected_values })
    }

    pub fn expected_value(&self, class: usize) -> Option<f64> {
        self.expected_values.get(class).copied()
    }

    #[allow(clippy::too_many_arguments)]
    fn tree_shap(
        &self,
        tree: &Tree,
        node: usize,
        features: &[f64],
        phi: &mut [f64],
        parent: &[PathElement],
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) {
        let mut path = parent.to_vec();
        extend_path(&mut path, zero_fraction, one_fraction, feature);

        let current = tree.node(node);
        if current.is_leaf() {
            let leaf_value = current.leaf_value() as f64;
            for i in 1..path.len() {
                let element = path[i];
                let Some(f) = element.feature else { continue };
                if f < phi.len() {
                    let weight = unwound_path_sum(&path, i);
                    phi[f] += weight * (element.one_fraction - element.zero_fraction) * leaf_value;
                }
            }
            return;
        }

        let split = current.feature();
        let (hot, cold) = tree.route(node, features);
        let cover = current.cover();
        let (hot_zero, cold_zero) = if cover > 0.0 {
            (tree.node(hot).cover() / cover, tree.node(cold).cover() / cover)
        } else {
            (0.0, 0.0)
        };

        // A feature already on the path is merged instead of counted twice
        let mut incoming_zero = 1.0;
        let mut incoming_one = 1.0;
        if let Some(k) = path.iter().position(|e| e.feature == Some(split)) {
            incoming_zero = path[k].zero_fraction;
            incoming_one = path[k].one_fraction;
            unwind_path(&mut path, k);
        }

        self.tree_shap(tree, hot, features, phi, &path, hot_zero * incoming_zero, incoming_one, Some(split));
        self.tree_shap(tree, cold, features, phi, &path, cold_zero * incoming_zero, 0.0, Some(split));
    }
}

impl AttributionEngine for TreeShapExplainer {
    fn explain(&self, features: &[f64]) -> Result<Attributions, ExplainError> {
        let expected = self.forest.n_features();
        if expected > 0 && features.len() != expected {
            return Err(ExplainError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }

        let mut values = vec![vec![0.0; features.len()]; self.forest.n_groups()];
        for (i, tree) in self.forest.trees().iter().enumerate() {
            let phi = &mut values[self.forest.tree_group(i)];
            self.tree_shap(tree, 0, features, phi, &[], 1.0, 1.0, None);
        }

        Ok(Attributions {
            values,
            expected_values: self.expected_values.clone(),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

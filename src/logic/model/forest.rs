//! Tree ensemble built from the XGBoost document.
//!
//! Trees are validated once at load so traversal never has to check bounds
//! or guard against cycles: every child index points strictly forward.

use std::path::Path;

use sha2::{Digest, Sha256};

use super::stress::StressLevel;
use super::xgboost::{GradientBooster, XgbModelDocument, XgbTree};
use crate::logic::error::LoadError;

const NO_CHILD: u32 = u32::MAX;

// ============================================================================
// NODE / TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    left: u32,
    right: u32,
    feature: u32,
    /// Split threshold, or leaf value for leaves
    value: f32,
    default_left: bool,
    cover: f64,
}

impl Node {
    pub fn split(feature: u32, threshold: f32, left: u32, right: u32, default_left: bool, cover: f64) -> Self {
        Self { left, right, feature, value: threshold, default_left, cover }
    }

    pub fn leaf(value: f32, cover: f64) -> Self {
        Self {
            left: NO_CHILD,
            right: NO_CHILD,
            feature: 0,
            value,
            default_left: false,
            cover,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left == NO_CHILD
    }

    pub fn feature(&self) -> usize {
        self.feature as usize
    }

    pub fn leaf_value(&self) -> f32 {
        self.value
    }

    pub fn cover(&self) -> f64 {
        self.cover
    }
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Validate node links; node 0 is the root
    pub fn new(nodes: Vec<Node>) -> Result<Self, LoadError> {
        if nodes.is_empty() {
            return Err(LoadError::InvalidModel("tree has no nodes".to_string()));
        }
        for (i, node) in nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.right != NO_CHILD {
                    return Err(LoadError::InvalidModel(format!("node {} has only one child", i)));
                }
                continue;
            }
            for child in [node.left, node.right] {
                let child = child as usize;
                if child <= i || child >= nodes.len() {
                    return Err(LoadError::InvalidModel(format!(
                        "node {} points to invalid child {}",
                        i, child
                    )));
                }
            }
        }
        Ok(Self { nodes })
    }

    fn from_xgboost(tree: &XgbTree) -> Result<Self, LoadError> {
        let n = tree.left_children.len();
        let lengths = [
            tree.right_children.len(),
            tree.split_indices.len(),
            tree.split_conditions.len(),
            tree.default_left.len(),
        ];
        if lengths.iter().any(|&len| len != n) {
            return Err(LoadError::InvalidModel("tree arrays have inconsistent lengths".to_string()));
        }
        if !tree.sum_hessian.is_empty() && tree.sum_hessian.len() != n {
            return Err(LoadError::InvalidModel("tree covers have inconsistent length".to_string()));
        }
        if tree.split_type.iter().any(|&t| t != 0) {
            return Err(LoadError::InvalidModel("categorical splits are not supported".to_string()));
        }

        let child = |index: i32| if index < 0 { Ok(NO_CHILD) } else { u32::try_from(index) };
        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let cover = tree.sum_hessian.get(i).copied().unwrap_or(0.0);
            let left = child(tree.left_children[i]);
            let right = child(tree.right_children[i]);
            let node = match (left, right) {
                (Ok(NO_CHILD), Ok(NO_CHILD)) => Node::leaf(tree.split_conditions[i], cover),
                (Ok(left), Ok(right)) => {
                    let feature = u32::try_from(tree.split_indices[i]).map_err(|_| {
                        LoadError::InvalidModel(format!("node {} has invalid split index", i))
                    })?;
                    Node::split(feature, tree.split_conditions[i], left, right, tree.default_left[i], cover)
                }
                _ => return Err(LoadError::InvalidModel(format!("node {} has invalid children", i))),
            };
            nodes.push(node);
        }
        Self::new(nodes)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn has_covers(&self) -> bool {
        self.nodes[0].cover > 0.0
    }

    /// Children of a split as `(taken, not_taken)` for this sample.
    ///
    /// `value < threshold` goes left; NaN or out-of-range features follow
    /// `default_left`.
    pub fn route(&self, index: usize, features: &[f64]) -> (usize, usize) {
        let node = &self.nodes[index];
        let value = features.get(node.feature()).copied().unwrap_or(f64::NAN);
        let go_left = if value.is_nan() {
            node.default_left
        } else {
            (value as f32) < node.value
        };
        if go_left {
            (node.left as usize, node.right as usize)
        } else {
            (node.right as usize, node.left as usize)
        }
    }

    pub fn predict(&self, features: &[f64]) -> f32 {
        let mut index = 0;
        while !self.nodes[index].is_leaf() {
            index = self.route(index, features).0;
        }
        self.nodes[index].value
    }

    /// Cover-weighted mean leaf value
    pub fn expected_value(&self) -> f64 {
        self.node_mean(0)
    }

    fn node_mean(&self, index: usize) -> f64 {
        let node = &self.nodes[index];
        if node.is_leaf() {
            return node.value as f64;
        }
        let left = &self.nodes[node.left as usize];
        let right = &self.nodes[node.right as usize];
        let total = left.cover + right.cover;
        if total <= 0.0 {
            return 0.5 * (self.node_mean(node.left as usize) + self.node_mean(node.right as usize));
        }
        (self.node_mean(node.left as usize) * left.cover + self.node_mean(node.right as usize) * right.cover)
            / total
    }

    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        let node = &self.nodes[index];
        if node.is_leaf() {
            1
        } else {
            1 + self.depth_from(node.left as usize).max(self.depth_from(node.right as usize))
        }
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Multi-class gbtree ensemble (one output group per stress class)
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<usize>,
    base_margin: Vec<f64>,
    n_features: usize,
    feature_names: Vec<String>,
}

impl Forest {
    pub fn new(
        trees: Vec<Tree>,
        tree_groups: Vec<usize>,
        base_margin: Vec<f64>,
        n_features: usize,
    ) -> Result<Self, LoadError> {
        if trees.len() != tree_groups.len() {
            return Err(LoadError::InvalidModel(format!(
                "{} trees but {} tree groups",
                trees.len(),
                tree_groups.len()
            )));
        }
        if base_margin.len() != StressLevel::COUNT {
            return Err(LoadError::InvalidModel(format!(
                "expected {} base margins, got {}",
                StressLevel::COUNT,
                base_margin.len()
            )));
        }
        if let Some(group) = tree_groups.iter().find(|&&g| g >= StressLevel::COUNT) {
            return Err(LoadError::InvalidModel(format!("tree group {} out of range", group)));
        }
        if n_features > 0 {
            let out_of_range = trees
                .iter()
                .flat_map(|t| t.nodes())
                .any(|n| !n.is_leaf() && n.feature() >= n_features);
            if out_of_range {
                return Err(LoadError::InvalidModel("split on unknown feature index".to_string()));
            }
        }
        Ok(Self {
            trees,
            tree_groups,
            base_margin,
            n_features,
            feature_names: Vec::new(),
        })
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = names;
        self
    }

    /// Build from a parsed XGBoost document (multi:softprob / multi:softmax, 3 classes)
    pub fn from_xgboost(doc: XgbModelDocument) -> Result<Self, LoadError> {
        let learner = doc.learner;

        let objective = learner.objective.name.as_str();
        if objective != "multi:softprob" && objective != "multi:softmax" {
            return Err(LoadError::InvalidModel(format!("unsupported objective '{}'", objective)));
        }
        let params = learner.learner_model_param;
        if params.num_class != StressLevel::COUNT {
            return Err(LoadError::InvalidModel(format!(
                "expected {} classes, model has {}",
                StressLevel::COUNT,
                params.num_class
            )));
        }

        let model = match learner.gradient_booster {
            GradientBooster::Gbtree { model } => model,
            GradientBooster::Unsupported => {
                return Err(LoadError::InvalidModel("only gbtree boosters are supported".to_string()))
            }
        };

        // Multi-class objectives use base_score as the margin directly
        let base_margin: Vec<f64> = match params.base_score.as_slice() {
            [single] => vec![*single as f64; StressLevel::COUNT],
            scores => scores.iter().map(|&s| s as f64).collect(),
        };

        let trees = model
            .trees
            .iter()
            .map(Tree::from_xgboost)
            .collect::<Result<Vec<_>, _>>()?;
        let tree_groups = model
            .tree_info
            .iter()
            .map(|&g| usize::try_from(g).map_err(|_| LoadError::InvalidModel(format!("invalid tree group {}", g))))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(trees, tree_groups, base_margin, params.num_feature)?
            .with_feature_names(learner.feature_names))
    }

    /// Read a model file; returns the forest and the SHA-256 of the file bytes
    pub fn load(path: &Path) -> Result<(Self, String), LoadError> {
        let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
        let checksum = hex::encode(Sha256::digest(&bytes));
        let doc: XgbModelDocument = serde_json::from_slice(&bytes).map_err(|e| LoadError::malformed(path, e))?;
        Ok((Self::from_xgboost(doc)?, checksum))
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn tree_group(&self, tree: usize) -> usize {
        self.tree_groups[tree]
    }

    pub fn n_groups(&self) -> usize {
        self.base_margin.len()
    }

    /// Declared feature count (0 if the model did not record it)
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn base_margin(&self, group: usize) -> f64 {
        self.base_margin[group]
    }

    /// Covers are needed for TreeSHAP
    pub fn has_covers(&self) -> bool {
        self.trees.iter().all(Tree::has_covers)
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(Tree::depth).max().unwrap_or(0)
    }

    /// Raw per-class scores before softmax
    pub fn predict_margin(&self, features: &[f64]) -> Vec<f64> {
        let mut margins = self.base_margin.clone();
        for (tree, &group) in self.trees.iter().zip(&self.tree_groups) {
            margins[group] += tree.predict(features) as f64;
        }
        margins
    }
}

pub fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

// ============================================================================
// TESTS
// ============================================================================

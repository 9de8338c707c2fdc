//! Feature Schema - Authoritative Feature Layout
//!
//! **The order of `names` is the positional contract with the trained model.**
//!
//! Loaded once at startup from two artifacts:
//! - `feature_columns.json`: ordered list of feature names
//! - `X_train.csv`: training rows, reduced to per-column means (the baseline)
//!
//! Never mutated after load; every request works on its own copy of the
//! baseline.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::path::Path;

use crc32fast::Hasher;

use crate::logic::error::LoadError;

// ============================================================================
// SCHEMA
// ============================================================================

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: HashMap<String, usize>,
    /// Training-set mean per feature, aligned with `names`
    baseline: Vec<f64>,
    layout_hash: u32,
}

impl FeatureSchema {
    /// Build a schema from an ordered name list and per-name baseline means.
    ///
    /// Names must be unique and non-empty, and every name needs a baseline.
    /// Baseline entries for names outside the schema are ignored.
    pub fn new(names: Vec<String>, baseline: &HashMap<String, f64>) -> Result<Self, LoadError> {
        if names.is_empty() {
            return Err(LoadError::InvalidSchema("feature list is empty".to_string()));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(LoadError::InvalidSchema(format!("feature {} has an empty name", i)));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(LoadError::InvalidSchema(format!("duplicate feature '{}'", name)));
            }
        }

        let baseline = names
            .iter()
            .map(|name| {
                baseline
                    .get(name)
                    .copied()
                    .ok_or_else(|| LoadError::MissingBaseline(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let layout_hash = compute_layout_hash(&names);

        Ok(Self { names, index, baseline, layout_hash })
    }

    /// Load the ordered feature list and the training data, then build the schema
    pub fn load(features_path: &Path, train_data_path: &Path) -> Result<Self, LoadError> {
        let names = load_feature_names(features_path)?;
        let means = load_baseline_means(train_data_path)?;

        let unused = means.keys().filter(|k| !names.contains(*k)).count();
        if unused > 0 {
            tracing::debug!("Ignoring {} training columns not in the feature schema", unused);
        }

        Self::new(names, &means)
    }

    /// Fail unless every given feature is part of the schema
    pub fn require(&self, names: &[&str]) -> Result<(), LoadError> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(LoadError::InvalidSchema(format!(
                "required feature '{}' is missing",
                missing
            ))),
            None => Ok(()),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Fresh, independent copy of the baseline values in schema order
    pub fn baseline(&self) -> Vec<f64> {
        self.baseline.clone()
    }

    pub fn baseline_value(&self, name: &str) -> Option<f64> {
        self.index_of(name).map(|i| self.baseline[i])
    }

    /// Columns of a categorical group as `(position, name)`, in schema order
    pub fn group<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (usize, &'a str)> + 'a {
        self.names
            .iter()
            .enumerate()
            .filter(move |(_, name)| is_categorical_group(name, prefix))
            .map(|(i, name)| (i, name.as_str()))
    }

    /// CRC32 of the ordered feature names
    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }
}

/// True if `name` starts with the categorical group prefix (e.g. "Season_")
pub fn is_categorical_group(name: &str, prefix: &str) -> bool {
    name.starts_with(prefix)
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}

// ============================================================================
// ARTIFACT LOADING
// ============================================================================

/// Read `feature_columns.json` (a JSON array of strings)
pub fn load_feature_names(path: &Path) -> Result<Vec<String>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    serde_json::from_reader(std::io::BufReader::new(file)).map_err(|e| LoadError::malformed(path, e))
}

/// Read the training CSV and reduce every column to its mean.
///
/// Empty cells are skipped, `True`/`False` count as 1/0. A column with no
/// values at all gets a NaN mean, which the model treats as missing.
pub fn load_baseline_means(path: &Path) -> Result<HashMap<String, f64>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::io(path, e))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(|e| LoadError::malformed(path, e))?.clone();
    let mut seen = HashSet::with_capacity(headers.len());
    for header in headers.iter() {
        if !seen.insert(header) {
            return Err(LoadError::malformed(path, format!("duplicate column '{}'", header)));
        }
    }

    let mut sums = vec![0.0f64; headers.len()];
    let mut counts = vec![0usize; headers.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| LoadError::malformed(path, e))?;
        for (col, cell) in record.iter().enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let value = parse_cell(cell).ok_or_else(|| {
                LoadError::malformed(
                    path,
                    format!("row {}, column '{}': '{}' is not numeric", row + 2, &headers[col], cell),
                )
            })?;
            sums[col] += value;
            counts[col] += 1;
        }
    }

    Ok(headers
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let mean = if counts[col] > 0 { sums[col] / counts[col] as f64 } else { f64::NAN };
            (name.to_string(), mean)
        })
        .collect())
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        cell.parse().ok()
    }
}

// ============================================================================
// TESTS
// ============================================================================

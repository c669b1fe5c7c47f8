// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Classifier contract and model selection.
//!
//! The engine only needs `fit` and `predict`. [`DecisionTree`] and
//! [`RandomForest`] are the two bundled implementations; any other type
//! implementing [`Classifier`] can be plugged into a
//! [`crate::SequenceClassifier`].

use crate::forest::RandomForest;
use crate::labels::Label;
use crate::tree::DecisionTree;
use flowgroup_core::{ClassifierConfig, FlowgroupError, ModelKind, Result, TaskCode};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

/// Supervised classifier mapping feature rows to labels.
pub trait Classifier: Send + Sync {
    /// Fit on `features` (one row per sample) and row-aligned `labels`.
    ///
    /// Fails with [`FlowgroupError::InsufficientData`] when fewer than two
    /// distinct labels are present.
    fn fit(&mut self, features: &Array2<f64>, labels: &[Label]) -> Result<()>;

    /// One label per input row.
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Label>>;

    /// Short model name used in reports.
    fn name(&self) -> &'static str;
}

/// Largest task code magnitude an `f64` holds exactly.
pub const MAX_EXACT_CODE: u64 = 1 << 53;

/// Stack equal-length integer rows into an `f64` matrix.
///
/// Codes beyond [`MAX_EXACT_CODE`] are rejected, since distinct codes
/// would collapse into the same float.
pub fn feature_matrix(rows: &[Vec<TaskCode>]) -> Result<Array2<f64>> {
    let width = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(FlowgroupError::ShapeMismatch(format!(
            "feature row {i} has {} values, expected {width}",
            row.len()
        )));
    }

    if let Some(&code) = rows.iter().flatten().find(|v| v.unsigned_abs() > MAX_EXACT_CODE) {
        return Err(FlowgroupError::CodeOutOfRange(code));
    }

    let flat: Vec<f64> = rows.iter().flatten().map(|&v| v as f64).collect();
    Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|e| FlowgroupError::ShapeMismatch(e.to_string()))
}

/// Shared input validation for `fit`.
pub(crate) fn check_training_input(features: &Array2<f64>, labels: &[Label]) -> Result<()> {
    if features.nrows() != labels.len() {
        return Err(FlowgroupError::ShapeMismatch(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    let distinct = labels.iter().collect::<BTreeSet<_>>().len();
    if distinct < 2 {
        return Err(FlowgroupError::InsufficientData {
            distinct_labels: distinct,
        });
    }
    Ok(())
}

/// Shared input validation for `predict`.
pub(crate) fn check_prediction_input(features: &Array2<f64>, expected_width: usize) -> Result<()> {
    if features.nrows() > 0 && features.ncols() != expected_width {
        return Err(FlowgroupError::ShapeMismatch(format!(
            "model was fitted on {expected_width} features, got {}",
            features.ncols()
        )));
    }
    Ok(())
}

/// Most frequent label; ties go to the smallest label.
pub(crate) fn majority<I>(labels: I) -> Option<Label>
where
    I: IntoIterator<Item = Label>,
{
    let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut best: Option<(Label, usize)> = None;
    for (label, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Build the configured model for a corpus of `n_samples` rows.
pub fn select_model(config: &ClassifierConfig, n_samples: usize) -> Box<dyn Classifier> {
    let kind = match config.model {
        ModelKind::Auto if n_samples >= config.large_corpus_threshold => ModelKind::Forest,
        ModelKind::Auto => ModelKind::Tree,
        other => other,
    };

    tracing::debug!(?kind, n_samples, "selected classifier");

    match kind {
        ModelKind::Forest => Box::new(
            RandomForest::new(config.n_estimators)
                .with_max_depth(config.max_depth)
                .with_seed(config.seed),
        ),
        _ => Box::new(
            DecisionTree::new()
                .with_max_depth(config.max_depth)
                .with_seed(config.seed),
        ),
    }
}

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

//! Held-out accuracy evaluation for larger corpora.
//!
//! Labels with a single member cannot be stratified, so they are removed
//! first. The held-out fraction is `max(min_test_fraction, k / n)`, which
//! leaves room for one test row per class.

use crate::classifier::{select_model, Classifier};
use crate::labels::{Label, LabeledDataset};
use crate::metrics::ClassificationMetrics;
use crate::split::{drop_rare_labels, stratified_split, test_fraction};
use flowgroup_core::{ClassifierConfig, FlowgroupError, Result};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Outcome of one train/test evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldoutReport {
    pub model: String,
    pub accuracy: f64,
    /// Wall-clock time spent in `predict` on the test split
    pub prediction_latency_secs: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub class_count: usize,
    /// Processes dropped because their label had a single member
    pub removed: usize,
    pub test_fraction: f64,
    pub metrics: ClassificationMetrics,
}

/// Evaluate the configured model on a stratified held-out split.
pub fn evaluate_holdout(dataset: &LabeledDataset, config: &ClassifierConfig) -> Result<HoldoutReport> {
    let mut model = select_model(config, dataset.len());
    evaluate_holdout_with(dataset, model.as_mut(), config.min_test_fraction, config.seed)
}

/// Evaluate a caller-supplied model on a stratified held-out split.
pub fn evaluate_holdout_with<C>(
    dataset: &LabeledDataset,
    model: &mut C,
    min_test_fraction: f64,
    seed: u64,
) -> Result<HoldoutReport>
where
    C: Classifier + ?Sized,
{
    let filtered = drop_rare_labels(&dataset.labels, 2);
    let class_count = filtered.class_count();
    if class_count < 2 {
        return Err(FlowgroupError::InsufficientData {
            distinct_labels: class_count,
        });
    }

    let fraction = test_fraction(min_test_fraction, class_count, filtered.rows.len());
    let split = stratified_split(&filtered.labels, fraction, seed)?;

    let kept = dataset.feature_matrix()?.select(Axis(0), &filtered.rows);
    let x_train = kept.select(Axis(0), &split.train);
    let x_test = kept.select(Axis(0), &split.test);
    let y_train: Vec<Label> = split.train.iter().map(|&i| filtered.labels[i]).collect();
    let y_test: Vec<Label> = split.test.iter().map(|&i| filtered.labels[i]).collect();

    model.fit(&x_train, &y_train)?;

    let started = Instant::now();
    let predicted = model.predict(&x_test)?;
    let prediction_latency_secs = started.elapsed().as_secs_f64();

    let metrics = ClassificationMetrics::compute(&y_test, &predicted)?;

    tracing::info!(
        model = model.name(),
        accuracy = metrics.accuracy,
        train = y_train.len(),
        test = y_test.len(),
        classes = class_count,
        removed = filtered.removed,
        latency_secs = prediction_latency_secs,
        "held-out evaluation finished"
    );

    Ok(HoldoutReport {
        model: model.name().to_string(),
        accuracy: metrics.accuracy,
        prediction_latency_secs,
        train_size: y_train.len(),
        test_size: y_test.len(),
        class_count,
        removed: filtered.removed,
        test_fraction: fraction,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::PaddedSequence;
    use crate::labels::build_feature_labels;
    use crate::tree::DecisionTree;
    use flowgroup_core::{ModelKind, SequenceStore};

    fn corpus() -> SequenceStore {
        let templates: [&[i64]; 3] = [&[1, 2, 3], &[4, 5], &[6, 7, 8, 9]];
        let mut pairs: Vec<(String, Vec<i64>)> = (0..12)
            .map(|i| (format!("P{i}"), templates[i % 3].to_vec()))
            .collect();
        pairs.push(("lonely".to_string(), vec![42]));
        SequenceStore::from_pairs(pairs)
    }

    #[test]
    fn test_holdout_on_repeated_templates() {
        let store = corpus();
        let dataset = build_feature_labels(&store, &PaddedSequence::for_store(&store));
        let config = ClassifierConfig {
            model: ModelKind::Tree,
            ..Default::default()
        };

        let report = evaluate_holdout(&dataset, &config).unwrap();
        assert_eq!(report.model, "decision_tree");
        assert_eq!(report.removed, 1);
        assert_eq!(report.class_count, 3);
        // round(0.3 * 4) = 1 test row per class
        assert_eq!(report.test_size, 3);
        assert_eq!(report.train_size, 9);
        assert_eq!(report.accuracy, 1.0);
        assert!(report.prediction_latency_secs >= 0.0);
    }

    #[test]
    fn test_single_class_after_filtering() {
        let store = SequenceStore::from_pairs(vec![
            ("a", vec![1, 2]),
            ("b", vec![1, 2]),
            ("c", vec![3]),
        ]);
        let dataset = build_feature_labels(&store, &PaddedSequence::for_store(&store));
        let err = evaluate_holdout_with(&dataset, &mut DecisionTree::new(), 0.3, 1).unwrap_err();
        assert!(matches!(
            err,
            FlowgroupError::InsufficientData { distinct_labels: 1 }
        ));
    }

    #[test]
    fn test_fraction_covers_many_small_classes() {
        // six classes of two rows each: k / n = 0.5
        let pairs: Vec<(String, Vec<i64>)> = (0..12)
            .map(|i| (format!("P{i}"), vec![(i % 6) as i64 + 1]))
            .collect();
        let store = SequenceStore::from_pairs(pairs);
        let dataset = build_feature_labels(&store, &PaddedSequence::for_store(&store));

        let report = evaluate_holdout_with(&dataset, &mut DecisionTree::new(), 0.3, 5).unwrap();
        assert_eq!(report.test_fraction, 0.5);
        assert_eq!(report.test_size, 6);
        assert_eq!(report.accuracy, 1.0);
    }
}

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

//! Multi-class classification metrics for held-out predictions.

use crate::labels::Label;
use flowgroup_core::{FlowgroupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Precision, recall and F1 for a single label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true instances of this label
    pub support: usize,
}

/// Accuracy plus macro-averaged precision/recall/F1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub correct: usize,
    pub total: usize,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    /// Per-label breakdown in ascending label order
    pub per_class: Vec<ClassMetrics>,
}

#[derive(Default)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl ClassificationMetrics {
    /// Compare predictions against ground truth, row by row.
    pub fn compute(y_true: &[Label], y_pred: &[Label]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(FlowgroupError::ShapeMismatch(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let labels: BTreeSet<Label> = y_true.iter().chain(y_pred).copied().collect();
        let mut counts: BTreeMap<Label, Counts> =
            labels.into_iter().map(|l| (l, Counts::default())).collect();

        let mut correct = 0;
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            if truth == pred {
                correct += 1;
                if let Some(c) = counts.get_mut(&truth) {
                    c.tp += 1;
                }
            } else {
                if let Some(c) = counts.get_mut(&pred) {
                    c.fp += 1;
                }
                if let Some(c) = counts.get_mut(&truth) {
                    c.fn_ += 1;
                }
            }
        }

        let per_class: Vec<ClassMetrics> = counts
            .into_iter()
            .map(|(label, c)| {
                let precision = ratio(c.tp, c.tp + c.fp);
                let recall = ratio(c.tp, c.tp + c.fn_);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support: c.tp + c.fn_,
                }
            })
            .collect();

        let mean = |f: fn(&ClassMetrics) -> f64| {
            if per_class.is_empty() {
                0.0
            } else {
                per_class.iter().map(f).sum::<f64>() / per_class.len() as f64
            }
        };

        Ok(Self {
            accuracy: ratio(correct, y_true.len()),
            correct,
            total: y_true.len(),
            macro_precision: mean(|m| m.precision),
            macro_recall: mean(|m| m.recall),
            macro_f1: mean(|m| m.f1),
            per_class,
        })
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let m = ClassificationMetrics::compute(&[1, 2, 3, 1], &[1, 2, 3, 1]).unwrap();
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.correct, 4);
        assert_eq!(m.macro_f1, 1.0);
        assert_eq!(m.per_class[0].support, 2);
    }

    #[test]
    fn test_mixed_predictions() {
        let m = ClassificationMetrics::compute(&[1, 1, 2, 2], &[1, 2, 2, 2]).unwrap();
        assert_eq!(m.accuracy, 0.75);

        let one = &m.per_class[0];
        assert_eq!(one.precision, 1.0);
        assert_eq!(one.recall, 0.5);

        let two = &m.per_class[1];
        assert!((two.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(two.recall, 1.0);
    }

    #[test]
    fn test_label_only_predicted() {
        let m = ClassificationMetrics::compute(&[1, 1], &[1, 4]).unwrap();
        assert_eq!(m.per_class.len(), 2);
        assert_eq!(m.per_class[1].label, 4);
        assert_eq!(m.per_class[1].support, 0);
        assert_eq!(m.per_class[1].f1, 0.0);
    }

    #[test]
    fn test_empty_and_mismatched() {
        let m = ClassificationMetrics::compute(&[], &[]).unwrap();
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.macro_f1, 0.0);
        assert!(ClassificationMetrics::compute(&[1], &[]).is_err());
    }
}

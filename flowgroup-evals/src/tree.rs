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

//! CART decision tree with Gini impurity.
//!
//! Nodes live in a flat arena with the root at index 0. Splits test
//! `x[feature] <= threshold`; thresholds are midpoints between adjacent
//! distinct values. Among equally good splits the first one found (lowest
//! feature index, lowest threshold) wins, so fitting is deterministic for a
//! given seed.

use crate::classifier::{check_prediction_input, check_training_input, majority, Classifier};
use crate::labels::Label;
use flowgroup_core::{FlowgroupError, Result};
use ndarray::{Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const IMPURITY_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        label: Label,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Single decision tree classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    max_features: Option<usize>,
    seed: u64,
    n_features: usize,
    nodes: Vec<Node>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
            n_features: 0,
            nodes: Vec::new(),
        }
    }

    /// Stop splitting below this depth. `None` grows until leaves are pure.
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split.max(2);
        self
    }

    /// Consider a random subset of this many features at each split.
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path, counted in edges.
    pub fn depth(&self) -> usize {
        if self.nodes.is_empty() {
            return 0;
        }
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match self.nodes[node] {
                Node::Leaf { .. } => deepest = deepest.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }

    /// Grow the tree on the given rows. Rows may repeat (bootstrap samples)
    /// and may all share one label; callers validate the label count.
    pub(crate) fn fit_rows(&mut self, features: &Array2<f64>, labels: &[Label], rows: &[usize]) {
        self.n_features = features.ncols();
        self.nodes.clear();

        let mut classes: Vec<Label> = rows.iter().map(|&r| labels[r]).collect();
        classes.sort_unstable();
        classes.dedup();
        let class_index: HashMap<Label, usize> =
            classes.iter().enumerate().map(|(i, &l)| (l, i)).collect();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|l| class_index.get(l).copied().unwrap_or(0))
            .collect();

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut builder = Builder {
            features,
            labels,
            encoded: &encoded,
            n_classes: classes.len(),
            tree: self,
            rng: &mut rng,
        };
        builder.grow(rows.to_vec(), 0);
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<Label> {
        let mut node = 0;
        loop {
            match self.nodes.get(node).ok_or(FlowgroupError::NotFitted)? {
                Node::Leaf { label } => return Ok(*label),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Label]) -> Result<()> {
        check_training_input(features, labels)?;
        let rows: Vec<usize> = (0..features.nrows()).collect();
        self.fit_rows(features, labels, &rows);

        tracing::debug!(
            samples = rows.len(),
            nodes = self.node_count(),
            depth = self.depth(),
            "fitted decision tree"
        );
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Label>> {
        if !self.is_fitted() {
            return Err(FlowgroupError::NotFitted);
        }
        check_prediction_input(features, self.n_features)?;
        features
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect()
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}

struct Builder<'a> {
    features: &'a Array2<f64>,
    labels: &'a [Label],
    encoded: &'a [usize],
    n_classes: usize,
    tree: &'a mut DecisionTree,
    rng: &'a mut StdRng,
}

impl Builder<'_> {
    /// Append the subtree for `rows` and return its root index.
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let index = self.tree.nodes.len();
        let label = majority(rows.iter().map(|&r| self.labels[r])).unwrap_or_default();
        self.tree.nodes.push(Node::Leaf { label });

        let pure = rows
            .iter()
            .all(|&r| self.encoded[r] == self.encoded[rows[0]]);
        let depth_reached = self.tree.max_depth.is_some_and(|max| depth >= max);
        if pure || depth_reached || rows.len() < self.tree.min_samples_split {
            return index;
        }

        let Some(split) = self.best_split(&rows) else {
            return index;
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .iter()
            .partition(|&&r| self.features[[r, split.feature]] <= split.threshold);

        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.tree.nodes[index] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        index
    }

    fn candidate_features(&mut self) -> Vec<usize> {
        let total = self.tree.n_features;
        match self.tree.max_features {
            Some(m) if m > 0 && m < total => {
                let mut picked = sample(&mut *self.rng, total, m).into_vec();
                picked.sort_unstable();
                picked
            }
            _ => (0..total).collect(),
        }
    }

    fn best_split(&mut self, rows: &[usize]) -> Option<SplitCandidate> {
        let sampled = self.candidate_features();
        let found = self.best_split_among(rows, &sampled);
        if found.is_some() || sampled.len() == self.tree.n_features {
            return found;
        }
        // sampled features are constant on this node
        let all: Vec<usize> = (0..self.tree.n_features).collect();
        self.best_split_among(rows, &all)
    }

    fn best_split_among(&self, rows: &[usize], features: &[usize]) -> Option<SplitCandidate> {
        let mut total = vec![0usize; self.n_classes];
        for &r in rows {
            total[self.encoded[r]] += 1;
        }

        let n = rows.len() as f64;
        let mut best: Option<SplitCandidate> = None;
        let mut ordered: Vec<(f64, usize)> = Vec::with_capacity(rows.len());

        for &feature in features {
            ordered.clear();
            ordered.extend(
                rows.iter()
                    .map(|&r| (self.features[[r, feature]], self.encoded[r])),
            );
            ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            for k in 0..ordered.len() - 1 {
                left[ordered[k].1] += 1;
                let (value, next) = (ordered[k].0, ordered[k + 1].0);
                if value == next {
                    continue;
                }

                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                let impurity = (n_left * gini(&left, n_left)
                    + n_right * gini_complement(&total, &left, n_right))
                    / n;

                if best.map_or(true, |b| impurity < b.impurity - IMPURITY_EPSILON) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (value + next) / 2.0,
                        impurity,
                    });
                }
            }
        }
        best
    }
}

fn gini(counts: &[usize], n: f64) -> f64 {
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

fn gini_complement(total: &[usize], left: &[usize], n: f64) -> f64 {
    1.0 - total
        .iter()
        .zip(left)
        .map(|(&t, &l)| {
            let p = (t - l) as f64 / n;
            p * p
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_separable_data() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [8.0, 0.0], [9.0, 0.0]];
        let y = vec![1, 1, 2, 2];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();

        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&array![[5.5, 3.0]]).unwrap(), vec![2]);
        assert_eq!(tree.predict(&array![[4.9, 3.0]]).unwrap(), vec![1]);
    }

    #[test]
    fn test_xor_needs_two_levels() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = vec![1, 2, 2, 1];

        let mut tree = DecisionTree::new();
        tree.fit(&x, &y).unwrap();
        assert_eq!(tree.predict(&x).unwrap(), y);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
        let y = vec![1, 2, 2, 1];

        let mut stump = DecisionTree::new().with_max_depth(Some(1));
        stump.fit(&x, &y).unwrap();
        assert!(stump.depth() <= 1);
        assert_eq!(stump.leaf_count(), 2);
    }

    #[test]
    fn test_predict_before_fit() {
        let tree = DecisionTree::new();
        assert!(matches!(
            tree.predict(&array![[1.0]]),
            Err(FlowgroupError::NotFitted)
        ));
    }

    #[test]
    fn test_single_label_rejected() {
        let mut tree = DecisionTree::new();
        let err = tree.fit(&array![[1.0], [2.0]], &[4, 4]).unwrap_err();
        assert_eq!(err.kind(), "insufficient_data");
        assert!(!tree.is_fitted());
    }

    #[test]
    fn test_width_mismatch_on_predict() {
        let mut tree = DecisionTree::new();
        tree.fit(&array![[1.0, 2.0], [3.0, 4.0]], &[1, 2]).unwrap();
        let err = tree.predict(&array![[1.0]]).unwrap_err();
        assert_eq!(err.kind(), "shape_mismatch");
    }

    #[test]
    fn test_indistinguishable_rows_take_majority() {
        let x = array![[1.0], [1.0], [1.0]];
        let mut tree = DecisionTree::new();
        tree.fit(&x, &[3, 2, 3]).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&x).unwrap(), vec![3, 3, 3]);
    }

    #[test]
    fn test_feature_subset_falls_back_when_constant() {
        // only feature 2 separates the classes
        let x = array![[5.0, 5.0, 1.0], [5.0, 5.0, 2.0], [5.0, 5.0, 9.0]];
        let y = vec![1, 1, 2];
        for seed in 0..8 {
            let mut tree = DecisionTree::new()
                .with_max_features(Some(1))
                .with_seed(seed);
            tree.fit(&x, &y).unwrap();
            assert_eq!(tree.predict(&x).unwrap(), y);
        }
    }
}

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

//! Bagged ensemble of decision trees.

use crate::classifier::{check_prediction_input, check_training_input, majority, Classifier};
use crate::labels::Label;
use crate::tree::DecisionTree;
use flowgroup_core::{FlowgroupError, Result};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Random forest classifier.
///
/// Tree `t` is grown on a bootstrap sample drawn with seed `seed + t` and
/// considers `max(1, floor(sqrt(d)))` random features per split unless
/// `max_features` is set. Trees are grown in parallel; prediction is a
/// majority vote with ties going to the smallest label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    seed: u64,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(n_estimators: usize) -> Self {
        Self {
            n_estimators,
            max_depth: None,
            max_features: None,
            seed: 42,
            n_features: 0,
            trees: Vec::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .max(1)
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, features: &Array2<f64>, labels: &[Label]) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(FlowgroupError::InvalidConfig(
                "random forest needs at least one estimator".to_string(),
            ));
        }
        check_training_input(features, labels)?;

        let n_samples = features.nrows();
        let max_features = self.features_per_split(features.ncols());
        let max_depth = self.max_depth;
        let seed = self.seed;

        self.trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|t| {
                let tree_seed = seed.wrapping_add(t as u64);
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let rows: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();

                let mut tree = DecisionTree::new()
                    .with_max_depth(max_depth)
                    .with_max_features(Some(max_features))
                    .with_seed(tree_seed);
                tree.fit_rows(features, labels, &rows);
                tree
            })
            .collect();
        self.n_features = features.ncols();

        tracing::debug!(
            trees = self.trees.len(),
            samples = n_samples,
            max_features,
            "fitted random forest"
        );
        Ok(())
    }

    fn predict(&self, features: &Array2<f64>) -> Result<Vec<Label>> {
        if !self.is_fitted() {
            return Err(FlowgroupError::NotFitted);
        }
        check_prediction_input(features, self.n_features)?;

        let votes = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(features))
            .collect::<Result<Vec<_>>>()?;

        (0..features.nrows())
            .map(|row| majority(votes.iter().map(|v| v[row])).ok_or(FlowgroupError::NotFitted))
            .collect()
    }

    fn name(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> (Array2<f64>, Vec<Label>) {
        let x = array![
            [1.0, 1.0, 0.0, 0.0],
            [1.0, 2.0, 0.0, 0.0],
            [2.0, 1.0, 0.0, 0.0],
            [9.0, 9.0, 1.0, 0.0],
            [9.0, 8.0, 1.0, 0.0],
            [8.0, 9.0, 1.0, 0.0],
        ];
        (x, vec![1, 1, 1, 2, 2, 2])
    }

    #[test]
    fn test_fits_separable_blobs() {
        let (x, y) = blobs();
        let mut forest = RandomForest::new(25).with_seed(7);
        forest.fit(&x, &y).unwrap();

        assert_eq!(forest.trees().len(), 25);
        assert_eq!(forest.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_seeded_forests_agree() {
        let (x, y) = blobs();
        let probe = array![[5.0, 5.0, 0.0, 0.0], [4.0, 6.0, 1.0, 0.0]];

        let mut a = RandomForest::new(15).with_seed(3);
        let mut b = RandomForest::new(15).with_seed(3);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&probe).unwrap(), b.predict(&probe).unwrap());
    }

    #[test]
    fn test_sqrt_features_default() {
        let forest = RandomForest::new(1);
        assert_eq!(forest.features_per_split(16), 4);
        assert_eq!(forest.features_per_split(3), 1);
        assert_eq!(forest.features_per_split(0), 1);
        assert_eq!(forest.with_max_features(Some(5)).features_per_split(16), 5);
    }

    #[test]
    fn test_errors() {
        let (x, y) = blobs();
        assert!(matches!(
            RandomForest::new(5).predict(&x),
            Err(FlowgroupError::NotFitted)
        ));
        assert_eq!(
            RandomForest::new(0).fit(&x, &y).unwrap_err().kind(),
            "invalid_config"
        );
        assert_eq!(
            RandomForest::new(5).fit(&x, &[1; 6]).unwrap_err().kind(),
            "insufficient_data"
        );
    }
}

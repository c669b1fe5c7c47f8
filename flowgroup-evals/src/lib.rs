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

//! # Flowgroup classification
//!
//! Groups processes by training a supervised model on synthetic labels.
//!
//! Every process is mapped to a fixed-length feature vector by a
//! [`FeatureExtractor`]. Each distinct vector becomes a label, the model
//! learns `features -> label`, and predicted labels are inverted back into
//! groups of processes. On larger corpora the same labels drive a stratified
//! held-out evaluation reporting accuracy and prediction latency.
//!
//! ## Example
//!
//! ```rust,ignore
//! use flowgroup_core::{ClassifierConfig, SequenceStore};
//! use flowgroup_evals::SequenceClassifier;
//!
//! let store = SequenceStore::from_pairs(vec![("A", vec![1, 2, 3]), ("B", vec![4, 5])]);
//! let mut classifier = SequenceClassifier::from_config(&ClassifierConfig::default(), &store);
//! classifier.train(&store)?;
//! let groups = classifier.group_by_prediction(&store)?;
//! ```

pub mod classifier;
pub mod evaluation;
pub mod features;
pub mod forest;
pub mod labels;
pub mod metrics;
pub mod sequence;
pub mod split;
pub mod tree;

pub use classifier::{feature_matrix, select_model, Classifier, MAX_EXACT_CODE};
pub use evaluation::{evaluate_holdout, evaluate_holdout_with, HoldoutReport};
pub use features::{extractor_for, trim_padding, FeatureExtractor, PaddedSequence, SortedPrefix, PAD};
pub use forest::RandomForest;
pub use labels::{build_feature_labels, Label, LabelRegistry, LabeledDataset};
pub use metrics::{ClassMetrics, ClassificationMetrics};
pub use sequence::{group_by_labels, LabelGroup, SequenceClassifier};
pub use split::{drop_rare_labels, stratified_split, test_fraction, FilteredLabels, TrainTestSplit};
pub use tree::DecisionTree;

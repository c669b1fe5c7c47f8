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

//! Synthetic labels from distinct feature vectors.
//!
//! Each distinct feature vector receives a dense 1-based label the first
//! time it is seen, in store order. Label identity therefore depends on the
//! feature vectors and the iteration order only.

use crate::classifier::feature_matrix;
use crate::features::FeatureExtractor;
use flowgroup_core::{ProcessId, Result, SequenceStore, TaskCode};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Dense class label, starting at 1.
pub type Label = usize;

/// Insertion-ordered arena of feature vectors. Label = arena index + 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<TaskCode>>", into = "Vec<Vec<TaskCode>>")]
pub struct LabelRegistry {
    features: Vec<Vec<TaskCode>>,
    by_features: HashMap<Vec<TaskCode>, Label>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label for `features`, assigning the next one if unseen.
    pub fn intern(&mut self, features: &[TaskCode]) -> Label {
        if let Some(&label) = self.by_features.get(features) {
            return label;
        }
        self.features.push(features.to_vec());
        let label = self.features.len();
        self.by_features.insert(features.to_vec(), label);
        label
    }

    /// Label previously assigned to `features`.
    pub fn label_of(&self, features: &[TaskCode]) -> Option<Label> {
        self.by_features.get(features).copied()
    }

    /// Canonical feature vector behind a label.
    pub fn features_of(&self, label: Label) -> Option<&[TaskCode]> {
        label
            .checked_sub(1)
            .and_then(|i| self.features.get(i))
            .map(Vec::as_slice)
    }

    /// Number of labels assigned.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// `(label, features)` in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (Label, &[TaskCode])> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (i + 1, f.as_slice()))
    }
}

impl From<Vec<Vec<TaskCode>>> for LabelRegistry {
    fn from(features: Vec<Vec<TaskCode>>) -> Self {
        let mut registry = Self::new();
        for vector in &features {
            registry.intern(vector);
        }
        registry
    }
}

impl From<LabelRegistry> for Vec<Vec<TaskCode>> {
    fn from(registry: LabelRegistry) -> Self {
        registry.features
    }
}

/// Processes with their feature vectors and synthetic labels, row-aligned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledDataset {
    pub process_ids: Vec<ProcessId>,
    pub features: Vec<Vec<TaskCode>>,
    pub labels: Vec<Label>,
    pub registry: LabelRegistry,
}

impl LabeledDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn distinct_labels(&self) -> usize {
        self.registry.len()
    }

    /// Features as a dense `rows x width` matrix.
    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        feature_matrix(&self.features)
    }

    /// Label of a process by id.
    pub fn label_of(&self, process: &str) -> Option<Label> {
        self.process_ids
            .iter()
            .position(|p| p == process)
            .map(|row| self.labels[row])
    }
}

/// Extract features for every process and assign labels in store order.
pub fn build_feature_labels<E>(store: &SequenceStore, extractor: &E) -> LabeledDataset
where
    E: FeatureExtractor + ?Sized,
{
    let mut registry = LabelRegistry::new();
    let mut process_ids = Vec::with_capacity(store.len());
    let mut features = Vec::with_capacity(store.len());
    let mut labels = Vec::with_capacity(store.len());

    for process in store {
        let vector = extractor.extract(&process.sequence);
        labels.push(registry.intern(&vector));
        process_ids.push(process.id.clone());
        features.push(vector);
    }

    tracing::debug!(
        extractor = extractor.name(),
        rows = labels.len(),
        labels = registry.len(),
        "assigned feature labels"
    );

    LabeledDataset {
        process_ids,
        features,
        labels,
        registry,
    }
}

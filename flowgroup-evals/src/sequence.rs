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

//! Grouping processes through a trained classifier.

use crate::classifier::{feature_matrix, select_model, Classifier};
use crate::evaluation::{evaluate_holdout_with, HoldoutReport};
use crate::features::{extractor_for, FeatureExtractor};
use crate::labels::{build_feature_labels, Label, LabelRegistry, LabeledDataset};
use flowgroup_core::{ClassifierConfig, FlowgroupError, ProcessId, Result, SequenceStore, TaskCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Processes sharing one predicted label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelGroup {
    pub label: Label,
    /// Canonical feature vector registered for the label
    pub feature_vector: Vec<TaskCode>,
    pub processes: Vec<ProcessId>,
}

impl LabelGroup {
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

/// Invert row-aligned `(id, label)` pairs into groups ordered by first
/// appearance of each label.
pub fn group_by_labels(
    ids: &[ProcessId],
    labels: &[Label],
    registry: &LabelRegistry,
) -> Vec<LabelGroup> {
    let mut groups: Vec<LabelGroup> = Vec::new();
    let mut slot: HashMap<Label, usize> = HashMap::new();

    for (id, &label) in ids.iter().zip(labels) {
        let index = *slot.entry(label).or_insert_with(|| {
            groups.push(LabelGroup {
                label,
                feature_vector: registry
                    .features_of(label)
                    .map(<[TaskCode]>::to_vec)
                    .unwrap_or_default(),
                processes: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].processes.push(id.clone());
    }
    groups
}

/// Feature extraction, synthetic labelling and a pluggable model.
pub struct SequenceClassifier {
    extractor: Box<dyn FeatureExtractor>,
    model: Box<dyn Classifier>,
    dataset: Option<LabeledDataset>,
}

impl SequenceClassifier {
    pub fn new(extractor: Box<dyn FeatureExtractor>, model: Box<dyn Classifier>) -> Self {
        Self {
            extractor,
            model,
            dataset: None,
        }
    }

    /// Extractor and model chosen by `config` for this store.
    pub fn from_config(config: &ClassifierConfig, store: &SequenceStore) -> Self {
        Self::new(extractor_for(config, store), select_model(config, store.len()))
    }

    pub fn model_name(&self) -> &'static str {
        self.model.name()
    }

    pub fn extractor_name(&self) -> &str {
        self.extractor.name()
    }

    /// Labelled training set from the last `train` call.
    pub fn dataset(&self) -> Option<&LabeledDataset> {
        self.dataset.as_ref()
    }

    /// Label every process in `store` and fit the model on all rows.
    pub fn train(&mut self, store: &SequenceStore) -> Result<&LabeledDataset> {
        let dataset = build_feature_labels(store, self.extractor.as_ref());
        let features = dataset.feature_matrix()?;
        self.model.fit(&features, &dataset.labels)?;

        tracing::info!(
            model = self.model.name(),
            processes = dataset.len(),
            labels = dataset.distinct_labels(),
            "trained sequence classifier"
        );
        Ok(&*self.dataset.insert(dataset))
    }

    /// Predicted label for each process in store order.
    pub fn predict(&self, store: &SequenceStore) -> Result<Vec<Label>> {
        if self.dataset.is_none() {
            return Err(FlowgroupError::NotFitted);
        }
        let rows: Vec<Vec<TaskCode>> = store
            .iter()
            .map(|p| self.extractor.extract(&p.sequence))
            .collect();
        self.model.predict(&feature_matrix(&rows)?)
    }

    /// Groups of processes sharing a predicted label.
    pub fn group_by_prediction(&self, store: &SequenceStore) -> Result<Vec<LabelGroup>> {
        let dataset = self.dataset.as_ref().ok_or(FlowgroupError::NotFitted)?;
        let predicted = self.predict(store)?;
        Ok(group_by_labels(&store.ids(), &predicted, &dataset.registry))
    }

    /// Held-out evaluation of this classifier's model on `store`.
    ///
    /// Refits the model on the training split, so call `train` again
    /// afterwards if full-data predictions are needed.
    pub fn evaluate(&mut self, store: &SequenceStore, config: &ClassifierConfig) -> Result<HoldoutReport> {
        let dataset = build_feature_labels(store, self.extractor.as_ref());
        self.dataset = None;
        evaluate_holdout_with(&dataset, self.model.as_mut(), config.min_test_fraction, config.seed)
    }
}

impl std::fmt::Debug for SequenceClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceClassifier")
            .field("extractor", &self.extractor.name())
            .field("model", &self.model.name())
            .field("trained", &self.dataset.is_some())
            .finish()
    }
}

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

//! Serializable analysis output consumed by the reporting layer.

use flowgroup_core::{FlowgroupError, TaskCode};
use flowgroup_evals::{HoldoutReport, LabelGroup};
use flowgroup_index::{ClusterStats, PatternGroup, PatternSummary, SimilarityEdge};
use serde::{Deserialize, Serialize};

/// Result of one independent view. A failed view does not stop the others.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum ViewOutcome<T> {
    Completed(T),
    Failed { kind: String, message: String },
}

impl<T> ViewOutcome<T> {
    pub fn from_result(view: &str, result: Result<T, FlowgroupError>) -> Self {
        match result {
            Ok(value) => ViewOutcome::Completed(value),
            Err(e) => {
                tracing::warn!(view, kind = e.kind(), error = %e, "analysis view failed");
                ViewOutcome::Failed {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn completed(&self) -> Option<&T> {
        match self {
            ViewOutcome::Completed(value) => Some(value),
            ViewOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewOutcome::Failed { .. })
    }
}

/// Size of the analysed dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub processes: usize,
    pub total_steps: usize,
    pub longest_sequence: usize,
}

/// Pattern tables of the pattern-mining view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    pub summary: PatternSummary,
    /// Exact-sequence groups shared by more than one process
    pub exact_sequences: Vec<PatternGroup>,
    /// Leading common subsequences by process count
    pub common_subsequences: Vec<PatternGroup>,
    /// Shared leading patterns
    pub starting_patterns: Vec<PatternGroup>,
    /// Shared trailing patterns
    pub ending_patterns: Vec<PatternGroup>,
    pub pattern_length: usize,
    pub min_subsequence_length: usize,
}

/// One connected component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterGroup {
    pub id: usize,
    pub processes: Vec<String>,
    /// Task codes present in every member, in first-member order
    pub shared_codes: Vec<TaskCode>,
}

/// Similarity graph and component groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterReport {
    pub threshold: f64,
    pub edge_count: usize,
    pub stats: ClusterStats,
    pub groups: Vec<ClusterGroup>,
    pub edges: Vec<SimilarityEdge>,
}

/// Classifier groups and optional held-out evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub model: String,
    pub extractor: String,
    pub label_count: usize,
    pub groups: Vec<LabelGroup>,
    /// Present on corpora at or above the large-corpus threshold
    pub evaluation: Option<ViewOutcome<HoldoutReport>>,
}

/// Headline numbers across views. `None` when the owning view failed or
/// did not produce the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub accuracy: Option<f64>,
    pub prediction_latency_secs: Option<f64>,
    pub edge_count: Option<usize>,
    pub group_count: Option<usize>,
    pub label_group_count: Option<usize>,
}

/// Complete output of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub dataset: DatasetSummary,
    pub patterns: ViewOutcome<PatternReport>,
    pub clusters: ViewOutcome<ClusterReport>,
    pub classification: ViewOutcome<ClassificationReport>,
    pub metrics: ReportMetrics,
}

impl AnalysisReport {
    pub(crate) fn assemble(
        dataset: DatasetSummary,
        patterns: ViewOutcome<PatternReport>,
        clusters: ViewOutcome<ClusterReport>,
        classification: ViewOutcome<ClassificationReport>,
    ) -> Self {
        let cluster = clusters.completed();
        let classified = classification.completed();
        let evaluation = classified
            .and_then(|c| c.evaluation.as_ref())
            .and_then(ViewOutcome::completed);

        let metrics = ReportMetrics {
            accuracy: evaluation.map(|e| e.accuracy),
            prediction_latency_secs: evaluation.map(|e| e.prediction_latency_secs),
            edge_count: cluster.map(|c| c.edge_count),
            group_count: cluster.map(|c| c.stats.group_count),
            label_group_count: classified.map(|c| c.groups.len()),
        };

        Self {
            dataset,
            patterns,
            clusters,
            classification,
            metrics,
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, FlowgroupError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of views that failed.
    pub fn failed_views(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if self.patterns.is_failed() {
            failed.push("patterns");
        }
        if self.clusters.is_failed() {
            failed.push("clusters");
        }
        if self.classification.is_failed() {
            failed.push("classification");
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_outcome_serializes_kind() {
        let outcome: ViewOutcome<ClusterGroup> = ViewOutcome::from_result(
            "classification",
            Err(FlowgroupError::InsufficientData { distinct_labels: 1 }),
        );
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["result"]["kind"], "insufficient_data");
        assert!(outcome.completed().is_none());
    }

    #[test]
    fn test_completed_outcome_roundtrip() {
        let outcome = ViewOutcome::Completed(DatasetSummary {
            processes: 3,
            total_steps: 9,
            longest_sequence: 4,
        });
        let json = serde_json::to_string(&outcome).unwrap();
        let back: ViewOutcome<DatasetSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}

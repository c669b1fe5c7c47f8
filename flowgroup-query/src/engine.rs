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

//! Analysis engine
//!
//! Runs the pattern, cluster and classifier views over one immutable
//! [`SequenceStore`]. The views share no state; a failure in one is
//! recorded in the report and the others still run.

use crate::report::{
    AnalysisReport, ClassificationReport, ClusterGroup, ClusterReport, DatasetSummary,
    PatternReport, ViewOutcome,
};
use flowgroup_core::{AnalysisConfig, Result, SequenceStore, TaskCode};
use flowgroup_evals::{evaluate_holdout, HoldoutReport, SequenceClassifier};
use flowgroup_index::{
    build_graph, common_subsequences, connected_components, ending_pattern_groups,
    exact_sequence_groups, starting_pattern_groups, Cluster, ClusterStats, PatternSummary,
    SimilarityGraph,
};
use std::collections::HashSet;
use std::time::Instant;

/// Configured entry point for a full analysis run.
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl AnalysisEngine {
    /// Create an engine, rejecting invalid configuration up front.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Exact, common-subsequence, prefix and suffix patterns.
    pub fn mine_patterns(&self, store: &SequenceStore) -> PatternReport {
        let patterns = &self.config.patterns;

        let exact = exact_sequence_groups(store);
        let subsequences = common_subsequences(store, patterns.min_subsequence_length);
        let prefixes = starting_pattern_groups(store, patterns.pattern_length);
        let suffixes = ending_pattern_groups(store, patterns.pattern_length);
        let summary = PatternSummary::from_tables(&exact, &subsequences, &prefixes, &suffixes);

        PatternReport {
            summary,
            exact_sequences: exact.shared().cloned().collect(),
            common_subsequences: subsequences.top(patterns.top_subsequences).to_vec(),
            starting_patterns: prefixes.shared().cloned().collect(),
            ending_patterns: suffixes.shared().cloned().collect(),
            pattern_length: patterns.pattern_length,
            min_subsequence_length: patterns.min_subsequence_length,
        }
    }

    /// Similarity graph at the configured threshold.
    ///
    /// Quadratic in the number of processes.
    pub fn similarity(&self, store: &SequenceStore) -> SimilarityGraph {
        build_graph(store, self.config.similarity.threshold)
    }

    /// Connected components of the similarity graph.
    pub fn cluster(&self, store: &SequenceStore) -> ClusterReport {
        let graph = self.similarity(store);
        let clusters = connected_components(&store.ids(), &graph.edges);
        let stats = ClusterStats::from_clusters(&clusters);

        ClusterReport {
            threshold: graph.threshold,
            edge_count: graph.edge_count(),
            stats,
            groups: clusters
                .into_iter()
                .map(|cluster| cluster_group(store, cluster))
                .collect(),
            edges: graph.edges,
        }
    }

    /// Train the configured classifier and group processes by prediction.
    ///
    /// Corpora at or above `large_corpus_threshold` also get a held-out
    /// evaluation; its failure is recorded without failing the view.
    pub fn classify(&self, store: &SequenceStore) -> Result<ClassificationReport> {
        let config = &self.config.classifier;
        let mut classifier = SequenceClassifier::from_config(config, store);
        let dataset = classifier.train(store)?.clone();
        let groups = classifier.group_by_prediction(store)?;

        let evaluation = (store.len() >= config.large_corpus_threshold).then(|| {
            ViewOutcome::from_result("evaluation", evaluate_holdout(&dataset, config))
        });

        Ok(ClassificationReport {
            model: classifier.model_name().to_string(),
            extractor: classifier.extractor_name().to_string(),
            label_count: dataset.distinct_labels(),
            groups,
            evaluation,
        })
    }

    /// Held-out evaluation regardless of corpus size.
    pub fn evaluate(&self, store: &SequenceStore) -> Result<HoldoutReport> {
        let mut classifier = SequenceClassifier::from_config(&self.config.classifier, store);
        classifier.evaluate(store, &self.config.classifier)
    }

    /// Run every view and aggregate the results.
    pub fn run(&self, store: &SequenceStore) -> AnalysisReport {
        let dataset = DatasetSummary {
            processes: store.len(),
            total_steps: store.total_steps(),
            longest_sequence: store.max_len(),
        };
        tracing::info!(processes = dataset.processes, "starting analysis");

        let started = Instant::now();
        let patterns = ViewOutcome::Completed(self.mine_patterns(store));
        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "pattern view finished");

        let started = Instant::now();
        let clusters = ViewOutcome::Completed(self.cluster(store));
        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "cluster view finished");

        let started = Instant::now();
        let classification = ViewOutcome::from_result("classification", self.classify(store));
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            failed = classification.is_failed(),
            "classification view finished"
        );

        AnalysisReport::assemble(dataset, patterns, clusters, classification)
    }
}

fn cluster_group(store: &SequenceStore, cluster: Cluster) -> ClusterGroup {
    ClusterGroup {
        shared_codes: shared_codes(store, &cluster.members),
        id: cluster.id,
        processes: cluster.members,
    }
}

fn shared_codes(store: &SequenceStore, members: &[String]) -> Vec<TaskCode> {
    let mut sequences = members.iter().filter_map(|id| store.sequence(id));
    let Some(first) = sequences.next() else {
        return Vec::new();
    };

    let mut common: HashSet<TaskCode> = first.iter().copied().collect();
    for sequence in sequences {
        let codes: HashSet<TaskCode> = sequence.iter().copied().collect();
        common.retain(|code| codes.contains(code));
    }

    let mut seen = HashSet::new();
    first
        .iter()
        .copied()
        .filter(|code| common.contains(code) && seen.insert(*code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AnalysisEngine {
        AnalysisEngine::new(AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_threshold_scenario() {
        let store = SequenceStore::from_pairs(vec![
            ("A", vec![1, 2, 3, 4]),
            ("B", vec![1, 2, 3, 4]),
            ("C", vec![1, 2, 5, 6]),
        ]);
        let report = engine().cluster(&store);

        assert_eq!(report.edge_count, 1);
        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].processes, vec!["A", "B"]);
        assert_eq!(report.groups[0].shared_codes, vec![1, 2, 3, 4]);
        assert_eq!(report.groups[1].processes, vec!["C"]);
    }

    #[test]
    fn test_pattern_view_uses_config() {
        let store = SequenceStore::from_pairs(vec![
            ("A", vec![1, 2, 3, 4, 5]),
            ("B", vec![1, 2, 3, 6, 7]),
        ]);
        let report = engine().mine_patterns(&store);

        assert_eq!(report.common_subsequences.len(), 1);
        assert_eq!(report.common_subsequences[0].pattern, vec![1, 2, 3]);
        assert_eq!(report.starting_patterns.len(), 1);
        assert_eq!(report.starting_patterns[0].processes, vec!["A", "B"]);
        // both suffixes are unique, so neither is listed
        assert!(report.ending_patterns.is_empty());
        assert_eq!(report.summary.shared_suffixes, 0);
        assert!(report.exact_sequences.is_empty());
        assert!(report.summary.all_sequences_unique());
    }

    #[test]
    fn test_shared_codes_keeps_first_member_order() {
        let store = SequenceStore::from_pairs(vec![("x", vec![4, 1, 4, 2]), ("y", vec![2, 4, 9])]);
        let members = vec!["x".to_string(), "y".to_string()];
        assert_eq!(shared_codes(&store, &members), vec![4, 2]);
        assert!(shared_codes(&store, &[]).is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalysisConfig::default();
        config.similarity.threshold = 1.5;
        assert!(AnalysisEngine::new(config).is_err());
    }
}

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

//! Plain-text rendering of reports.

use flowgroup_core::TaskCode;
use flowgroup_evals::{trim_padding, HoldoutReport};
use flowgroup_index::{PatternGroup, SimilarityGraph};
use flowgroup_query::{AnalysisReport, ViewOutcome};
use std::fmt::Write;

fn codes(codes: &[TaskCode]) -> String {
    let parts: Vec<String> = codes.iter().map(TaskCode::to_string).collect();
    format!("({})", parts.join(", "))
}

fn pattern_lines(out: &mut String, title: &str, groups: &[PatternGroup]) {
    let _ = writeln!(out, "{title}:");
    if groups.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for group in groups {
        let _ = writeln!(
            out,
            "  {} x{}: {}",
            codes(&group.pattern),
            group.occurrences(),
            group.processes.join(", ")
        );
    }
}

fn failed_line<T>(out: &mut String, view: &str, outcome: &ViewOutcome<T>) -> bool {
    if let ViewOutcome::Failed { kind, message } = outcome {
        let _ = writeln!(out, "{view}: FAILED [{kind}] {message}");
        return true;
    }
    false
}

pub fn report_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== Dataset ==\nprocesses: {}  steps: {}  longest: {}\n",
        report.dataset.processes, report.dataset.total_steps, report.dataset.longest_sequence
    );

    let _ = writeln!(out, "== Patterns ==");
    if !failed_line(&mut out, "patterns", &report.patterns) {
        if let Some(p) = report.patterns.completed() {
            let s = &p.summary;
            let _ = writeln!(
                out,
                "shared exact: {}  unique: {}  common subsequences: {}  shared prefixes: {}  shared suffixes: {}",
                s.shared_exact_sequences,
                s.unique_sequences,
                s.common_subsequences,
                s.shared_prefixes,
                s.shared_suffixes
            );
            pattern_lines(&mut out, "Identical sequences", &p.exact_sequences);
            pattern_lines(
                &mut out,
                &format!("Common subsequences (length >= {})", p.min_subsequence_length),
                &p.common_subsequences,
            );
            pattern_lines(
                &mut out,
                &format!("Starting patterns (length {})", p.pattern_length),
                &p.starting_patterns,
            );
            pattern_lines(
                &mut out,
                &format!("Ending patterns (length {})", p.pattern_length),
                &p.ending_patterns,
            );
        }
    }

    let _ = writeln!(out, "\n== Similarity clusters ==");
    if !failed_line(&mut out, "clusters", &report.clusters) {
        if let Some(c) = report.clusters.completed() {
            let _ = writeln!(
                out,
                "threshold: {:.2}  edges: {}  groups: {}  largest: {}  singletons: {}",
                c.threshold, c.edge_count, c.stats.group_count, c.stats.largest, c.stats.singletons
            );
            for group in &c.groups {
                let _ = writeln!(
                    out,
                    "  group {} [{}] shared {}: {}",
                    group.id,
                    group.processes.len(),
                    codes(&group.shared_codes),
                    group.processes.join(", ")
                );
            }
        }
    }

    let _ = writeln!(out, "\n== Classifier groups ==");
    if !failed_line(&mut out, "classification", &report.classification) {
        if let Some(c) = report.classification.completed() {
            let _ = writeln!(
                out,
                "model: {}  features: {}  labels: {}",
                c.model, c.extractor, c.label_count
            );
            for group in &c.groups {
                let _ = writeln!(
                    out,
                    "  label {} {}: {}",
                    group.label,
                    codes(trim_padding(&group.feature_vector)),
                    group.processes.join(", ")
                );
            }
            match &c.evaluation {
                Some(ViewOutcome::Completed(holdout)) => out.push_str(&holdout_text(holdout)),
                Some(failed) => {
                    failed_line(&mut out, "evaluation", failed);
                }
                None => {}
            }
        }
    }

    out
}

pub fn holdout_text(report: &HoldoutReport) -> String {
    format!(
        "Held-out evaluation ({})\n  accuracy: {:.4}\n  macro F1: {:.4}\n  prediction latency: {:.6}s\n  train/test: {}/{} (test fraction {:.2})\n  classes: {}  removed singleton processes: {}\n",
        report.model,
        report.accuracy,
        report.metrics.macro_f1,
        report.prediction_latency_secs,
        report.train_size,
        report.test_size,
        report.test_fraction,
        report.class_count,
        report.removed
    )
}

pub fn edges_text(graph: &SimilarityGraph) -> String {
    let mut out = format!(
        "# {} edges over {} processes at threshold {:.2}\n",
        graph.edge_count(),
        graph.node_count,
        graph.threshold
    );
    for edge in &graph.edges {
        let _ = writeln!(out, "{}\t{}\t{:.4}", edge.source, edge.target, edge.score);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgroup_core::{AnalysisConfig, SequenceStore};
    use flowgroup_query::AnalysisEngine;

    fn store() -> SequenceStore {
        SequenceStore::from_pairs(vec![
            ("A", vec![1, 2, 3, 4]),
            ("B", vec![1, 2, 3, 4]),
            ("C", vec![1, 2, 5, 6]),
        ])
    }

    #[test]
    fn test_report_text_sections() {
        let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
        let text = report_text(&engine.run(&store()));

        assert!(text.contains("== Patterns =="));
        assert!(text.contains("(1, 2, 3, 4) x2: A, B"));
        assert!(text.contains("group 1 [2]"));
        assert!(text.contains("model: decision_tree"));
    }

    #[test]
    fn test_failed_view_rendered() {
        let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
        let same = SequenceStore::from_pairs(vec![("x", vec![1]), ("y", vec![1])]);
        let text = report_text(&engine.run(&same));
        assert!(text.contains("classification: FAILED [insufficient_data]"));
        assert!(text.contains("== Similarity clusters =="));
    }

    #[test]
    fn test_edges_text() {
        let engine = AnalysisEngine::new(AnalysisConfig::default()).unwrap();
        let text = edges_text(&engine.similarity(&store()));
        assert!(text.starts_with("# 1 edges over 3 processes"));
        assert!(text.contains("A\tB\t1.0000"));
    }
}

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

//! Jaccard similarity graph over process sequences.
//!
//! Each sequence is treated as an unordered set of task codes. Every
//! unordered pair of processes is scored once and kept as an edge when its
//! score reaches the threshold.
//!
//! Building the graph is O(n²) in the number of processes. Pairs are scored
//! on the rayon pool; the collected edges are then stably sorted so the
//! output never depends on scheduling.

use flowgroup_core::{ProcessId, SequenceStore, TaskCode};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Jaccard similarity of two sequences taken as sets.
///
/// Order and repetition are ignored. Two empty sequences score 0.0.
pub fn jaccard(a: &[TaskCode], b: &[TaskCode]) -> f64 {
    CodeSet::new(a).jaccard(&CodeSet::new(b))
}

/// Sorted, de-duplicated task codes of one sequence.
#[derive(Debug, Clone)]
struct CodeSet(Vec<TaskCode>);

impl CodeSet {
    fn new(sequence: &[TaskCode]) -> Self {
        let mut codes = sequence.to_vec();
        codes.sort_unstable();
        codes.dedup();
        Self(codes)
    }

    fn intersection_len(&self, other: &CodeSet) -> usize {
        let (mut i, mut j, mut common) = (0, 0, 0);
        while i < self.0.len() && j < other.0.len() {
            match self.0[i].cmp(&other.0[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    common += 1;
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }

    fn jaccard(&self, other: &CodeSet) -> f64 {
        let intersection = self.intersection_len(other);
        let union = self.0.len() + other.0.len() - intersection;
        if union == 0 {
            0.0
        } else {
            intersection as f64 / union as f64
        }
    }
}

/// Unordered pair of processes with their similarity score.
///
/// `source` precedes `target` in store order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityEdge {
    pub source: ProcessId,
    pub target: ProcessId,
    pub score: f64,
}

impl SimilarityEdge {
    /// True if the edge joins `a` and `b` in either direction.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// Endpoint opposite to `id`, if `id` is an endpoint.
    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Edge list above a similarity threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityGraph {
    pub threshold: f64,
    pub node_count: usize,
    /// Sorted by descending score, ties in pair enumeration order
    pub edges: Vec<SimilarityEdge>,
}

impl SimilarityGraph {
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Edge between two processes, if present.
    pub fn edge(&self, a: &str, b: &str) -> Option<&SimilarityEdge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    /// Neighbours of a process, in edge order.
    pub fn neighbors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges.iter().filter_map(move |e| e.other(id))
    }
}

/// Score every unordered pair and keep edges with `score >= threshold`.
///
/// Pairs are enumerated as `(i, j)` with `i < j` in store order, so each
/// pair is evaluated exactly once and self-pairs never appear.
pub fn build_graph(store: &SequenceStore, threshold: f64) -> SimilarityGraph {
    let processes = store.processes();
    let sets: Vec<CodeSet> = processes
        .par_iter()
        .map(|p| CodeSet::new(&p.sequence))
        .collect();
    let n = sets.len();

    let mut scored: Vec<(usize, usize, f64)> = (0..n)
        .into_par_iter()
        .flat_map_iter(|i| {
            let sets = &sets;
            (i + 1..n).filter_map(move |j| {
                let score = sets[i].jaccard(&sets[j]);
                (score >= threshold).then_some((i, j, score))
            })
        })
        .collect();

    // stable: equal scores keep enumeration order
    scored.sort_by(|a, b| b.2.total_cmp(&a.2));

    let edges: Vec<SimilarityEdge> = scored
        .into_iter()
        .map(|(i, j, score)| SimilarityEdge {
            source: processes[i].id.clone(),
            target: processes[j].id.clone(),
            score,
        })
        .collect();

    tracing::debug!(
        nodes = n,
        pairs = n * n.saturating_sub(1) / 2,
        edges = edges.len(),
        threshold,
        "built similarity graph"
    );

    SimilarityGraph {
        threshold,
        node_count: n,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> SequenceStore {
        SequenceStore::from_pairs(vec![
            ("A", vec![1, 2, 3, 4]),
            ("B", vec![1, 2, 3, 4]),
            ("C", vec![1, 2, 5, 6]),
        ])
    }

    #[test]
    fn test_jaccard_values() {
        assert_eq!(jaccard(&[1, 2, 3, 4], &[1, 2, 3, 4]), 1.0);
        assert!((jaccard(&[1, 2, 3, 4], &[1, 2, 5, 6]) - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(jaccard(&[1, 1, 2], &[2, 1]), 1.0);
        assert_eq!(jaccard(&[], &[]), 0.0);
        assert_eq!(jaccard(&[1], &[]), 0.0);
        assert_eq!(jaccard(&[1, 2], &[3]), 0.0);
    }

    #[test]
    fn test_scenario_graph_at_0_6() {
        let graph = build_graph(&scenario(), 0.6);

        assert_eq!(graph.node_count, 3);
        assert_eq!(graph.edge_count(), 1);
        let edge = &graph.edges[0];
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("A", "B"));
        assert_eq!(edge.score, 1.0);
    }

    #[test]
    fn test_edges_sorted_with_stable_ties() {
        let graph = build_graph(&scenario(), 0.0);
        let pairs: Vec<(&str, &str)> = graph
            .edges
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();

        // (A,C) and (B,C) tie at 1/3 and keep enumeration order
        assert_eq!(pairs, vec![("A", "B"), ("A", "C"), ("B", "C")]);
    }

    #[test]
    fn test_neighbors_and_lookup() {
        let graph = build_graph(&scenario(), 0.3);
        let mut neighbors: Vec<&str> = graph.neighbors("C").collect();
        neighbors.sort();
        assert_eq!(neighbors, vec!["A", "B"]);
        assert!(graph.edge("B", "A").is_some());
        assert!(graph.edge("A", "A").is_none());
    }

    #[test]
    fn test_empty_and_single_store() {
        let graph = build_graph(&SequenceStore::default(), 0.5);
        assert!(graph.is_empty());

        let single = SequenceStore::from_pairs(vec![("solo", vec![1])]);
        assert!(build_graph(&single, 0.0).is_empty());
    }
}

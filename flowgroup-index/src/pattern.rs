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

//! Sequence pattern mining.
//!
//! Four pure functions over a [`SequenceStore`], each producing a
//! [`PatternTable`]:
//!
//! - [`exact_sequence_groups`]: identical full sequences
//! - [`common_subsequences`]: contiguous slices shared by several processes
//! - [`starting_pattern_groups`]: identical first-`k` codes
//! - [`ending_pattern_groups`]: identical last-`k` codes
//!
//! Tables list groups in first-seen order (store order), except
//! [`common_subsequences`] which is stably re-sorted by descending process
//! count.

use flowgroup_core::{Process, ProcessId, SequenceStore, TaskCode};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A fixed-length tuple of task codes.
pub type Pattern = Vec<TaskCode>;

/// Which miner produced a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    ExactSequence,
    Subsequence,
    Prefix,
    Suffix,
}

/// A pattern and the processes containing it, in store order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternGroup {
    pub pattern: Pattern,
    pub processes: Vec<ProcessId>,
}

impl PatternGroup {
    /// Number of processes containing the pattern.
    pub fn occurrences(&self) -> usize {
        self.processes.len()
    }

    /// True when more than one process shares the pattern.
    pub fn is_shared(&self) -> bool {
        self.processes.len() > 1
    }

    pub fn contains(&self, process: &str) -> bool {
        self.processes.iter().any(|p| p == process)
    }
}

/// Ordered pattern groups with lookup by pattern.
#[derive(Debug, Clone, Serialize)]
pub struct PatternTable {
    kind: PatternKind,
    groups: Vec<PatternGroup>,
    #[serde(skip)]
    index: HashMap<Pattern, usize>,
}

impl PatternTable {
    fn from_groups(kind: PatternKind, groups: Vec<PatternGroup>) -> Self {
        let index = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.pattern.clone(), i))
            .collect();
        Self {
            kind,
            groups,
            index,
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn groups(&self) -> &[PatternGroup] {
        &self.groups
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatternGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group for an exact pattern.
    pub fn get(&self, pattern: &[TaskCode]) -> Option<&PatternGroup> {
        self.index.get(pattern).map(|&i| &self.groups[i])
    }

    /// Groups shared by more than one process, in table order.
    pub fn shared(&self) -> impl Iterator<Item = &PatternGroup> {
        self.groups.iter().filter(|g| g.is_shared())
    }

    pub fn shared_count(&self) -> usize {
        self.shared().count()
    }

    /// Leading `n` groups.
    pub fn top(&self, n: usize) -> &[PatternGroup] {
        &self.groups[..n.min(self.groups.len())]
    }

    pub fn into_groups(self) -> Vec<PatternGroup> {
        self.groups
    }
}

/// Accumulates processes under patterns in first-seen order.
#[derive(Default)]
struct GroupAccumulator {
    groups: Vec<PatternGroup>,
    index: HashMap<Pattern, usize>,
}

impl GroupAccumulator {
    fn record(&mut self, pattern: &[TaskCode], process: &str) {
        match self.index.get(pattern) {
            Some(&slot) => self.groups[slot].processes.push(process.to_string()),
            None => {
                self.index.insert(pattern.to_vec(), self.groups.len());
                self.groups.push(PatternGroup {
                    pattern: pattern.to_vec(),
                    processes: vec![process.to_string()],
                });
            }
        }
    }

    fn finish(self, kind: PatternKind) -> PatternTable {
        PatternTable::from_groups(kind, self.groups)
    }
}

fn group_by_key<F>(store: &SequenceStore, kind: PatternKind, key: F) -> PatternTable
where
    F: Fn(&Process) -> Option<&[TaskCode]>,
{
    let mut acc = GroupAccumulator::default();
    for process in store {
        if let Some(pattern) = key(process) {
            acc.record(pattern, &process.id);
        }
    }
    acc.finish(kind)
}

/// Group processes whose full sequences are identical (order-sensitive).
///
/// Every process lands in exactly one group; use [`PatternTable::shared`]
/// for groups with more than one member.
pub fn exact_sequence_groups(store: &SequenceStore) -> PatternTable {
    group_by_key(store, PatternKind::ExactSequence, |p| {
        Some(p.sequence.as_slice())
    })
}

/// Group processes by their first `k` codes. Shorter processes are skipped.
pub fn starting_pattern_groups(store: &SequenceStore, k: usize) -> PatternTable {
    if k == 0 {
        return PatternTable::from_groups(PatternKind::Prefix, Vec::new());
    }
    group_by_key(store, PatternKind::Prefix, |p| p.prefix(k))
}

/// Group processes by their last `k` codes. Shorter processes are skipped.
pub fn ending_pattern_groups(store: &SequenceStore, k: usize) -> PatternTable {
    if k == 0 {
        return PatternTable::from_groups(PatternKind::Suffix, Vec::new());
    }
    group_by_key(store, PatternKind::Suffix, |p| p.suffix(k))
}

/// Distinct contiguous slices of `sequence` with length in
/// `min_length..=sequence.len()`, shortest first, then by start offset.
fn distinct_slices(sequence: &[TaskCode], min_length: usize) -> Vec<&[TaskCode]> {
    let mut seen: HashSet<&[TaskCode]> = HashSet::new();
    let mut slices = Vec::new();

    for length in min_length..=sequence.len() {
        for window in sequence.windows(length) {
            if seen.insert(window) {
                slices.push(window);
            }
        }
    }
    slices
}

/// Contiguous slices shared by more than one process.
///
/// For every process, every slice whose length runs from `min_length` up to
/// the full sequence length is recorded once for that process. Only slices
/// found in at least two processes are kept. The table is ordered by
/// descending process count with ties left in first-seen order.
///
/// A `min_length` of 0 is treated as 1.
pub fn common_subsequences(store: &SequenceStore, min_length: usize) -> PatternTable {
    let min_length = min_length.max(1);

    let per_process: Vec<Vec<&[TaskCode]>> = store
        .processes()
        .par_iter()
        .map(|p| distinct_slices(&p.sequence, min_length))
        .collect();

    let mut acc = GroupAccumulator::default();
    for (process, slices) in store.iter().zip(&per_process) {
        for slice in slices {
            acc.record(slice, &process.id);
        }
    }

    let candidates = acc.groups.len();
    let mut shared: Vec<PatternGroup> = acc.groups.into_iter().filter(|g| g.is_shared()).collect();
    shared.sort_by(|a, b| b.occurrences().cmp(&a.occurrences()));

    tracing::debug!(
        min_length,
        candidates,
        shared = shared.len(),
        "mined common subsequences"
    );

    PatternTable::from_groups(PatternKind::Subsequence, shared)
}

/// Headline counts over the four pattern tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    /// Exact-sequence groups with more than one process
    pub shared_exact_sequences: usize,
    /// Distinct processes that have no identical twin
    pub unique_sequences: usize,
    pub common_subsequences: usize,
    pub shared_prefixes: usize,
    pub shared_suffixes: usize,
}

impl PatternSummary {
    pub fn from_tables(
        exact: &PatternTable,
        subsequences: &PatternTable,
        prefixes: &PatternTable,
        suffixes: &PatternTable,
    ) -> Self {
        Self {
            shared_exact_sequences: exact.shared_count(),
            unique_sequences: exact.iter().filter(|g| !g.is_shared()).count(),
            common_subsequences: subsequences.shared_count(),
            shared_prefixes: prefixes.shared_count(),
            shared_suffixes: suffixes.shared_count(),
        }
    }

    /// True when every process has a distinct full sequence.
    pub fn all_sequences_unique(&self) -> bool {
        self.shared_exact_sequences == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(rows: Vec<(&str, Vec<TaskCode>)>) -> SequenceStore {
        SequenceStore::from_pairs(rows)
    }

    #[test]
    fn test_exact_groups_first_seen_order() {
        let s = store(vec![
            ("A", vec![1, 2, 3]),
            ("B", vec![3, 2, 1]),
            ("D", vec![1, 2, 3]),
            ("E", vec![]),
        ]);
        let table = exact_sequence_groups(&s);

        assert_eq!(table.len(), 3);
        assert_eq!(table.groups()[0].pattern, vec![1, 2, 3]);
        assert_eq!(table.groups()[0].processes, vec!["A", "D"]);
        assert_eq!(table.get(&[]).unwrap().processes, vec!["E"]);
        assert_eq!(table.shared_count(), 1);
    }

    #[test]
    fn test_common_subsequences_scenario() {
        let s = store(vec![("A", vec![1, 2, 3, 4, 5]), ("B", vec![1, 2, 3, 6, 7])]);
        let table = common_subsequences(&s, 3);

        let group = table.get(&[1, 2, 3]).expect("shared prefix slice");
        assert_eq!(group.processes, vec!["A", "B"]);
        assert!(table.iter().all(|g| g.pattern.len() < 4));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_repeated_slice_counts_process_once() {
        let s = store(vec![("A", vec![1, 2, 1, 2]), ("B", vec![9])]);
        let table = common_subsequences(&s, 2);
        assert!(table.is_empty());
    }

    #[test]
    fn test_subsequence_order_by_count_then_first_seen() {
        let s = store(vec![
            ("A", vec![7, 8, 1, 2]),
            ("B", vec![7, 8, 5, 1, 2]),
            ("C", vec![1, 2]),
        ]);
        let table = common_subsequences(&s, 2);
        let patterns: Vec<&Pattern> = table.iter().map(|g| &g.pattern).collect();

        // (1,2) is in three processes; (7,8) in two and first seen before it
        assert_eq!(patterns, vec![&vec![1, 2], &vec![7, 8]]);
        assert_eq!(table.top(1).len(), 1);
        assert_eq!(table.top(10).len(), 2);
    }

    #[test]
    fn test_zero_min_length_behaves_like_one() {
        let s = store(vec![("A", vec![4, 5]), ("B", vec![5])]);
        let table = common_subsequences(&s, 0);
        assert_eq!(table.get(&[5]).unwrap().processes, vec!["A", "B"]);
        assert!(table.get(&[]).is_none());
    }

    #[test]
    fn test_prefix_and_suffix_skip_short_processes() {
        let s = store(vec![
            ("A", vec![1, 2, 3, 9]),
            ("B", vec![1, 2, 3, 8, 9]),
            ("C", vec![1, 2]),
        ]);

        let starts = starting_pattern_groups(&s, 3);
        assert_eq!(starts.len(), 1);
        assert_eq!(starts.get(&[1, 2, 3]).unwrap().processes, vec!["A", "B"]);

        let ends = ending_pattern_groups(&s, 1);
        assert_eq!(ends.get(&[9]).unwrap().processes, vec!["A", "B"]);
        assert_eq!(ends.get(&[2]).unwrap().processes, vec!["C"]);

        assert!(starting_pattern_groups(&s, 0).is_empty());
        assert!(ending_pattern_groups(&s, 6).is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let s = store(vec![("A", vec![1, 2, 3]), ("B", vec![1, 2, 3]), ("C", vec![1, 5, 6])]);
        let summary = PatternSummary::from_tables(
            &exact_sequence_groups(&s),
            &common_subsequences(&s, 3),
            &starting_pattern_groups(&s, 1),
            &ending_pattern_groups(&s, 1),
        );

        assert_eq!(summary.shared_exact_sequences, 1);
        assert_eq!(summary.unique_sequences, 1);
        assert_eq!(summary.common_subsequences, 1);
        assert_eq!(summary.shared_prefixes, 1);
        assert_eq!(summary.shared_suffixes, 1);
        assert!(!summary.all_sequences_unique());
    }
}

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

//! Rare-label filtering and stratified train/test splitting.

use crate::labels::Label;
use flowgroup_core::{FlowgroupError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rows that survive rare-label filtering, with labels remapped to `1..=k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredLabels {
    /// Original row indices, ascending.
    pub rows: Vec<usize>,
    /// Remapped label per kept row.
    pub labels: Vec<Label>,
    /// Original label -> remapped label.
    pub mapping: BTreeMap<Label, Label>,
    /// Number of rows removed.
    pub removed: usize,
}

impl FilteredLabels {
    pub fn class_count(&self) -> usize {
        self.mapping.len()
    }
}

/// Drop rows whose label has fewer than `min_members` rows and remap the
/// rest to sequential labels in ascending order of the original label.
pub fn drop_rare_labels(labels: &[Label], min_members: usize) -> FilteredLabels {
    let mut counts: BTreeMap<Label, usize> = BTreeMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mapping: BTreeMap<Label, Label> = counts
        .iter()
        .filter(|(_, &count)| count >= min_members)
        .enumerate()
        .map(|(i, (&label, _))| (label, i + 1))
        .collect();

    let mut rows = Vec::new();
    let mut remapped = Vec::new();
    for (row, label) in labels.iter().enumerate() {
        if let Some(&new_label) = mapping.get(label) {
            rows.push(row);
            remapped.push(new_label);
        }
    }

    let removed = labels.len() - rows.len();
    if removed > 0 {
        tracing::debug!(
            removed,
            classes = mapping.len(),
            "dropped rows with rare labels"
        );
    }

    FilteredLabels {
        rows,
        labels: remapped,
        mapping,
        removed,
    }
}

/// Held-out fraction for `class_count` classes over `n_samples` rows:
/// large enough that each class can place one row in the test split.
pub fn test_fraction(min_fraction: f64, class_count: usize, n_samples: usize) -> f64 {
    if n_samples == 0 {
        return min_fraction;
    }
    min_fraction.max(class_count as f64 / n_samples as f64)
}

/// Row indices of a train/test partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Stratified split of row indices `0..labels.len()`.
///
/// Each class contributes `round(fraction * n_c)` rows to the test side,
/// clamped so both sides receive at least one row of every class. Classes
/// are visited in ascending label order with a single seeded shuffle stream.
/// Both index lists are returned sorted.
pub fn stratified_split(labels: &[Label], fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(FlowgroupError::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {fraction}"
        )));
    }

    let mut by_class: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (row, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(row);
    }

    if let Some((label, rows)) = by_class.iter().find(|(_, rows)| rows.len() < 2) {
        return Err(FlowgroupError::ShapeMismatch(format!(
            "label {label} has {} member(s); stratified splitting needs at least 2",
            rows.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(labels.len());
    let mut test = Vec::new();

    for rows in by_class.values_mut() {
        let n = rows.len();
        let n_test = ((fraction * n as f64).round() as usize).clamp(1, n - 1);
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..n_test]);
        train.extend_from_slice(&rows[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_drop_rare_labels_remaps_in_order() {
        let labels = vec![5, 2, 5, 9, 2, 7, 5];
        let filtered = drop_rare_labels(&labels, 2);

        assert_eq!(filtered.rows, vec![0, 1, 2, 4, 6]);
        assert_eq!(filtered.labels, vec![2, 1, 2, 1, 2]);
        assert_eq!(filtered.mapping.get(&2), Some(&1));
        assert_eq!(filtered.mapping.get(&5), Some(&2));
        assert_eq!(filtered.removed, 2);
        assert_eq!(filtered.class_count(), 2);
    }

    #[test]
    fn test_fraction_grows_with_classes() {
        assert_eq!(test_fraction(0.3, 3, 100), 0.3);
        assert_eq!(test_fraction(0.3, 12, 20), 0.6);
        assert_eq!(test_fraction(0.3, 0, 0), 0.3);
    }

    #[test]
    fn test_every_class_on_both_sides() {
        let labels = vec![1, 1, 2, 2, 2, 2, 2, 2, 2, 2, 3, 3, 3];
        let split = stratified_split(&labels, 0.3, 42).unwrap();

        let train: HashSet<Label> = split.train.iter().map(|&r| labels[r]).collect();
        let test: HashSet<Label> = split.test.iter().map(|&r| labels[r]).collect();
        assert_eq!(train.len(), 3);
        assert_eq!(test.len(), 3);

        // 1 of 2, round(2.4) of 8, round(0.9) of 3
        assert_eq!(split.test.len(), 1 + 2 + 1);
        assert_eq!(split.train.len() + split.test.len(), labels.len());
        assert!(split.test.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_split_is_seeded() {
        let labels: Vec<Label> = (0..40).map(|i| i % 4 + 1).collect();
        let a = stratified_split(&labels, 0.25, 9).unwrap();
        let b = stratified_split(&labels, 0.25, 9).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_split_rejects_bad_input() {
        assert!(stratified_split(&[1, 1, 2], 0.3, 0).is_err());
        assert!(stratified_split(&[1, 1, 2, 2], 1.0, 0).is_err());
        assert!(stratified_split(&[1, 1, 2, 2], 0.0, 0).is_err());
    }
}

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

//! Feature extraction from task sequences.
//!
//! A feature vector is a fixed-length list of integer codes. Keeping the
//! vector integral lets it double as the canonical key of its label.

use flowgroup_core::{ClassifierConfig, FeatureKind, SequenceStore, TaskCode};

/// Padding value for positions past the end of a sequence.
pub const PAD: TaskCode = 0;

/// Maps a raw sequence to a fixed-length feature vector.
pub trait FeatureExtractor: Send + Sync {
    fn extract(&self, sequence: &[TaskCode]) -> Vec<TaskCode>;

    /// Short name used in reports.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> FeatureExtractor for F
where
    F: Fn(&[TaskCode]) -> Vec<TaskCode> + Send + Sync,
{
    fn extract(&self, sequence: &[TaskCode]) -> Vec<TaskCode> {
        self(sequence)
    }
}

/// First `k` codes sorted ascending, zero-padded to `k`.
///
/// Groups processes that open with the same set of tasks regardless of the
/// order those tasks were performed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortedPrefix {
    pub k: usize,
}

impl SortedPrefix {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl FeatureExtractor for SortedPrefix {
    fn extract(&self, sequence: &[TaskCode]) -> Vec<TaskCode> {
        let take = self.k.min(sequence.len());
        let mut features = sequence[..take].to_vec();
        features.sort_unstable();
        features.resize(self.k, PAD);
        features
    }

    fn name(&self) -> &str {
        "sorted_prefix"
    }
}

/// Whole sequence zero-padded (or truncated) to `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaddedSequence {
    pub width: usize,
}

impl PaddedSequence {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Width set to the longest sequence in the store.
    pub fn for_store(store: &SequenceStore) -> Self {
        Self::new(store.max_len())
    }
}

impl FeatureExtractor for PaddedSequence {
    fn extract(&self, sequence: &[TaskCode]) -> Vec<TaskCode> {
        let mut features: Vec<TaskCode> = sequence.iter().take(self.width).copied().collect();
        features.resize(self.width, PAD);
        features
    }

    fn name(&self) -> &str {
        "padded_sequence"
    }
}

/// Extractor selected by configuration, sized for `store`.
pub fn extractor_for(config: &ClassifierConfig, store: &SequenceStore) -> Box<dyn FeatureExtractor> {
    match config.features {
        FeatureKind::PaddedSequence => Box::new(PaddedSequence::for_store(store)),
        FeatureKind::SortedPrefix => Box::new(SortedPrefix::new(config.prefix_length)),
    }
}

/// Feature vector with trailing padding removed, for display.
pub fn trim_padding(features: &[TaskCode]) -> &[TaskCode] {
    let end = features
        .iter()
        .rposition(|&code| code != PAD)
        .map_or(0, |i| i + 1);
    &features[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_prefix() {
        let extractor = SortedPrefix::new(4);
        assert_eq!(extractor.extract(&[254, 165, 256, 173, 255]), vec![165, 173, 254, 256]);
        assert_eq!(extractor.extract(&[9, 3]), vec![3, 9, 0, 0]);
        assert_eq!(extractor.extract(&[]), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_padded_sequence() {
        let store = SequenceStore::from_pairs(vec![("a", vec![1, 2, 3]), ("b", vec![4])]);
        let extractor = PaddedSequence::for_store(&store);

        assert_eq!(extractor.width, 3);
        assert_eq!(extractor.extract(&[4]), vec![4, 0, 0]);
        assert_eq!(extractor.extract(&[1, 2, 3, 4]), vec![1, 2, 3]);
    }

    #[test]
    fn test_closure_extractor() {
        let last = |seq: &[TaskCode]| vec![seq.last().copied().unwrap_or(PAD)];
        assert_eq!(last.extract(&[5, 6]), vec![6]);
        assert_eq!(last.name(), "custom");
    }

    #[test]
    fn test_extractor_for_config() {
        let store = SequenceStore::from_pairs(vec![("a", vec![1, 2, 3, 4, 5, 6])]);
        let mut config = ClassifierConfig::default();
        assert_eq!(extractor_for(&config, &store).extract(&[7]).len(), 6);

        config.features = FeatureKind::SortedPrefix;
        config.prefix_length = 2;
        let extractor = extractor_for(&config, &store);
        assert_eq!(extractor.name(), "sorted_prefix");
        assert_eq!(extractor.extract(&[3, 1, 2]), vec![1, 3]);
    }

    #[test]
    fn test_trim_padding() {
        assert_eq!(trim_padding(&[1, 2, 0, 0]), &[1, 2]);
        assert_eq!(trim_padding(&[0, 0]), &[] as &[TaskCode]);
        assert_eq!(trim_padding(&[3]), &[3]);
    }
}

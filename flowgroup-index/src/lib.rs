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

//! Flowgroup Index Layer
//!
//! Structural views over a [`flowgroup_core::SequenceStore`]:
//!
//! - **Patterns** (`pattern`): exact sequences, shared contiguous
//!   subsequences, shared prefixes and suffixes.
//! - **Similarity** (`similarity`): Jaccard scores between task-code sets and
//!   the thresholded edge list.
//! - **Clusters** (`cluster`): breadth-first connected components over that
//!   edge list, partitioning every process into exactly one group.
//!
//! All functions are pure. Parallel sections re-establish a deterministic
//! order before returning.

pub mod cluster;
pub mod pattern;
pub mod similarity;

pub use cluster::{connected_components, Cluster, ClusterStats};
pub use pattern::{
    common_subsequences, ending_pattern_groups, exact_sequence_groups, starting_pattern_groups,
    Pattern, PatternGroup, PatternKind, PatternSummary, PatternTable,
};
pub use similarity::{build_graph, jaccard, SimilarityEdge, SimilarityGraph};

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

//! Connected components over a similarity edge list.

use crate::similarity::SimilarityEdge;
use flowgroup_core::ProcessId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

/// One connected component. `id` is 1-based in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    /// Members in input order
    pub members: Vec<ProcessId>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.members.len() == 1
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// Partition `ids` into connected components of the undirected graph `edges`.
///
/// Breadth-first traversal starts from each unvisited id in input order, so
/// component numbering is deterministic for a given ordering and edge set.
/// Isolated ids become singleton components. Repeated ids are collapsed to
/// their first occurrence and edges naming unknown ids are skipped.
pub fn connected_components<S: AsRef<str>>(ids: &[S], edges: &[SimilarityEdge]) -> Vec<Cluster> {
    let mut nodes: Vec<&str> = Vec::with_capacity(ids.len());
    let mut position: HashMap<&str, usize> = HashMap::with_capacity(ids.len());
    for id in ids {
        let id = id.as_ref();
        if !position.contains_key(id) {
            position.insert(id, nodes.len());
            nodes.push(id);
        }
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut skipped = 0usize;
    for edge in edges {
        match (
            position.get(edge.source.as_str()),
            position.get(edge.target.as_str()),
        ) {
            (Some(&a), Some(&b)) => {
                adjacency[a].push(b);
                adjacency[b].push(a);
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::warn!(skipped, "ignored edges naming unknown process ids");
    }

    let mut visited = vec![false; nodes.len()];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..nodes.len() {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            component.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        component.sort_unstable();
        clusters.push(Cluster {
            id: clusters.len() + 1,
            members: component.into_iter().map(|i| nodes[i].to_string()).collect(),
        });
    }

    tracing::debug!(
        nodes = nodes.len(),
        groups = clusters.len(),
        "computed connected components"
    );

    clusters
}

/// Size statistics over a partition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterStats {
    pub group_count: usize,
    pub sizes: Vec<usize>,
    pub largest: usize,
    pub singletons: usize,
}

impl ClusterStats {
    pub fn from_clusters(clusters: &[Cluster]) -> Self {
        let sizes: Vec<usize> = clusters.iter().map(Cluster::len).collect();
        Self {
            group_count: clusters.len(),
            largest: sizes.iter().copied().max().unwrap_or(0),
            singletons: sizes.iter().filter(|&&s| s == 1).count(),
            sizes,
        }
    }

    /// Total number of processes covered.
    pub fn covered(&self) -> usize {
        self.sizes.iter().sum()
    }
}

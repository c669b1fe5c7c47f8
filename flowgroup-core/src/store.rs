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

//! Immutable, order-preserving store of process sequences for one analysis run.
//!
//! The store keeps processes in the order they were supplied. Every derived
//! view (pattern tables, similarity graph, components, labels) iterates the
//! store in that order, which is what makes their output deterministic.

use crate::process::{Process, ProcessId, TaskCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ordered mapping from process id to task sequence.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Process>", into = "Vec<Process>")]
pub struct SequenceStore {
    processes: Vec<Process>,
    by_id: HashMap<ProcessId, usize>,
}

impl SequenceStore {
    /// Build a store from `(id, sequence)` pairs.
    ///
    /// A repeated id replaces the earlier sequence but keeps the position of
    /// its first occurrence.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<TaskCode>)>,
        S: Into<ProcessId>,
    {
        let mut processes: Vec<Process> = Vec::new();
        let mut by_id: HashMap<ProcessId, usize> = HashMap::new();

        for (id, sequence) in pairs {
            let id = id.into();
            match by_id.get(&id) {
                Some(&slot) => {
                    tracing::warn!(process = %id, "duplicate process id, keeping latest sequence");
                    processes[slot].sequence = sequence;
                }
                None => {
                    by_id.insert(id.clone(), processes.len());
                    processes.push(Process { id, sequence });
                }
            }
        }

        Self { processes, by_id }
    }

    /// Number of processes.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    /// True when the store holds no processes.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Processes in input order.
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    /// Iterate processes in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, Process> {
        self.processes.iter()
    }

    /// Process ids in input order.
    pub fn ids(&self) -> Vec<ProcessId> {
        self.processes.iter().map(|p| p.id.clone()).collect()
    }

    /// Look up a process by id.
    pub fn get(&self, id: &str) -> Option<&Process> {
        self.by_id.get(id).map(|&i| &self.processes[i])
    }

    /// Sequence of a process by id.
    pub fn sequence(&self, id: &str) -> Option<&[TaskCode]> {
        self.get(id).map(|p| p.sequence.as_slice())
    }

    /// Position of a process in input order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// True if the id is present.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Length of the longest sequence (0 for an empty store).
    pub fn max_len(&self) -> usize {
        self.processes.iter().map(Process::len).max().unwrap_or(0)
    }

    /// Total number of task steps across all processes.
    pub fn total_steps(&self) -> usize {
        self.processes.iter().map(Process::len).sum()
    }
}

impl<'a> IntoIterator for &'a SequenceStore {
    type Item = &'a Process;
    type IntoIter = std::slice::Iter<'a, Process>;

    fn into_iter(self) -> Self::IntoIter {
        self.processes.iter()
    }
}

impl From<Vec<Process>> for SequenceStore {
    fn from(processes: Vec<Process>) -> Self {
        Self::from_pairs(processes.into_iter().map(|p| (p.id, p.sequence)))
    }
}

impl From<SequenceStore> for Vec<Process> {
    fn from(store: SequenceStore) -> Self {
        store.processes
    }
}

impl<S: Into<ProcessId>> FromIterator<(S, Vec<TaskCode>)> for SequenceStore {
    fn from_iter<T: IntoIterator<Item = (S, Vec<TaskCode>)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

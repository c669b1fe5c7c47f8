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

//! Process and task code types.

use serde::{Deserialize, Serialize};

/// Opaque integer naming a form or task step (a BPMN `formKey`).
pub type TaskCode = i64;

/// Process identifier, usually the process definition file name.
pub type ProcessId = String;

/// One process instance: an identifier and its ordered task sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Process {
    /// Process identifier
    pub id: ProcessId,
    /// Ordered task codes
    pub sequence: Vec<TaskCode>,
}

impl Process {
    /// Create a new process.
    pub fn new(id: impl Into<ProcessId>, sequence: Vec<TaskCode>) -> Self {
        Self {
            id: id.into(),
            sequence,
        }
    }

    /// Number of task steps.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// True when the process has no task steps.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// First `k` codes, or `None` when the process is shorter than `k`.
    pub fn prefix(&self, k: usize) -> Option<&[TaskCode]> {
        self.sequence.get(..k)
    }

    /// Last `k` codes, or `None` when the process is shorter than `k`.
    pub fn suffix(&self, k: usize) -> Option<&[TaskCode]> {
        let start = self.sequence.len().checked_sub(k)?;
        Some(&self.sequence[start..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_suffix() {
        let p = Process::new("p1", vec![165, 173, 252, 253]);
        assert_eq!(p.prefix(2), Some(&[165, 173][..]));
        assert_eq!(p.suffix(2), Some(&[252, 253][..]));
        assert_eq!(p.prefix(4), Some(&p.sequence[..]));
        assert_eq!(p.prefix(5), None);
        assert_eq!(p.suffix(5), None);
        assert_eq!(p.suffix(0), Some(&[][..]));
    }
}

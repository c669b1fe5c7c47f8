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

//! Integration tests for dataset loading

use flowgroup_core::{load_csv_path, load_csv_str, DatasetFormat, FlowgroupError};
use std::io::Write;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fixtures")
        .join(name)
}

/// Test loading the ten-process sample dataset
#[test]
fn test_load_sample_fixture() {
    let store = load_csv_path(fixture("bpmn_shared_prefix.csv"), &DatasetFormat::csv()).unwrap();

    assert_eq!(store.len(), 10);
    assert_eq!(store.ids()[0], "Process 1-163.bpmn20.xml");
    assert_eq!(store.ids()[9], "Process 10-263.bpmn20.xml");
    assert_eq!(
        store.sequence("Process 6-261.bpmn20.xml"),
        Some(&[165, 173, 252, 253, 255][..])
    );
    assert_eq!(store.max_len(), 5);
}

/// Test rows of different lengths in the generated corpus
#[test]
fn test_load_ragged_fixture() {
    let store = load_csv_path(fixture("generated_processes.csv"), &DatasetFormat::csv()).unwrap();

    assert_eq!(store.len(), 152);
    assert_eq!(store.max_len(), 7);
    assert_eq!(store.sequence("Process-152"), Some(&[195, 196][..]));
}

/// Test that a malformed row anywhere fails the whole file load
#[test]
fn test_malformed_file_fails_whole_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "process,codes").unwrap();
    writeln!(file, "P1,1,2,3").unwrap();
    writeln!(file, "P2,4,5.5").unwrap();
    file.flush().unwrap();

    let result = load_csv_path(file.path(), &DatasetFormat::csv());
    assert!(matches!(
        result,
        Err(FlowgroupError::DataFormat { line: 3, column: 3, .. })
    ));
}

/// Test that a missing file surfaces as an IO error
#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_csv_path(dir.path().join("nope.csv"), &DatasetFormat::csv());
    assert!(matches!(result, Err(FlowgroupError::Io(_))));
}

/// Test that loading is deterministic for identical input
#[test]
fn test_repeated_loads_are_identical() {
    let text = std::fs::read_to_string(fixture("bpmn_reordered.csv")).unwrap();
    let a = load_csv_str(&text, &DatasetFormat::csv()).unwrap();
    let b = load_csv_str(&text, &DatasetFormat::csv()).unwrap();
    assert_eq!(a.processes(), b.processes());
}

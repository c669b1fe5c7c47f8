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

//! Delimited dataset loading.
//!
//! Rows have the shape `process_id, code_1, code_2, ..., code_n`. Rows may
//! differ in length and blank lines are skipped. Fields may be double-quoted
//! so an id can contain the delimiter. Any field that does not
//! parse as an integer aborts the whole load; no partial store is returned.

use crate::error::{FlowgroupError, Result};
use crate::process::{ProcessId, TaskCode};
use crate::store::SequenceStore;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Layout of a delimited dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetFormat {
    /// Field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Skip the first non-blank line
    #[serde(default = "default_has_header")]
    pub has_header: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_has_header() -> bool {
    true
}

impl Default for DatasetFormat {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: default_has_header(),
        }
    }
}

impl DatasetFormat {
    /// Comma separated with a header row.
    pub fn csv() -> Self {
        Self::default()
    }

    /// Set the delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether the first row is a header.
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }
}

/// Parse dataset text into a store.
pub fn load_csv_str(text: &str, format: &DatasetFormat) -> Result<SequenceStore> {
    load_csv_reader(text.as_bytes(), format)
}

/// Read a dataset file into a store.
pub fn load_csv_path<P: AsRef<Path>>(path: P, format: &DatasetFormat) -> Result<SequenceStore> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let store = load_csv_reader(BufReader::new(file), format)?;
    tracing::info!(
        path = %path.display(),
        processes = store.len(),
        steps = store.total_steps(),
        "loaded process dataset"
    );
    Ok(store)
}

/// Parse rows from any buffered reader.
pub fn load_csv_reader<R: BufRead>(reader: R, format: &DatasetFormat) -> Result<SequenceStore> {
    let mut rows: Vec<(ProcessId, Vec<TaskCode>)> = Vec::new();
    let mut header_pending = format.has_header;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;

        if line.trim().is_empty() {
            continue;
        }
        if header_pending {
            header_pending = false;
            continue;
        }

        rows.push(parse_row(&line, line_no, format.delimiter)?);
    }

    tracing::debug!(rows = rows.len(), "parsed dataset rows");
    Ok(SequenceStore::from_pairs(rows))
}

fn parse_row(line: &str, line_no: usize, delimiter: char) -> Result<(ProcessId, Vec<TaskCode>)> {
    let mut fields = split_fields(line, delimiter).into_iter();

    // split_fields always yields at least one item
    let id = fields.next().unwrap_or_default().trim().to_string();

    let codes = fields
        .enumerate()
        .map(|(i, raw)| {
            let field = raw.trim();
            field
                .parse::<TaskCode>()
                .map_err(|e| FlowgroupError::DataFormat {
                    line: line_no,
                    column: i + 2,
                    value: field.to_string(),
                    reason: e.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((id, codes))
}

/// Split one row on `delimiter`, honouring double-quoted fields.
///
/// A quoted field may contain the delimiter and `""` for a literal quote.
/// Quoted fields cannot span lines.
fn split_fields(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_header_and_blank_lines() {
        let text = "process,f1,f2,f3\nP1,1,2,3\n\nP2, 4 ,5\n";
        let store = load_csv_str(text, &DatasetFormat::csv()).unwrap();

        assert_eq!(store.ids(), vec!["P1", "P2"]);
        assert_eq!(store.sequence("P1"), Some(&[1, 2, 3][..]));
        assert_eq!(store.sequence("P2"), Some(&[4, 5][..]));
    }

    #[test]
    fn test_id_only_row_is_empty_sequence() {
        let text = "P1\nP2,7\n";
        let store = load_csv_str(text, &DatasetFormat::csv().with_header(false)).unwrap();
        assert_eq!(store.sequence("P1"), Some(&[][..]));
        assert_eq!(store.sequence("P2"), Some(&[7][..]));
    }

    #[test]
    fn test_malformed_field_aborts_load() {
        let text = "header\nP1,1,2\nP2,3,abc\nP3,4\n";
        let err = load_csv_str(text, &DatasetFormat::csv()).unwrap_err();

        match err {
            FlowgroupError::DataFormat {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_trailing_delimiter_is_malformed() {
        let text = "P1,1,2,\n";
        let err = load_csv_str(text, &DatasetFormat::csv().with_header(false)).unwrap_err();
        assert_eq!(err.kind(), "data_format");
    }

    #[test]
    fn test_custom_delimiter() {
        let text = "\"Process 1\";10;20\n";
        let format = DatasetFormat::csv().with_delimiter(';').with_header(false);
        let store = load_csv_str(text, &format).unwrap();
        assert_eq!(store.sequence("Process 1"), Some(&[10, 20][..]));
    }

    #[test]
    fn test_quoted_id_may_contain_delimiter() {
        let text = "process,f1,f2\n\"Invoice, EU\",1,2\nP2,3,4\n";
        let store = load_csv_str(text, &DatasetFormat::csv()).unwrap();

        assert_eq!(store.ids(), vec!["Invoice, EU", "P2"]);
        assert_eq!(store.sequence("Invoice, EU"), Some(&[1, 2][..]));
    }

    #[test]
    fn test_split_fields_quoting() {
        assert_eq!(split_fields("a,b", ','), vec!["a", "b"]);
        assert_eq!(split_fields("\"say \"\"hi\"\"\",\"7\"", ','), vec!["say \"hi\"", "7"]);
        assert_eq!(split_fields("\"x;y\";1", ';'), vec!["x;y", "1"]);
        assert_eq!(split_fields("", ','), vec![""]);
    }
}

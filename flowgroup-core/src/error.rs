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

//! Error types shared by every flowgroup crate

use crate::process::TaskCode;
use thiserror::Error;

/// Result type for flowgroup operations
pub type Result<T> = std::result::Result<T, FlowgroupError>;

/// Errors that can occur while loading or analysing a process dataset
#[derive(Debug, Error)]
pub enum FlowgroupError {
    /// A dataset row could not be parsed. The whole load is aborted.
    #[error("Data format error at line {line}, column {column}: {value:?} ({reason})")]
    DataFormat {
        /// 1-based line number in the source text
        line: usize,
        /// 1-based field index within the row
        column: usize,
        /// Raw field content
        value: String,
        /// Parser message
        reason: String,
    },

    /// Fewer than two distinct classes are available for classification
    #[error("Insufficient data: classification needs at least 2 distinct labels, found {distinct_labels}")]
    InsufficientData { distinct_labels: usize },

    /// A classifier was asked to predict before it was fitted
    #[error("Classifier has not been fitted")]
    NotFitted,

    /// Feature matrix and label vector disagree in shape
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Task code too large to use as a numeric feature
    #[error("Task code {0} is outside the exact numeric feature range")]
    CodeOutOfRange(TaskCode),

    /// Configuration error
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlowgroupError {
    /// Short machine-readable name of the error kind, used in reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowgroupError::DataFormat { .. } => "data_format",
            FlowgroupError::InsufficientData { .. } => "insufficient_data",
            FlowgroupError::NotFitted => "not_fitted",
            FlowgroupError::ShapeMismatch(_) => "shape_mismatch",
            FlowgroupError::CodeOutOfRange(_) => "code_out_of_range",
            FlowgroupError::InvalidConfig(_) => "invalid_config",
            FlowgroupError::Serialization(_) => "serialization",
            FlowgroupError::Io(_) => "io",
        }
    }
}

impl From<serde_json::Error> for FlowgroupError {
    fn from(e: serde_json::Error) -> Self {
        FlowgroupError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for FlowgroupError {
    fn from(e: toml::de::Error) -> Self {
        FlowgroupError::InvalidConfig(e.to_string())
    }
}

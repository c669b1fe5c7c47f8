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

//! Flowgroup Core
//!
//! Process sequence types, the immutable [`SequenceStore`], delimited dataset
//! loading, configuration and the shared error type.

pub mod config;
pub mod dataset;
pub mod error;
pub mod process;
pub mod store;

pub use config::{
    AnalysisConfig, ClassifierConfig, FeatureKind, ModelKind, PatternConfig, SimilarityConfig,
};
pub use dataset::{load_csv_path, load_csv_reader, load_csv_str, DatasetFormat};
pub use error::{FlowgroupError, Result};
pub use process::{Process, ProcessId, TaskCode};
pub use store::SequenceStore;

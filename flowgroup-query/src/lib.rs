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

//! Flowgroup Analysis Engine
//!
//! High-level API for analysing one process dataset: pattern tables,
//! similarity clusters and classifier groups, aggregated into a single
//! serializable [`AnalysisReport`].

pub mod engine;
pub mod report;

pub use engine::AnalysisEngine;
pub use report::{
    AnalysisReport, ClassificationReport, ClusterGroup, ClusterReport, DatasetSummary,
    PatternReport, ReportMetrics, ViewOutcome,
};

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

//! Analysis configuration
//!
//! Loaded from TOML with priority: environment > file > defaults. The CLI
//! applies its flags on top of the loaded value.

use crate::dataset::DatasetFormat;
use crate::error::{FlowgroupError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Top-level configuration for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub dataset: DatasetFormat,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Shortest contiguous slice considered by subsequence mining
    #[serde(default = "default_min_subsequence_length")]
    pub min_subsequence_length: usize,

    /// Number of leading/trailing codes compared for prefix and suffix groups
    #[serde(default = "default_pattern_length")]
    pub pattern_length: usize,

    /// How many subsequences the report lists
    #[serde(default = "default_top_subsequences")]
    pub top_subsequences: usize,
}

fn default_min_subsequence_length() -> usize {
    3
}

fn default_pattern_length() -> usize {
    3
}

fn default_top_subsequences() -> usize {
    10
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_subsequence_length: default_min_subsequence_length(),
            pattern_length: default_pattern_length(),
            top_subsequences: default_top_subsequences(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Minimum Jaccard score for an edge
    #[serde(default = "default_similarity_threshold")]
    pub threshold: f64,
}

fn default_similarity_threshold() -> f64 {
    0.6
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: default_similarity_threshold(),
        }
    }
}

/// Which classifier family to train
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Single decision tree
    Tree,
    /// Bagged forest of decision trees
    Forest,
    /// Tree below `large_corpus_threshold` samples, forest at or above it
    #[default]
    Auto,
}

impl FromStr for ModelKind {
    type Err = FlowgroupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" | "decision_tree" => Ok(ModelKind::Tree),
            "forest" | "random_forest" => Ok(ModelKind::Forest),
            "auto" => Ok(ModelKind::Auto),
            other => Err(FlowgroupError::InvalidConfig(format!(
                "unknown model kind: {other}"
            ))),
        }
    }
}

/// How a raw sequence becomes a feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Whole sequence zero-padded to the longest sequence in the dataset
    #[default]
    PaddedSequence,
    /// First `prefix_length` codes, sorted ascending
    SortedPrefix,
}

impl FromStr for FeatureKind {
    type Err = FlowgroupError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "padded_sequence" | "padded" => Ok(FeatureKind::PaddedSequence),
            "sorted_prefix" | "prefix" => Ok(FeatureKind::SortedPrefix),
            other => Err(FlowgroupError::InvalidConfig(format!(
                "unknown feature kind: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub model: ModelKind,

    #[serde(default)]
    pub features: FeatureKind,

    /// Codes used by the sorted-prefix extractor
    #[serde(default = "default_prefix_length")]
    pub prefix_length: usize,

    /// Trees in a forest
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    /// Depth limit for every tree (None = grow until pure)
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Seed for bootstrap sampling and the held-out split
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Lower bound of the held-out fraction
    #[serde(default = "default_min_test_fraction")]
    pub min_test_fraction: f64,

    /// Sample count at which `auto` switches from tree to forest
    #[serde(default = "default_large_corpus_threshold")]
    pub large_corpus_threshold: usize,
}

fn default_prefix_length() -> usize {
    4
}

fn default_n_estimators() -> usize {
    100
}

fn default_seed() -> u64 {
    42
}

fn default_min_test_fraction() -> f64 {
    0.3
}

fn default_large_corpus_threshold() -> usize {
    100
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::default(),
            features: FeatureKind::default(),
            prefix_length: default_prefix_length(),
            n_estimators: default_n_estimators(),
            max_depth: None,
            seed: default_seed(),
            min_test_fraction: default_min_test_fraction(),
            large_corpus_threshold: default_large_corpus_threshold(),
        }
    }
}

const ENV_THRESHOLD: &str = "FLOWGROUP_SIMILARITY_THRESHOLD";
const ENV_MIN_LENGTH: &str = "FLOWGROUP_MIN_SUBSEQUENCE_LENGTH";
const ENV_PATTERN_LENGTH: &str = "FLOWGROUP_PATTERN_LENGTH";
const ENV_MODEL: &str = "FLOWGROUP_MODEL";
const ENV_SEED: &str = "FLOWGROUP_SEED";

impl AnalysisConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(config_file, |key| std::env::var(key).ok())
    }

    /// [`AnalysisConfig::load`] with an injected environment lookup.
    pub fn load_with_env<F>(config_file: Option<PathBuf>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match config_file {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            }
            Some(path) => {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
            None => Self::default(),
        };

        let config = config.merge_with_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. Only variables that are set take effect.
    ///
    /// The lookup is injected so tests do not touch the process environment.
    pub fn merge_with_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_THRESHOLD) {
            self.similarity.threshold = parse_env(ENV_THRESHOLD, &value)?;
        }
        if let Some(value) = lookup(ENV_MIN_LENGTH) {
            self.patterns.min_subsequence_length = parse_env(ENV_MIN_LENGTH, &value)?;
        }
        if let Some(value) = lookup(ENV_PATTERN_LENGTH) {
            self.patterns.pattern_length = parse_env(ENV_PATTERN_LENGTH, &value)?;
        }
        if let Some(value) = lookup(ENV_MODEL) {
            self.classifier.model = value.parse()?;
        }
        if let Some(value) = lookup(ENV_SEED) {
            self.classifier.seed = parse_env(ENV_SEED, &value)?;
        }
        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let threshold = self.similarity.threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(FlowgroupError::InvalidConfig(format!(
                "similarity threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.patterns.min_subsequence_length == 0 {
            return Err(FlowgroupError::InvalidConfig(
                "min_subsequence_length must be at least 1".into(),
            ));
        }
        if self.patterns.pattern_length == 0 {
            return Err(FlowgroupError::InvalidConfig(
                "pattern_length must be at least 1".into(),
            ));
        }
        if self.classifier.prefix_length == 0 {
            return Err(FlowgroupError::InvalidConfig(
                "prefix_length must be at least 1".into(),
            ));
        }
        if self.classifier.n_estimators == 0 {
            return Err(FlowgroupError::InvalidConfig(
                "n_estimators must be at least 1".into(),
            ));
        }
        let fraction = self.classifier.min_test_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(FlowgroupError::InvalidConfig(format!(
                "min_test_fraction must be within (0, 1), got {fraction}"
            )));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| FlowgroupError::InvalidConfig(format!("{key}={value}: {e}")))
}

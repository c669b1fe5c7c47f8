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

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use flowgroup_core::{load_csv_path, AnalysisConfig, FeatureKind, ModelKind, SequenceStore};
use flowgroup_query::AnalysisEngine;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod output;

#[derive(Parser, Debug)]
#[command(name = "flowgroup", author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mine patterns, cluster by similarity and group by classifier
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Held-out accuracy of the configured classifier
    Evaluate {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        overrides: Overrides,
    },
    /// Print the similarity edge list
    Similarity {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Delimited dataset, one `process_id, code_1, ..., code_n` row per process
    csv: PathBuf,

    /// Field delimiter (overrides config file)
    #[arg(long)]
    delimiter: Option<char>,

    /// First row is data, not a header
    #[arg(long)]
    no_header: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug, Default)]
struct Overrides {
    /// Minimum Jaccard similarity for an edge (overrides config file)
    #[arg(long)]
    threshold: Option<f64>,

    /// Minimum common subsequence length (overrides config file)
    #[arg(long)]
    min_length: Option<usize>,

    /// Prefix/suffix pattern length (overrides config file)
    #[arg(long)]
    pattern_length: Option<usize>,

    /// Classifier: tree, forest or auto (overrides config file)
    #[arg(long)]
    model: Option<ModelKind>,

    /// Feature extractor: padded_sequence or sorted_prefix (overrides config file)
    #[arg(long)]
    features: Option<FeatureKind>,

    /// Random seed for model fitting and splitting (overrides config file)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

const DEFAULT_LOG_FILTER: &str =
    "flowgroup=info,flowgroup_core=info,flowgroup_index=info,flowgroup_evals=info,flowgroup_query=info";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                DEFAULT_LOG_FILTER.into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn apply_overrides(config: &mut AnalysisConfig, input: &InputArgs, overrides: &Overrides) {
    if let Some(delimiter) = input.delimiter {
        config.dataset.delimiter = delimiter;
    }
    if input.no_header {
        config.dataset.has_header = false;
    }
    if let Some(threshold) = overrides.threshold {
        config.similarity.threshold = threshold;
    }
    if let Some(min_length) = overrides.min_length {
        config.patterns.min_subsequence_length = min_length;
    }
    if let Some(pattern_length) = overrides.pattern_length {
        config.patterns.pattern_length = pattern_length;
    }
    if let Some(model) = overrides.model {
        config.classifier.model = model;
    }
    if let Some(features) = overrides.features {
        config.classifier.features = features;
    }
    if let Some(seed) = overrides.seed {
        config.classifier.seed = seed;
    }
}

fn prepare(
    config_file: Option<PathBuf>,
    input: &InputArgs,
    overrides: &Overrides,
) -> Result<(AnalysisEngine, SequenceStore)> {
    let mut config = AnalysisConfig::load(config_file).context("failed to load configuration")?;
    apply_overrides(&mut config, input, overrides);

    let engine = AnalysisEngine::new(config).context("invalid configuration")?;
    let store = load_csv_path(&input.csv, &engine.config().dataset)
        .with_context(|| format!("failed to load dataset {}", input.csv.display()))?;
    Ok((engine, store))
}

fn emit(text: String) {
    println!("{}", text.trim_end());
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze { input, overrides } => {
            let (engine, store) = prepare(cli.config, &input, &overrides)?;
            let report = engine.run(&store);
            match input.format {
                OutputFormat::Json => emit(report.to_json()?),
                OutputFormat::Text => emit(output::report_text(&report)),
            }
        }
        Command::Evaluate { input, overrides } => {
            let (engine, store) = prepare(cli.config, &input, &overrides)?;
            let report = engine
                .evaluate(&store)
                .context("held-out evaluation failed")?;
            match input.format {
                OutputFormat::Json => emit(serde_json::to_string_pretty(&report)?),
                OutputFormat::Text => emit(output::holdout_text(&report)),
            }
        }
        Command::Similarity { input, overrides } => {
            let (engine, store) = prepare(cli.config, &input, &overrides)?;
            let graph = engine.similarity(&store);
            match input.format {
                OutputFormat::Json => emit(serde_json::to_string_pretty(&graph)?),
                OutputFormat::Text => emit(output::edges_text(&graph)),
            }
        }
    }

    Ok(())
}

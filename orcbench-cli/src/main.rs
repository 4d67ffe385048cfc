// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! orcbench CLI
//!
//! Command-line interface for sweeping concurrent data-structure benchmarks.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use orcbench_core::{OutputFormat, SweepOverrides};
use tracing_subscriber::EnvFilter;

mod commands;

/// orcbench - Benchmark sweep orchestrator for concurrent data structures
#[derive(Parser)]
#[command(name = "orcbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (built-in catalog when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the sweep and stream aggregated results
    Run {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Write results to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Store each trial's raw stdout in this directory
        #[arg(long)]
        raw_dir: Option<PathBuf>,
    },

    /// Show trial counts and estimated duration without running anything
    Plan {
        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// List the benchmark catalog
    List,

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: PathBuf,
    },
}

/// Sweep dimension overrides shared by `run` and `plan`.
#[derive(Args, Debug, Clone, Default)]
pub struct SweepArgs {
    /// Seconds each trial runs for
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Repetitions per configuration
    #[arg(short, long)]
    pub runs: Option<u32>,

    /// Thread counts, comma separated
    #[arg(short, long, value_delimiter = ',')]
    pub threads: Option<Vec<u32>>,

    /// Write ratios in permil, comma separated
    #[arg(long, value_delimiter = ',')]
    pub ratios: Option<Vec<u32>>,

    /// Only sweep this suite (repeatable)
    #[arg(short, long = "suite")]
    pub suites: Vec<String>,
}

impl From<SweepArgs> for SweepOverrides {
    fn from(args: SweepArgs) -> Self {
        Self {
            duration_secs: args.duration,
            runs: args.runs,
            threads: args.threads,
            ratios: args.ratios,
            suites: args.suites,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

// Trials run strictly one at a time; a single-threaded runtime keeps the
// orchestrator off the cores the benchmarks are measuring.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean result stream
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Run {
            sweep,
            format,
            output,
            raw_dir,
        } => {
            commands::run::execute(
                config,
                sweep.into(),
                format.into(),
                output.as_deref(),
                raw_dir.as_deref(),
            )
            .await
        }
        Commands::Plan { sweep } => commands::plan::execute(config, sweep.into()),
        Commands::List => commands::list::execute(config),
        Commands::Validate { file } => commands::validate::execute(&file),
    }
}

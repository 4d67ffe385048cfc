// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `orcbench run` command - Execute the sweep.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use orcbench_core::{
    interrupt, Orchestrator, OutputFormat, RawCapture, StreamReporter, SweepOverrides,
};

use super::load_config;

/// Conventional exit status for a process stopped by SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

pub async fn execute(
    config_path: Option<&Path>,
    overrides: SweepOverrides,
    format: OutputFormat,
    output: Option<&Path>,
    raw_dir: Option<&Path>,
) -> anyhow::Result<ExitCode> {
    let config = match load_config(config_path, &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("creating output file {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    let mut reporter = StreamReporter::new(writer, format);

    let capture = raw_dir
        .map(RawCapture::new)
        .transpose()
        .context("creating raw capture directory")?;

    let (handle, interrupt) = interrupt::channel();
    let _ctrl_c = handle.trigger_on_ctrl_c();

    tracing::info!(
        suites = config.catalog.suites().len(),
        duration_secs = config.sweep.duration().secs(),
        runs = %config.sweep.runs(),
        "Starting sweep"
    );

    let summary = Orchestrator::new(&config)
        .with_capture(capture)
        .run(&mut reporter, &interrupt)
        .await
        .context("sweep aborted")?;

    eprintln!();
    eprintln!(
        "Trials: {} ({} failed)   Aggregates: {} ({} failed)",
        summary.trials, summary.failed_trials, summary.aggregates, summary.failed_aggregates
    );

    if summary.interrupted {
        eprintln!(
            "Interrupted; {} incomplete configuration(s) discarded",
            summary.discarded
        );
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }

    Ok(ExitCode::SUCCESS)
}

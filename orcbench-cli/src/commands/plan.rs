// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `orcbench plan` command - Preview a sweep without running it.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use orcbench_core::{Sweep, SweepOverrides};

use super::load_config;

pub fn execute(config_path: Option<&Path>, overrides: SweepOverrides) -> anyhow::Result<ExitCode> {
    let config = match load_config(config_path, &overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let dims = &config.sweep;

    println!("Sweep:");
    println!("  Duration:      {}s per trial", dims.duration().secs());
    println!("  Runs:          {}", dims.runs());
    println!("  Threads:       {}", join(dims.threads()));
    println!("  Ratios (‰):    {}", join(dims.ratios()));
    println!("  Trial timeout: {}s", config.trial_runner().timeout().as_secs());
    println!();

    let mut total_trials = 0;
    let mut total_time = Duration::ZERO;

    println!(
        "{:<20} {:>9} {:>15} {:>8} {:>10}",
        "SUITE", "VARIANTS", "CONFIGURATIONS", "TRIALS", "HOURS"
    );
    for suite in config.catalog.suites() {
        let sweep = Sweep::new(suite, dims);
        let estimate = sweep.estimated_duration();
        total_trials += sweep.len();
        total_time += estimate;

        println!(
            "{:<20} {:>9} {:>15} {:>8} {:>10.2}",
            suite.name().as_str(),
            suite.variants().len(),
            sweep.configurations(),
            sweep.len(),
            hours(estimate)
        );
    }

    println!();
    println!(
        "Total: {} trial(s), about {:.2} hour(s) at full duration",
        total_trials,
        hours(total_time)
    );

    Ok(ExitCode::SUCCESS)
}

fn hours(duration: Duration) -> f64 {
    duration.as_secs_f64() / 3600.0
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

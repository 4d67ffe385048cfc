// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `orcbench validate` command - Validate configuration file.

use std::path::Path;
use std::process::ExitCode;

use orcbench_core::ConfigLoader;

pub fn execute(file: &Path) -> anyhow::Result<ExitCode> {
    tracing::info!(file = %file.display(), "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            let dims = &config.sweep;
            println!("✓ Configuration is valid");
            println!();
            println!("Sweep Settings:");
            println!("  Duration:           {}s", dims.duration().secs());
            println!("  Runs:               {}", dims.runs());
            println!("  Thread Counts:      {}", dims.threads().len());
            println!("  Ratios:             {}", dims.ratios().len());
            println!();
            println!("Runner Settings:");
            println!("  Binary Directory:   {}", config.runner.bin_dir.display());
            if let Some(work_dir) = &config.runner.work_dir {
                println!("  Working Directory:  {}", work_dir.display());
            }
            println!("  Timeout Multiplier: {}x", config.runner.timeout_multiplier);
            println!("  Min Successes:      {}", config.runner.min_successes);
            println!();
            println!("Suites ({}):", config.catalog.suites().len());
            for suite in config.catalog.suites() {
                println!(
                    "  - {} ({} variants, encoding: {}, executable: {})",
                    suite.name(),
                    suite.variants().len(),
                    suite.encoding(),
                    suite.executable().display()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

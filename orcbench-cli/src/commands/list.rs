// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `orcbench list` command - List the benchmark catalog.

use std::path::Path;
use std::process::ExitCode;

use orcbench_core::SweepOverrides;

use super::load_config;

pub fn execute(config_path: Option<&Path>) -> anyhow::Result<ExitCode> {
    let config = match load_config(config_path, &SweepOverrides::default()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Configuration error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                              BENCHMARK CATALOG                               ║");
    println!("╠═══════════════════╦════════════╦════════════╦════════════════════════════════╣");
    println!("║ Suite             ║ Encoding   ║ Keys       ║ Executable                     ║");
    println!("╠═══════════════════╬════════════╬════════════╬════════════════════════════════╣");

    for suite in config.catalog.suites() {
        let keys = suite
            .keys()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "║ {:<17} ║ {:<10} ║ {:<10} ║ {:<30} ║",
            suite.name().as_str(),
            suite.encoding().to_string(),
            keys,
            suite.executable().display().to_string()
        );
    }

    println!("╚═══════════════════╩════════════╩════════════╩════════════════════════════════╝");

    for suite in config.catalog.suites() {
        println!();
        println!("{}:", suite.name());
        for variant in suite.variants() {
            if variant.label().is_empty() {
                println!("  - {}", variant.name());
            } else {
                println!("  - {:<10} {}", variant.name().as_str(), variant.label());
            }
        }
    }

    let variants: usize = config
        .catalog
        .suites()
        .iter()
        .map(|s| s.variants().len())
        .sum();
    println!();
    println!(
        "Total: {} suite(s), {} variant(s)",
        config.catalog.suites().len(),
        variants
    );

    Ok(ExitCode::SUCCESS)
}

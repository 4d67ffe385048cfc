// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

use std::path::Path;

use orcbench_core::{Config, ConfigLoader, OrcResult, SweepOverrides};

pub mod list;
pub mod plan;
pub mod run;
pub mod validate;

/// Load the configuration file when given, else the built-in defaults.
pub fn load_config(path: Option<&Path>, overrides: &SweepOverrides) -> OrcResult<Config> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            ConfigLoader::load_file_with(path, overrides)
        }
        None => ConfigLoader::defaults(overrides),
    }
}

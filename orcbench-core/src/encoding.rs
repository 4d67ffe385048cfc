// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Command-line argument encodings understood by benchmark executables.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sweep::TrialSpec;
use crate::types::TrialDuration;

/// Runs requested per invocation. Repetition happens one level up so each
/// process yields exactly one sample.
const RUNS_PER_INVOCATION: u32 = 1;

/// How a suite's executable expects its arguments. The variant name is
/// always the first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgEncoding {
    /// `<variant> --duration=D --runs=1 --threads=T --ratios=R [--keys=K]`
    #[default]
    Flags,
    /// Legacy `<variant> <duration> <runs>`. Cannot express threads, ratio
    /// or key count; the executable falls back to its built-in values.
    Positional,
}

impl ArgEncoding {
    /// Build the argv (excluding the program) for one trial.
    pub fn encode(&self, trial: &TrialSpec<'_>, duration: TrialDuration) -> Vec<String> {
        match self {
            ArgEncoding::Flags => encode_flags(trial, duration),
            ArgEncoding::Positional => encode_positional(trial, duration),
        }
    }

    /// Whether thread count and ratio reach the executable.
    pub fn expresses_dimensions(&self) -> bool {
        matches!(self, ArgEncoding::Flags)
    }
}

impl fmt::Display for ArgEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgEncoding::Flags => write!(f, "flags"),
            ArgEncoding::Positional => write!(f, "positional"),
        }
    }
}

fn encode_flags(trial: &TrialSpec<'_>, duration: TrialDuration) -> Vec<String> {
    let mut args = vec![
        trial.variant().name().to_string(),
        format!("--duration={}", duration.secs()),
        format!("--runs={}", RUNS_PER_INVOCATION),
        format!("--threads={}", trial.threads()),
        format!("--ratios={}", trial.ratio()),
    ];
    if let Some(keys) = trial.suite().keys() {
        args.push(format!("--keys={}", keys));
    }
    args
}

fn encode_positional(trial: &TrialSpec<'_>, duration: TrialDuration) -> Vec<String> {
    vec![
        trial.variant().name().to_string(),
        duration.secs().to_string(),
        RUNS_PER_INVOCATION.to_string(),
    ]
}

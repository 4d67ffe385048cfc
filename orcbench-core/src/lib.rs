// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! orcbench core library
//!
//! Drives externally built concurrent data-structure benchmarks across a
//! matrix of thread counts and write ratios. Provides the suite catalog,
//! configuration loading, sweep generation, trial execution, repetition
//! aggregation and result streaming.

pub mod aggregate;
pub mod capture;
pub mod catalog;
pub mod config;
pub mod encoding;
pub mod error;
pub mod host;
pub mod interrupt;
pub mod orchestrator;
pub mod report;
pub mod runner;
pub mod sweep;
pub mod types;

// Re-export commonly used types
pub use aggregate::{AggregateResult, Measurement, RepetitionAggregator, ThroughputStats, TrialResult};
pub use capture::RawCapture;
pub use catalog::{Catalog, Suite, Variant};
pub use config::{Config, ConfigLoader, RunnerSettings, SweepOverrides};
pub use encoding::ArgEncoding;
pub use error::{HardValidationError, OrcError, OrcResult, ReportError, TrialFailure};
pub use interrupt::{Interrupt, InterruptHandle};
pub use orchestrator::{Orchestrator, RunSummary};
pub use report::{OutputFormat, ResultSink, RunHeader, StreamReporter};
pub use runner::TrialRunner;
pub use sweep::{ConfigKey, Sweep, SweepDimensions, TrialSpec};
pub use types::{Permil, RunCount, SuiteName, ThreadCount, TrialDuration, VariantName};

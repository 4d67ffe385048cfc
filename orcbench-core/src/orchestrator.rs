// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep orchestration.
//!
//! Walks the catalog in declaration order and, for each suite, feeds every
//! trial of its sweep through the runner and the aggregator. Aggregates are
//! handed to the sink the moment their last repetition finishes.
//!
//! Trials never overlap: a benchmark of a concurrent data structure must
//! have the machine to itself for its numbers to be comparable.

use crate::aggregate::{AggregateResult, RepetitionAggregator};
use crate::capture::RawCapture;
use crate::catalog::Suite;
use crate::config::Config;
use crate::error::{OrcError, OrcResult};
use crate::host::HostInfo;
use crate::interrupt::Interrupt;
use crate::report::{ResultSink, RunHeader};
use crate::runner::TrialRunner;
use crate::sweep::Sweep;

/// Counters describing a finished (or interrupted) sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Trials executed to completion, successful or not.
    pub trials: usize,
    pub failed_trials: usize,
    /// Aggregates handed to the sink.
    pub aggregates: usize,
    /// Aggregates carrying the failure marker.
    pub failed_aggregates: usize,
    /// Configurations dropped because the sweep stopped mid-way.
    pub discarded: usize,
    pub interrupted: bool,
}

/// Top-level sweep driver.
pub struct Orchestrator<'a> {
    config: &'a Config,
    runner: TrialRunner,
    capture: Option<RawCapture>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            runner: config.trial_runner(),
            capture: None,
        }
    }

    /// Replace the runner derived from the configuration.
    pub fn with_runner(mut self, runner: TrialRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Store each trial's stdout in `capture`.
    pub fn with_capture(mut self, capture: Option<RawCapture>) -> Self {
        self.capture = capture;
        self
    }

    /// Run every suite. Returns early, with `interrupted` set, once
    /// `interrupt` fires; aggregates already emitted stay emitted.
    ///
    /// Only sink failures are errors. Trial and aggregation failures are
    /// logged and counted.
    pub async fn run(
        &self,
        sink: &mut dyn ResultSink,
        interrupt: &Interrupt,
    ) -> OrcResult<RunSummary> {
        let dims = &self.config.sweep;
        let catalog = &self.config.catalog;

        let header = RunHeader::new(dims, catalog);
        sink.begin(&header)?;
        self.preflight(&header.host);

        let mut summary = RunSummary::default();

        for suite in catalog.suites() {
            let sweep = Sweep::new(suite, dims);
            tracing::info!(
                suite = %suite.name(),
                variants = suite.variants().len(),
                trials = sweep.len(),
                estimated_secs = sweep.estimated_duration().as_secs(),
                "Starting suite"
            );

            let mut aggregator =
                RepetitionAggregator::new(dims.runs(), self.config.runner.min_successes);

            for trial in sweep.trials() {
                if interrupt.is_triggered() {
                    summary.discarded += aggregator.discard();
                    summary.interrupted = true;
                    return Ok(summary);
                }

                let result = match self.runner.run(&trial, interrupt).await {
                    Ok(result) => result,
                    Err(OrcError::Interrupted) => {
                        summary.discarded += aggregator.discard();
                        summary.interrupted = true;
                        tracing::warn!(
                            suite = %suite.name(),
                            variant = %trial.variant().name(),
                            discarded = summary.discarded,
                            "Sweep interrupted"
                        );
                        return Ok(summary);
                    }
                    Err(e) => return Err(e),
                };

                summary.trials += 1;
                match &result.throughput {
                    Ok(ops) => tracing::info!(
                        suite = %result.key.suite,
                        variant = %result.key.variant,
                        threads = %result.key.threads,
                        ratio = %result.key.ratio,
                        rep = result.repetition,
                        ops_per_sec = ops,
                        elapsed_ms = result.elapsed.as_millis() as u64,
                        "Trial finished"
                    ),
                    Err(failure) => {
                        summary.failed_trials += 1;
                        tracing::warn!(
                            suite = %result.key.suite,
                            variant = %result.key.variant,
                            threads = %result.key.threads,
                            ratio = %result.key.ratio,
                            rep = result.repetition,
                            exit_code = ?result.exit_code,
                            error = %failure,
                            "Trial failed"
                        );
                    }
                }

                if let Some(capture) = &self.capture {
                    if let Err(e) = capture.store(&result) {
                        tracing::warn!(dir = %capture.dir().display(), error = %e, "Failed to capture trial output");
                    }
                }

                if let Some(aggregate) = aggregator.push(result) {
                    emit(sink, &aggregate, &mut summary)?;
                }
            }

            for aggregate in aggregator.flush() {
                emit(sink, &aggregate, &mut summary)?;
            }
        }

        Ok(summary)
    }

    /// Warn about configurations that cannot produce meaningful numbers.
    fn preflight(&self, host: &HostInfo) {
        let dims = &self.config.sweep;

        if let Some(&max) = dims.threads().iter().max() {
            if host.oversubscribed_by(max) {
                tracing::warn!(
                    threads = max.value(),
                    cpus = host.logical_cpus,
                    "Thread count exceeds available CPUs; results will include oversubscription"
                );
            }
        }

        for suite in self.config.catalog.suites() {
            warn_unexpressed_dimensions(suite, dims.configurations_per_variant());
        }
    }
}

fn warn_unexpressed_dimensions(suite: &Suite, configurations: usize) {
    if !suite.encoding().expresses_dimensions() && configurations > 1 {
        tracing::warn!(
            suite = %suite.name(),
            encoding = %suite.encoding(),
            configurations,
            "Encoding cannot pass thread count or ratio; every configuration runs the executable's defaults"
        );
    }
}

fn emit(
    sink: &mut dyn ResultSink,
    aggregate: &AggregateResult,
    summary: &mut RunSummary,
) -> OrcResult<()> {
    sink.emit(aggregate)?;
    summary.aggregates += 1;

    if aggregate.is_failed() {
        summary.failed_aggregates += 1;
        tracing::warn!(
            suite = %aggregate.key.suite,
            variant = %aggregate.key.variant,
            threads = %aggregate.key.threads,
            ratio = %aggregate.key.ratio,
            successes = aggregate.successes,
            runs = aggregate.runs,
            "Configuration has too few successful trials"
        );
    }
    Ok(())
}

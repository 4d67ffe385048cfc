// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Repetition aggregation.
//!
//! Trials of the same configuration arrive back to back. The aggregator
//! buffers them until the last repetition shows up, then reduces the
//! successful throughput samples to their median.
//!
//! # Median convention
//!
//! With an even number of samples the **lower** median is reported: the
//! element at index `(n - 1) / 2` after an ascending sort. No averaging, so
//! the result is always a throughput some trial actually achieved.

use std::time::Duration;

use serde::Serialize;

use crate::error::TrialFailure;
use crate::sweep::ConfigKey;
use crate::types::RunCount;

/// Everything observed about one finished trial.
#[derive(Debug, Clone)]
pub struct TrialResult {
    pub key: ConfigKey,
    /// Zero-based repetition index.
    pub repetition: u32,
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
    pub elapsed: Duration,
    /// Ops/sec reported by the executable, or why there is none.
    pub throughput: Result<u64, TrialFailure>,
}

/// Lower median of an ascending-sorted slice.
pub fn lower_median(sorted: &[u64]) -> Option<u64> {
    if sorted.is_empty() {
        return None;
    }
    Some(sorted[(sorted.len() - 1) / 2])
}

/// Summary statistics over the successful repetitions of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThroughputStats {
    pub median: u64,
    pub min: u64,
    pub max: u64,
    /// `(max - min)` as a whole percentage of the median.
    pub spread_pct: u64,
}

impl ThroughputStats {
    /// Compute stats over raw samples. `None` when there are no samples.
    pub fn from_samples(mut samples: Vec<u64>) -> Option<Self> {
        samples.sort_unstable();
        let median = lower_median(&samples)?;
        let min = samples[0];
        let max = samples[samples.len() - 1];
        let spread_pct = if median == 0 {
            0
        } else {
            (100.0 * (max - min) as f64 / median as f64) as u64
        };

        Some(Self {
            median,
            min,
            max,
            spread_pct,
        })
    }
}

/// Median result, or the explicit marker for a configuration without enough
/// successful samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    Median(ThroughputStats),
    Failed,
}

impl Measurement {
    pub fn median(&self) -> Option<u64> {
        match self {
            Measurement::Median(stats) => Some(stats.median),
            Measurement::Failed => None,
        }
    }
}

/// Reduced result of all repetitions of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    #[serde(flatten)]
    pub key: ConfigKey,
    #[serde(flatten)]
    pub measurement: Measurement,
    /// Repetitions that produced a throughput figure.
    pub successes: u32,
    /// Configured repetitions.
    pub runs: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<TrialFailure>,
}

impl AggregateResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.measurement, Measurement::Failed)
    }
}

#[derive(Debug)]
struct PendingConfig {
    key: ConfigKey,
    seen: u32,
    samples: Vec<u64>,
    failures: Vec<TrialFailure>,
}

/// Groups trial results by configuration and emits one aggregate per
/// configuration once all its repetitions have been observed.
#[derive(Debug)]
pub struct RepetitionAggregator {
    runs: RunCount,
    min_successes: u32,
    // Insertion order keeps flush output deterministic
    pending: Vec<PendingConfig>,
}

impl RepetitionAggregator {
    /// `min_successes` below 1 is treated as 1.
    pub fn new(runs: RunCount, min_successes: u32) -> Self {
        Self {
            runs,
            min_successes: min_successes.max(1),
            pending: Vec::new(),
        }
    }

    /// Record one trial. Returns the aggregate when this was the last
    /// repetition of its configuration.
    pub fn push(&mut self, result: TrialResult) -> Option<AggregateResult> {
        let index = match self.pending.iter().position(|p| p.key == result.key) {
            Some(index) => index,
            None => {
                self.pending.push(PendingConfig {
                    key: result.key.clone(),
                    seen: 0,
                    samples: Vec::new(),
                    failures: Vec::new(),
                });
                self.pending.len() - 1
            }
        };

        let runs = self.runs.value();
        let entry = &mut self.pending[index];
        entry.seen += 1;
        match result.throughput {
            Ok(ops) => entry.samples.push(ops),
            Err(failure) => entry.failures.push(failure),
        }

        let complete = result.repetition + 1 >= runs || entry.seen >= runs;
        if complete {
            let entry = self.pending.remove(index);
            Some(self.reduce(entry))
        } else {
            None
        }
    }

    /// Reduce every configuration still buffered, in arrival order.
    pub fn flush(&mut self) -> Vec<AggregateResult> {
        let pending = std::mem::take(&mut self.pending);
        pending.into_iter().map(|p| self.reduce(p)).collect()
    }

    /// Drop incomplete configurations. Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Number of configurations awaiting more repetitions.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn reduce(&self, entry: PendingConfig) -> AggregateResult {
        let successes = entry.samples.len() as u32;
        let measurement = if successes >= self.min_successes {
            ThroughputStats::from_samples(entry.samples)
                .map(Measurement::Median)
                .unwrap_or(Measurement::Failed)
        } else {
            Measurement::Failed
        };

        AggregateResult {
            key: entry.key,
            measurement,
            successes,
            runs: self.runs.value(),
            failures: entry.failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Permil, SuiteName, ThreadCount, VariantName};

    fn key(threads: u32) -> ConfigKey {
        ConfigKey {
            suite: SuiteName::new("set-ll-1k").unwrap(),
            variant: VariantName::new("mh-orc").unwrap(),
            threads: ThreadCount::new(threads).unwrap(),
            ratio: Permil::new(100).unwrap(),
        }
    }

    fn trial(threads: u32, repetition: u32, throughput: Result<u64, TrialFailure>) -> TrialResult {
        TrialResult {
            key: key(threads),
            repetition,
            stdout: String::new(),
            exit_code: Some(0),
            elapsed: Duration::from_millis(5),
            throughput,
        }
    }

    fn launch_error() -> TrialFailure {
        TrialFailure::Launch {
            reason: "No such file or directory".to_string(),
        }
    }

    #[test]
    fn test_median_odd() {
        let stats = ThroughputStats::from_samples(vec![30, 10, 20]).unwrap();
        assert_eq!(stats.median, 20);
        assert_eq!(stats.min, 10);
        assert_eq!(stats.max, 30);
        assert_eq!(stats.spread_pct, 100);
    }

    #[test]
    fn test_median_even_is_lower() {
        let stats = ThroughputStats::from_samples(vec![40, 10, 30, 20]).unwrap();
        assert_eq!(stats.median, 20);
        assert_eq!(lower_median(&[10, 20]), Some(10));
        assert_eq!(lower_median(&[7]), Some(7));
        assert_eq!(lower_median(&[]), None);
    }

    #[test]
    fn test_spread_with_zero_median() {
        let stats = ThroughputStats::from_samples(vec![0, 0, 5]).unwrap();
        assert_eq!(stats.median, 0);
        assert_eq!(stats.spread_pct, 0);
    }

    #[test]
    fn test_emits_on_last_repetition() {
        let mut agg = RepetitionAggregator::new(RunCount::new(3).unwrap(), 1);
        assert!(agg.push(trial(1, 0, Ok(100))).is_none());
        assert!(agg.push(trial(1, 1, Ok(300))).is_none());
        assert_eq!(agg.pending(), 1);

        let result = agg.push(trial(1, 2, Ok(200))).unwrap();
        assert_eq!(result.measurement.median(), Some(200));
        assert_eq!(result.successes, 3);
        assert_eq!(result.runs, 3);
        assert_eq!(agg.pending(), 0);
    }

    #[test]
    fn test_median_ignores_failed_trials() {
        let mut agg = RepetitionAggregator::new(RunCount::new(4).unwrap(), 1);
        agg.push(trial(2, 0, Ok(10)));
        agg.push(trial(2, 1, Err(TrialFailure::Timeout { limit_ms: 3000 })));
        agg.push(trial(2, 2, Ok(30)));
        let result = agg.push(trial(2, 3, Ok(20))).unwrap();

        assert_eq!(result.measurement.median(), Some(20));
        assert_eq!(result.successes, 3);
        assert_eq!(result.failures.len(), 1);
    }

    #[test]
    fn test_all_failed_is_marked() {
        let mut agg = RepetitionAggregator::new(RunCount::new(3).unwrap(), 1);
        agg.push(trial(1, 0, Err(launch_error())));
        agg.push(trial(1, 1, Err(launch_error())));
        let result = agg.push(trial(1, 2, Err(launch_error()))).unwrap();

        assert!(result.is_failed());
        assert_eq!(result.measurement.median(), None);
        assert_eq!(result.successes, 0);
        assert_eq!(result.failures.len(), 3);
    }

    #[test]
    fn test_min_successes_threshold() {
        let mut agg = RepetitionAggregator::new(RunCount::new(3).unwrap(), 2);
        agg.push(trial(1, 0, Ok(100)));
        agg.push(trial(1, 1, Err(launch_error())));
        let result = agg.push(trial(1, 2, Err(launch_error()))).unwrap();
        assert!(result.is_failed());
        assert_eq!(result.successes, 1);
    }

    #[test]
    fn test_flush_and_discard() {
        let mut agg = RepetitionAggregator::new(RunCount::new(3).unwrap(), 1);
        agg.push(trial(1, 0, Ok(100)));
        agg.push(trial(2, 0, Ok(50)));

        let flushed = agg.flush();
        assert_eq!(flushed.len(), 2);
        assert_eq!(flushed[0].key.threads.value(), 1);
        assert_eq!(flushed[1].measurement.median(), Some(50));
        assert_eq!(agg.pending(), 0);

        agg.push(trial(4, 0, Ok(1)));
        assert_eq!(agg.discard(), 1);
        assert!(agg.flush().is_empty());
    }

    #[test]
    fn test_single_run_emits_immediately() {
        let mut agg = RepetitionAggregator::new(RunCount::new(1).unwrap(), 1);
        let result = agg.push(trial(8, 0, Ok(42))).unwrap();
        assert_eq!(result.measurement.median(), Some(42));
    }

    #[test]
    fn test_serialization_flattens() {
        let mut agg = RepetitionAggregator::new(RunCount::new(1).unwrap(), 1);
        let result = agg.push(trial(8, 0, Ok(42))).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"median\""));
        assert!(json.contains("\"median\":42"));
        assert!(json.contains("\"threads\":8"));
        assert!(!json.contains("failures"));
    }
}

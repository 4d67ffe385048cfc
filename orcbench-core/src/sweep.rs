// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep generation.
//!
//! A sweep is the Cartesian product of a suite's variants with the configured
//! thread counts, ratios and repetitions. Trials are produced lazily in a
//! fixed nesting order (variant, threads, ratio, repetition) so two sweeps
//! over the same inputs always run in the same order.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{Suite, Variant};
use crate::error::HardValidationError;
use crate::types::{Permil, RunCount, SuiteName, ThreadCount, TrialDuration, VariantName};

/// Global sweep dimensions. Built once from configuration, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepDimensions {
    duration: TrialDuration,
    runs: RunCount,
    threads: Vec<ThreadCount>,
    ratios: Vec<Permil>,
}

impl SweepDimensions {
    /// Validate list dimensions: non-empty and free of duplicates.
    pub fn new(
        duration: TrialDuration,
        runs: RunCount,
        threads: Vec<ThreadCount>,
        ratios: Vec<Permil>,
    ) -> Result<Self, HardValidationError> {
        check_list("threads", &threads)?;
        check_list("ratios", &ratios)?;
        Ok(Self {
            duration,
            runs,
            threads,
            ratios,
        })
    }

    pub fn duration(&self) -> TrialDuration {
        self.duration
    }

    pub fn runs(&self) -> RunCount {
        self.runs
    }

    pub fn threads(&self) -> &[ThreadCount] {
        &self.threads
    }

    pub fn ratios(&self) -> &[Permil] {
        &self.ratios
    }

    /// Number of distinct configurations per variant.
    pub fn configurations_per_variant(&self) -> usize {
        self.threads.len() * self.ratios.len()
    }
}

fn check_list<T>(field: &'static str, values: &[T]) -> Result<(), HardValidationError>
where
    T: std::hash::Hash + Eq + std::fmt::Display,
{
    if values.is_empty() {
        return Err(HardValidationError::EmptyList { field });
    }
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(HardValidationError::InvalidFieldValue {
                field,
                value: value.to_string(),
                reason: "Listed more than once".to_string(),
            });
        }
    }
    Ok(())
}

/// Identity of one configuration: everything but the repetition index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigKey {
    pub suite: SuiteName,
    pub variant: VariantName,
    pub threads: ThreadCount,
    pub ratio: Permil,
}

/// One fully specified trial. Borrows the suite and variant it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct TrialSpec<'a> {
    suite: &'a Suite,
    variant: &'a Variant,
    threads: ThreadCount,
    ratio: Permil,
    repetition: u32,
}

impl<'a> TrialSpec<'a> {
    pub fn new(
        suite: &'a Suite,
        variant: &'a Variant,
        threads: ThreadCount,
        ratio: Permil,
        repetition: u32,
    ) -> Self {
        Self {
            suite,
            variant,
            threads,
            ratio,
            repetition,
        }
    }

    pub fn suite(&self) -> &'a Suite {
        self.suite
    }

    pub fn variant(&self) -> &'a Variant {
        self.variant
    }

    pub fn threads(&self) -> ThreadCount {
        self.threads
    }

    pub fn ratio(&self) -> Permil {
        self.ratio
    }

    /// Zero-based repetition index.
    pub fn repetition(&self) -> u32 {
        self.repetition
    }

    pub fn key(&self) -> ConfigKey {
        ConfigKey {
            suite: self.suite.name().clone(),
            variant: self.variant.name().clone(),
            threads: self.threads,
            ratio: self.ratio,
        }
    }
}

/// The sweep of one suite. Call [`Sweep::trials`] as often as needed; every
/// call starts a fresh, identical sequence.
#[derive(Debug, Clone, Copy)]
pub struct Sweep<'a> {
    suite: &'a Suite,
    dims: &'a SweepDimensions,
}

impl<'a> Sweep<'a> {
    pub fn new(suite: &'a Suite, dims: &'a SweepDimensions) -> Self {
        Self { suite, dims }
    }

    pub fn trials(&self) -> Trials<'a> {
        Trials {
            suite: self.suite,
            dims: self.dims,
            next: 0,
            total: self.len(),
        }
    }

    /// Total trial count: variants × threads × ratios × runs.
    pub fn len(&self) -> usize {
        self.suite.variants().len()
            * self.dims.configurations_per_variant()
            * self.dims.runs.value() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of configurations (trials excluding repetition).
    pub fn configurations(&self) -> usize {
        self.suite.variants().len() * self.dims.configurations_per_variant()
    }

    /// Lower bound on wall time, ignoring process startup and prefill.
    pub fn estimated_duration(&self) -> Duration {
        let trials = u64::try_from(self.len()).unwrap_or(u64::MAX);
        Duration::from_secs(self.dims.duration.secs().saturating_mul(trials))
    }
}

/// Lazy trial iterator; see [`Sweep::trials`].
#[derive(Debug, Clone)]
pub struct Trials<'a> {
    suite: &'a Suite,
    dims: &'a SweepDimensions,
    next: usize,
    total: usize,
}

impl<'a> Iterator for Trials<'a> {
    type Item = TrialSpec<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }

        // Decode the flat position, innermost dimension first
        let runs = self.dims.runs.value() as usize;
        let ratios = self.dims.ratios.len();
        let threads = self.dims.threads.len();

        let mut rest = self.next;
        let repetition = rest % runs;
        rest /= runs;
        let ratio = rest % ratios;
        rest /= ratios;
        let thread = rest % threads;
        let variant = rest / threads;

        self.next += 1;

        Some(TrialSpec {
            suite: self.suite,
            variant: &self.suite.variants()[variant],
            threads: self.dims.threads[thread],
            ratio: self.dims.ratios[ratio],
            repetition: repetition as u32,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Trials<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::ArgEncoding;
    use crate::types::MAX_TRIAL_SECS;

    fn suite(variants: &[&str]) -> Suite {
        Suite::new(
            SuiteName::new("set-ll-1k").unwrap(),
            "bin/set-ll-1k",
            ArgEncoding::Flags,
            variants
                .iter()
                .map(|v| Variant::new(VariantName::new(*v).unwrap(), *v))
                .collect(),
        )
        .unwrap()
    }

    fn dims(runs: u32, threads: &[u32], ratios: &[u32]) -> SweepDimensions {
        SweepDimensions::new(
            TrialDuration::from_secs(1).unwrap(),
            RunCount::new(runs).unwrap(),
            threads.iter().map(|t| ThreadCount::new(*t).unwrap()).collect(),
            ratios.iter().map(|r| Permil::new(*r).unwrap()).collect(),
        )
        .unwrap()
    }

    type Tuple = (String, u32, u16, u32);

    fn tuples(sweep: &Sweep<'_>) -> Vec<Tuple> {
        sweep
            .trials()
            .map(|t| {
                (
                    t.variant().name().to_string(),
                    t.threads().value(),
                    t.ratio().value(),
                    t.repetition(),
                )
            })
            .collect()
    }

    #[test]
    fn test_count_is_full_product_and_unique() {
        let suite = suite(&["a", "b", "c"]);
        let dims = dims(5, &[1, 2, 4, 8], &[1000, 100]);
        let sweep = Sweep::new(&suite, &dims);

        let all = tuples(&sweep);
        assert_eq!(all.len(), 3 * 4 * 2 * 5);
        assert_eq!(sweep.len(), all.len());
        assert_eq!(sweep.configurations(), 3 * 4 * 2);

        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }

    #[test]
    fn test_nesting_order() {
        let suite = suite(&["a", "b"]);
        let dims = dims(2, &[4, 1], &[100, 10]);
        let sweep = Sweep::new(&suite, &dims);
        let all = tuples(&sweep);

        let expect = |v: &str, t: u32, r: u16, rep: u32| (v.to_string(), t, r, rep);
        assert_eq!(all[0], expect("a", 4, 100, 0));
        assert_eq!(all[1], expect("a", 4, 100, 1));
        assert_eq!(all[2], expect("a", 4, 10, 0));
        assert_eq!(all[4], expect("a", 1, 100, 0));
        assert_eq!(all[8], expect("b", 4, 100, 0));
        assert_eq!(all[15], expect("b", 1, 10, 1));
    }

    #[test]
    fn test_regeneration_is_deterministic() {
        let suite = suite(&["x", "y"]);
        let dims = dims(3, &[2, 1, 8], &[0, 500]);
        let sweep = Sweep::new(&suite, &dims);
        assert_eq!(tuples(&sweep), tuples(&sweep));
        assert_eq!(tuples(&sweep), tuples(&Sweep::new(&suite, &dims)));
    }

    #[test]
    fn test_exact_size() {
        let suite = suite(&["a"]);
        let dims = dims(3, &[1, 2], &[100]);
        let mut trials = Sweep::new(&suite, &dims).trials();
        assert_eq!(trials.len(), 6);
        trials.next();
        assert_eq!(trials.len(), 5);
        assert_eq!(trials.count(), 5);
    }

    #[test]
    fn test_dimensions_reject_duplicates_and_empty() {
        let d = TrialDuration::from_secs(1).unwrap();
        let r = RunCount::new(1).unwrap();
        let one = ThreadCount::new(1).unwrap();
        let ten = Permil::new(10).unwrap();

        assert!(SweepDimensions::new(d, r, vec![one, one], vec![ten]).is_err());
        assert!(SweepDimensions::new(d, r, vec![one], vec![ten, ten]).is_err());
        assert!(matches!(
            SweepDimensions::new(d, r, vec![], vec![ten]),
            Err(HardValidationError::EmptyList { field: "threads" })
        ));
    }

    #[test]
    fn test_estimated_duration() {
        let suite = suite(&["a", "b"]);
        let dims = dims(5, &[1, 2], &[100]);
        let sweep = Sweep::new(&suite, &dims);
        assert_eq!(sweep.estimated_duration(), Duration::from_secs(20));
    }

    #[test]
    fn test_estimated_duration_beyond_u32_trials() {
        let suite = suite(&["a", "b"]);
        let dims = SweepDimensions::new(
            TrialDuration::from_secs(MAX_TRIAL_SECS).unwrap(),
            RunCount::new(u32::MAX).unwrap(),
            vec![ThreadCount::new(1).unwrap(), ThreadCount::new(2).unwrap()],
            vec![Permil::new(100).unwrap()],
        )
        .unwrap();
        let sweep = Sweep::new(&suite, &dims);

        let trials = 4 * u64::from(u32::MAX);
        assert_eq!(sweep.len() as u64, trials);
        assert_eq!(
            sweep.estimated_duration(),
            Duration::from_secs(MAX_TRIAL_SECS * trials)
        );
    }
}

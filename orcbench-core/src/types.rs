// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Every sweep dimension and identifier is checked once at construction, so
//! the rest of the crate never re-validates a thread count or a ratio.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::HardValidationError;

/// Largest ratio expressible in permils (100% writes).
pub const MAX_PERMIL: u16 = 1000;

fn validate_ident(field: &'static str, id: String) -> Result<String, HardValidationError> {
    if id.is_empty() {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: id,
            reason: "Name cannot be empty".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: id.clone(),
            reason: format!("Name too long: {} chars (max 64)", id.len()),
        });
    }

    // Names end up in argv and in capture file names
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(HardValidationError::InvalidFieldValue {
            field,
            value: id,
            reason: "Name must contain only ASCII alphanumerics, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(id)
}

/// Validated benchmark suite name, e.g. `set-ll-1k`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SuiteName(String);

impl SuiteName {
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        validate_ident("suite", name.into()).map(Self)
    }

    /// Wrap a name known to be valid (built-in catalog entries).
    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SuiteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SuiteName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SuiteName> for String {
    fn from(name: SuiteName) -> Self {
        name.0
    }
}

/// Validated variant name, e.g. `mh-orc`. Passed verbatim as the first
/// argument of every benchmark invocation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantName(String);

impl VariantName {
    pub fn new(name: impl Into<String>) -> Result<Self, HardValidationError> {
        validate_ident("variant", name.into()).map(Self)
    }

    /// Wrap a name known to be valid (built-in catalog entries).
    pub(crate) fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for VariantName {
    type Error = HardValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VariantName> for String {
    fn from(name: VariantName) -> Self {
        name.0
    }
}

/// Number of worker threads a trial asks the benchmark to use. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ThreadCount(u32);

impl ThreadCount {
    pub fn new(threads: u32) -> Result<Self, HardValidationError> {
        if threads == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "threads",
                value: "0".to_string(),
                reason: "Thread count must be positive".to_string(),
            });
        }
        Ok(Self(threads))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ThreadCount {
    type Error = HardValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ThreadCount> for u32 {
    fn from(threads: ThreadCount) -> Self {
        threads.0
    }
}

/// Write ratio in parts per thousand: 100 means 10% writes, 90% reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Permil(u16);

impl Permil {
    pub fn new(value: u32) -> Result<Self, HardValidationError> {
        if value > u32::from(MAX_PERMIL) {
            return Err(HardValidationError::RatioOutOfRange { value });
        }
        Ok(Self(value as u16))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// Write percentage, e.g. `10.0` for 100 permil.
    pub fn as_percent(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for Permil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for Permil {
    type Error = HardValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Permil> for u32 {
    fn from(ratio: Permil) -> Self {
        u32::from(ratio.0)
    }
}

/// How many times each configuration is repeated. At least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RunCount(u32);

impl RunCount {
    pub fn new(runs: u32) -> Result<Self, HardValidationError> {
        if runs == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "runs",
                value: "0".to_string(),
                reason: "At least one run is required".to_string(),
            });
        }
        Ok(Self(runs))
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RunCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for RunCount {
    type Error = HardValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunCount> for u32 {
    fn from(runs: RunCount) -> Self {
        runs.0
    }
}

/// Longest accepted trial: one week.
pub const MAX_TRIAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Measurement length of one trial, in whole seconds. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct TrialDuration(u64);

impl TrialDuration {
    pub fn from_secs(secs: u64) -> Result<Self, HardValidationError> {
        if secs == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "duration_secs",
                value: "0".to_string(),
                reason: "Duration must be greater than 0".to_string(),
            });
        }
        if secs > MAX_TRIAL_SECS {
            return Err(HardValidationError::InvalidFieldValue {
                field: "duration_secs",
                value: secs.to_string(),
                reason: format!("Duration cannot exceed {} seconds", MAX_TRIAL_SECS),
            });
        }
        Ok(Self(secs))
    }

    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl fmt::Display for TrialDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<u64> for TrialDuration {
    type Error = HardValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_secs(value)
    }
}

impl From<TrialDuration> for u64 {
    fn from(duration: TrialDuration) -> Self {
        duration.0
    }
}

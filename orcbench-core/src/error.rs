// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for orcbench.
//!
//! Configuration problems are fatal and surface as [`OrcError`]. Everything
//! that can go wrong with a single trial is a [`TrialFailure`], which is data
//! recorded in the result rather than an error that stops the sweep.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for the orchestrator.
#[derive(Debug, Error)]
pub enum OrcError {
    // =========================================================================
    // Configuration Errors - Fail-Fast before the first trial
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Sweep control
    // =========================================================================
    #[error("Sweep interrupted by operator")]
    Interrupted,

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors abort startup.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Empty list: {field} must contain at least one entry")]
    EmptyList { field: &'static str },

    #[error("Ratio out of range: {value} permil (max 1000)")]
    RatioOutOfRange { value: u32 },

    #[error("Duplicate suite name: {name}")]
    DuplicateSuite { name: String },

    #[error("Duplicate variant name: {variant} in suite {suite}")]
    DuplicateVariant { suite: String, variant: String },

    #[error("Unknown suite: {name}")]
    UnknownSuite { name: String },
}

/// Why a single trial produced no throughput figure.
///
/// None of these stop the sweep; the aggregator simply sees one fewer sample.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrialFailure {
    #[error("launch error: {reason}")]
    Launch { reason: String },

    /// The child started but its exit status or output could not be collected.
    #[error("wait error: {reason}")]
    Wait { reason: String },

    #[error("timeout: exceeded {limit_ms}ms")]
    Timeout { limit_ms: u64 },

    #[error("nonzero exit: {status}")]
    NonZeroExit { status: String },

    #[error("unparseable output: no '{marker}' figure found")]
    Unparseable { marker: String },
}

impl TrialFailure {
    pub(crate) fn timeout(limit: Duration) -> Self {
        TrialFailure::Timeout {
            limit_ms: limit.as_millis() as u64,
        }
    }

    /// Short, stable marker for the failure class.
    pub fn marker(&self) -> &'static str {
        match self {
            TrialFailure::Launch { .. } => "launch error",
            TrialFailure::Wait { .. } => "wait error",
            TrialFailure::Timeout { .. } => "timeout",
            TrialFailure::NonZeroExit { .. } => "nonzero exit",
            TrialFailure::Unparseable { .. } => "unparseable output",
        }
    }
}

/// Errors writing results to an output sink or raw capture directory.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write results: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using OrcError.
pub type OrcResult<T> = Result<T, OrcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_validation_error_display() {
        let err = HardValidationError::DuplicateVariant {
            suite: "set-ll-1k".to_string(),
            variant: "mh-hp".to_string(),
        };
        assert!(err.to_string().contains("set-ll-1k"));
        assert!(err.to_string().contains("mh-hp"));
    }

    #[test]
    fn test_error_chain() {
        let validation_err = HardValidationError::RatioOutOfRange { value: 1001 };
        let orc_err: OrcError = validation_err.into();
        assert!(matches!(orc_err, OrcError::HardValidation(_)));
    }

    #[test]
    fn test_trial_failure_markers() {
        assert_eq!(
            TrialFailure::Launch {
                reason: "No such file".to_string()
            }
            .marker(),
            "launch error"
        );
        assert_eq!(
            TrialFailure::timeout(Duration::from_secs(3)),
            TrialFailure::Timeout { limit_ms: 3000 }
        );
        assert_eq!(
            TrialFailure::NonZeroExit {
                status: "exit status: 1".to_string()
            }
            .marker(),
            "nonzero exit"
        );
    }

    #[test]
    fn test_wait_failure_is_not_a_launch_error() {
        let failure = TrialFailure::Wait {
            reason: "Interrupted system call".to_string(),
        };
        assert_eq!(failure.marker(), "wait error");
        assert!(failure.to_string().starts_with("wait error"));

        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("\"kind\":\"wait\""));
    }

    #[test]
    fn test_trial_failure_serializes_with_kind() {
        let json = serde_json::to_string(&TrialFailure::Timeout { limit_ms: 60 }).unwrap();
        assert!(json.contains("\"kind\":\"timeout\""));
    }
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result streaming.
//!
//! Aggregates are written one record at a time and flushed immediately, so
//! an interrupted sweep still leaves every finished configuration on disk.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{AggregateResult, Measurement};
use crate::catalog::Catalog;
use crate::error::ReportError;
use crate::host::HostInfo;
use crate::sweep::SweepDimensions;
use crate::types::SuiteName;

/// Destination for aggregated results.
pub trait ResultSink {
    /// Called once before the first result.
    fn begin(&mut self, _header: &RunHeader) -> Result<(), ReportError> {
        Ok(())
    }

    fn emit(&mut self, result: &AggregateResult) -> Result<(), ReportError>;
}

/// Collecting sink, mostly useful in tests and for library callers.
impl ResultSink for Vec<AggregateResult> {
    fn emit(&mut self, result: &AggregateResult) -> Result<(), ReportError> {
        self.push(result.clone());
        Ok(())
    }
}

/// Metadata describing a sweep, written ahead of its results.
#[derive(Debug, Clone, Serialize)]
pub struct RunHeader {
    pub tool_version: String,
    pub started_at: DateTime<Utc>,
    pub host: HostInfo,
    pub dimensions: SweepDimensions,
    pub suites: Vec<SuiteName>,
}

impl RunHeader {
    pub fn new(dimensions: &SweepDimensions, catalog: &Catalog) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
            host: HostInfo::detect(),
            dimensions: dimensions.clone(),
            suites: catalog.suites().iter().map(|s| s.name().clone()).collect(),
        }
    }
}

/// Output record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tab-separated lines with a `#` comment header.
    #[default]
    Text,
    /// One JSON object per line, tagged by `record`.
    Json,
}

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Header(&'a RunHeader),
    Aggregate(&'a AggregateResult),
}

/// Writes records to any [`Write`] in the chosen format.
pub struct StreamReporter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> StreamReporter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_json(&mut self, record: &Record<'_>) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> ResultSink for StreamReporter<W> {
    fn begin(&mut self, header: &RunHeader) -> Result<(), ReportError> {
        match self.format {
            OutputFormat::Text => {
                let dims = &header.dimensions;
                writeln!(
                    self.writer,
                    "# orcbench {} started {} on {} ({} cpus)",
                    header.tool_version,
                    header.started_at.format("%Y-%m-%dT%H:%M:%SZ"),
                    header.host.hostname,
                    header.host.logical_cpus
                )?;
                writeln!(
                    self.writer,
                    "# duration={} runs={} threads={} ratios={}",
                    dims.duration().secs(),
                    dims.runs(),
                    join(dims.threads()),
                    join(dims.ratios())
                )?;
                writeln!(self.writer, "suite\tvariant\tthreads\tratio\tmedian\tsuccesses")?;
            }
            OutputFormat::Json => self.write_json(&Record::Header(header))?,
        }
        self.writer.flush()?;
        Ok(())
    }

    fn emit(&mut self, result: &AggregateResult) -> Result<(), ReportError> {
        match self.format {
            OutputFormat::Text => {
                let median = match result.measurement {
                    Measurement::Median(stats) => stats.median.to_string(),
                    Measurement::Failed => "FAILED".to_string(),
                };
                writeln!(
                    self.writer,
                    "{}\t{}\t{}\t{}\t{}\t{}/{}",
                    result.key.suite,
                    result.key.variant,
                    result.key.threads,
                    result.key.ratio,
                    median,
                    result.successes,
                    result.runs
                )?;
            }
            OutputFormat::Json => self.write_json(&Record::Aggregate(result))?,
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Trial execution.
//!
//! Each trial is one child process, started in its own process group with
//! stdin closed and stdout/stderr captured. The runner waits for exit, the
//! safety timeout, or an operator interrupt, whichever comes first. On
//! timeout or interrupt the whole group gets SIGTERM, a short grace period to
//! flush its output, then SIGKILL.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::process::Command;

use crate::aggregate::TrialResult;
use crate::error::{OrcError, OrcResult, TrialFailure};
use crate::interrupt::Interrupt;
use crate::sweep::TrialSpec;
use crate::types::TrialDuration;

/// Default factor applied to the trial duration to get the kill deadline.
pub const DEFAULT_TIMEOUT_MULTIPLIER: u32 = 3;

/// Time a terminated trial gets between SIGTERM and SIGKILL.
const TERMINATE_GRACE: Duration = Duration::from_secs(2);

/// Runs trials one at a time as external processes.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    duration: TrialDuration,
    timeout: Duration,
    grace: Duration,
    work_dir: Option<PathBuf>,
}

impl TrialRunner {
    /// Runner whose kill deadline is `duration × timeout_multiplier`.
    pub fn new(duration: TrialDuration, timeout_multiplier: u32) -> Self {
        Self {
            duration,
            timeout: duration.as_duration().saturating_mul(timeout_multiplier.max(1)),
            grace: TERMINATE_GRACE,
            work_dir: None,
        }
    }

    /// Run trials from this directory instead of the current one.
    pub fn with_work_dir(mut self, work_dir: Option<PathBuf>) -> Self {
        self.work_dir = work_dir;
        self
    }

    /// Override the kill deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the SIGTERM to SIGKILL grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute one trial.
    ///
    /// Launch and wait failures, timeouts, non-zero exits and unparseable output are
    /// reported inside the returned [`TrialResult`]. The only error is
    /// [`OrcError::Interrupted`], returned after the child has been
    /// terminated.
    pub async fn run(&self, trial: &TrialSpec<'_>, interrupt: &Interrupt) -> OrcResult<TrialResult> {
        let suite = trial.suite();
        let args = suite.encoding().encode(trial, self.duration);

        tracing::debug!(
            executable = %suite.executable().display(),
            args = ?args,
            rep = trial.repetition(),
            "Launching trial"
        );

        let mut cmd = Command::new(self.program(suite.executable()));
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }

        let start = Instant::now();
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                let failure = TrialFailure::Launch {
                    reason: format!("{}: {}", suite.executable().display(), e),
                };
                return Ok(result(trial, String::new(), None, start.elapsed(), Err(failure)));
            }
        };

        let pid = child.id();
        let output = child.wait_with_output();
        tokio::pin!(output);

        let exit = tokio::select! {
            waited = &mut output => Exit::Finished(waited),
            _ = tokio::time::sleep(self.timeout) => Exit::TimedOut,
            _ = interrupt.triggered() => Exit::Interrupted,
        };

        match exit {
            Exit::Finished(Ok(out)) => {
                let elapsed = start.elapsed();
                let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
                let throughput = if out.status.success() {
                    let marker = suite.throughput_marker();
                    extract_throughput(&stdout, marker).ok_or_else(|| TrialFailure::Unparseable {
                        marker: marker.to_string(),
                    })
                } else {
                    Err(TrialFailure::NonZeroExit {
                        status: out.status.to_string(),
                    })
                };

                if !out.stderr.is_empty() {
                    tracing::debug!(
                        stderr = %String::from_utf8_lossy(&out.stderr).trim_end(),
                        "Trial stderr"
                    );
                }

                Ok(result(trial, stdout, out.status.code(), elapsed, throughput))
            }
            Exit::Finished(Err(e)) => {
                let failure = TrialFailure::Wait {
                    reason: format!("{}: {}", suite.executable().display(), e),
                };
                Ok(result(trial, String::new(), None, start.elapsed(), Err(failure)))
            }
            Exit::TimedOut => {
                tracing::debug!(pid = ?pid, timeout_ms = self.timeout.as_millis() as u64, "Trial timed out");
                let partial = self.terminate(pid, output.as_mut()).await;
                let stdout = partial
                    .map(|out| String::from_utf8_lossy(&out.stdout).into_owned())
                    .unwrap_or_default();
                Ok(result(
                    trial,
                    stdout,
                    None,
                    start.elapsed(),
                    Err(TrialFailure::timeout(self.timeout)),
                ))
            }
            Exit::Interrupted => {
                self.terminate(pid, output.as_mut()).await;
                Err(OrcError::Interrupted)
            }
        }
    }

    /// Relative executables resolve against our cwd, not the trial's.
    fn program(&self, executable: &Path) -> PathBuf {
        if self.work_dir.is_none() || executable.is_absolute() {
            return executable.to_path_buf();
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(executable),
            Err(_) => executable.to_path_buf(),
        }
    }

    /// SIGTERM the trial's process group and collect whatever it printed.
    /// Escalates to SIGKILL when the grace period runs out.
    async fn terminate<F>(&self, pid: Option<u32>, output: Pin<&mut F>) -> Option<Output>
    where
        F: Future<Output = io::Result<Output>>,
    {
        signal_group(pid, Signal::SIGTERM);
        match tokio::time::timeout(self.grace, output).await {
            Ok(Ok(out)) => Some(out),
            Ok(Err(e)) => {
                tracing::debug!(error = %e, "Failed to collect output of terminated trial");
                None
            }
            Err(_) => {
                signal_group(pid, Signal::SIGKILL);
                None
            }
        }
    }
}

enum Exit {
    Finished(io::Result<Output>),
    TimedOut,
    Interrupted,
}

fn signal_group(pid: Option<u32>, signal: Signal) {
    let Some(pid) = pid else {
        return;
    };
    // The child leads its own group, so its pid is the group id
    if let Err(e) = killpg(Pid::from_raw(pid as i32), signal) {
        tracing::debug!(pid, signal = ?signal, error = %e, "killpg failed");
    }
}

fn result(
    trial: &TrialSpec<'_>,
    stdout: String,
    exit_code: Option<i32>,
    elapsed: Duration,
    throughput: Result<u64, TrialFailure>,
) -> TrialResult {
    TrialResult {
        key: trial.key(),
        repetition: trial.repetition(),
        stdout,
        exit_code,
        elapsed,
        throughput,
    }
}

/// Find the last line containing `marker` and parse the number after it.
///
/// Integers are taken as-is; a decimal figure is truncated.
pub fn extract_throughput(stdout: &str, marker: &str) -> Option<u64> {
    let line = stdout.lines().rev().find(|line| line.contains(marker))?;
    let (_, rest) = line.split_once(marker)?;
    let token = rest.split_whitespace().next()?;

    if let Ok(ops) = token.parse::<u64>() {
        return Some(ops);
    }
    token
        .parse::<f64>()
        .ok()
        .filter(|ops| ops.is_finite() && *ops >= 0.0)
        .map(|ops| ops as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_set_benchmark_line() {
        let out = "##### MichaelHarrisLinkedListSetOrcGC #####  \n\
                   Ops/sec = 12345678      delta = 3%   min = 12000000   max = 12400000\n";
        assert_eq!(extract_throughput(out, "Ops/sec ="), Some(12_345_678));
    }

    #[test]
    fn test_extract_uses_last_match() {
        let out = "Ops/sec = 10\nOps/sec = 20\nSuccessfuly saved results\n";
        assert_eq!(extract_throughput(out, "Ops/sec ="), Some(20));
    }

    #[test]
    fn test_extract_custom_marker_and_decimal() {
        let out = "Total Ops/sec = 4567.89\n";
        assert_eq!(extract_throughput(out, "Total Ops/sec ="), Some(4567));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        assert_eq!(extract_throughput("no figures here\n", "Ops/sec ="), None);
        assert_eq!(extract_throughput("Ops/sec = nan\n", "Ops/sec ="), None);
        assert_eq!(extract_throughput("Ops/sec = -5\n", "Ops/sec ="), None);
        assert_eq!(extract_throughput("Ops/sec =\n", "Ops/sec ="), None);
    }

    #[test]
    fn test_timeout_is_duration_times_multiplier() {
        let runner = TrialRunner::new(TrialDuration::from_secs(20).unwrap(), 3);
        assert_eq!(runner.timeout(), Duration::from_secs(60));

        let runner = TrialRunner::new(TrialDuration::from_secs(2).unwrap(), 0);
        assert_eq!(runner.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_timeout_with_huge_multiplier() {
        let week = TrialDuration::from_secs(crate::types::MAX_TRIAL_SECS).unwrap();
        let runner = TrialRunner::new(week, u32::MAX);
        assert_eq!(
            runner.timeout(),
            week.as_duration().saturating_mul(u32::MAX)
        );
    }
}

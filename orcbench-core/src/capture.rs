// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Raw per-trial output capture.

use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::TrialResult;
use crate::error::ReportError;

/// Writes each trial's stdout to its own text file.
#[derive(Debug, Clone)]
pub struct RawCapture {
    dir: PathBuf,
}

impl RawCapture {
    /// Create the capture directory if needed.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, ReportError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a trial's output lands in: `<suite>-<variant>-t<threads>-r<ratio>-<rep>.txt`.
    pub fn path_for(&self, result: &TrialResult) -> PathBuf {
        self.dir.join(format!(
            "{}-{}-t{}-r{}-{}.txt",
            result.key.suite, result.key.variant, result.key.threads, result.key.ratio, result.repetition
        ))
    }

    pub fn store(&self, result: &TrialResult) -> Result<PathBuf, ReportError> {
        let path = self.path_for(result);
        fs::write(&path, result.stdout.as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::ConfigKey;
    use crate::types::{Permil, SuiteName, ThreadCount, VariantName};
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_store_writes_stdout() {
        let temp_dir = TempDir::new().unwrap();
        let capture = RawCapture::new(temp_dir.path().join("raw")).unwrap();

        let result = TrialResult {
            key: ConfigKey {
                suite: SuiteName::new("set-tree-1m").unwrap(),
                variant: VariantName::new("nata-hp").unwrap(),
                threads: ThreadCount::new(32).unwrap(),
                ratio: Permil::new(10).unwrap(),
            },
            repetition: 4,
            stdout: "Ops/sec = 99\n".to_string(),
            exit_code: Some(0),
            elapsed: Duration::from_secs(1),
            throughput: Ok(99),
        };

        let path = capture.store(&result).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "set-tree-1m-nata-hp-t32-r10-4.txt"
        );
        assert_eq!(fs::read_to_string(path).unwrap(), "Ops/sec = 99\n");
    }
}

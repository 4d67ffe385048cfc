// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Every field is optional; an empty document yields the standard sweep over
//! the built-in catalog. Any invalid value is a [`HardValidationError`] and
//! the sweep never starts.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::catalog::{Catalog, Suite, Variant, DEFAULT_THROUGHPUT_MARKER};
use crate::encoding::ArgEncoding;
use crate::error::{HardValidationError, OrcError, OrcResult};
use crate::runner::{TrialRunner, DEFAULT_TIMEOUT_MULTIPLIER};
use crate::sweep::SweepDimensions;
use crate::types::{Permil, RunCount, SuiteName, ThreadCount, TrialDuration, VariantName};

/// Raw sweep section as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSweepConfig {
    #[serde(default = "default_duration_secs")]
    duration_secs: u64,
    #[serde(default = "default_runs")]
    runs: u32,
    #[serde(default = "default_threads")]
    threads: Vec<u32>,
    #[serde(default = "default_ratios")]
    ratios: Vec<u32>,
}

fn default_duration_secs() -> u64 {
    20
}

fn default_runs() -> u32 {
    5
}

fn default_threads() -> Vec<u32> {
    vec![1, 2, 4, 8, 10, 16, 20, 24, 32, 40]
}

fn default_ratios() -> Vec<u32> {
    vec![1000, 100, 10]
}

impl Default for RawSweepConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            runs: default_runs(),
            threads: default_threads(),
            ratios: default_ratios(),
        }
    }
}

/// Raw runner section.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRunnerConfig {
    #[serde(default = "default_bin_dir")]
    bin_dir: String,
    #[serde(default)]
    work_dir: Option<String>,
    #[serde(default = "default_timeout_multiplier")]
    timeout_multiplier: u32,
    #[serde(default = "default_min_successes")]
    min_successes: u32,
}

fn default_bin_dir() -> String {
    "bin".to_string()
}

fn default_timeout_multiplier() -> u32 {
    DEFAULT_TIMEOUT_MULTIPLIER
}

fn default_min_successes() -> u32 {
    1
}

impl Default for RawRunnerConfig {
    fn default() -> Self {
        Self {
            bin_dir: default_bin_dir(),
            work_dir: None,
            timeout_multiplier: default_timeout_multiplier(),
            min_successes: default_min_successes(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawVariant {
    name: String,
    #[serde(default)]
    label: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSuite {
    name: String,
    /// Defaults to the suite name; relative paths resolve against `bin_dir`.
    #[serde(default)]
    executable: Option<String>,
    #[serde(default)]
    encoding: ArgEncoding,
    #[serde(default)]
    keys: Option<u64>,
    #[serde(default)]
    throughput_marker: Option<String>,
    variants: Vec<RawVariant>,
}

/// Raw root configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    sweep: RawSweepConfig,
    #[serde(default)]
    runner: RawRunnerConfig,
    #[serde(default)]
    suites: Option<Vec<RawSuite>>,
}

/// Validated runner settings.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub bin_dir: PathBuf,
    pub work_dir: Option<PathBuf>,
    pub timeout_multiplier: u32,
    pub min_successes: u32,
}

/// Command-line overrides for the sweep section.
#[derive(Debug, Clone, Default)]
pub struct SweepOverrides {
    pub duration_secs: Option<u64>,
    pub runs: Option<u32>,
    pub threads: Option<Vec<u32>>,
    pub ratios: Option<Vec<u32>>,
    /// Restrict the catalog to these suites, keeping catalog order.
    pub suites: Vec<String>,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub sweep: SweepDimensions,
    pub runner: RunnerSettings,
    pub catalog: Catalog,
}

impl Config {
    /// Runner configured from these settings.
    pub fn trial_runner(&self) -> TrialRunner {
        TrialRunner::new(self.sweep.duration(), self.runner.timeout_multiplier)
            .with_work_dir(self.runner.work_dir.clone())
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> OrcResult<Config> {
        Self::load_file_with(path, &SweepOverrides::default())
    }

    /// Load a YAML file and apply command-line overrides before validation.
    pub fn load_file_with(path: impl AsRef<Path>, overrides: &SweepOverrides) -> OrcResult<Config> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OrcError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| OrcError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string_with(&content, overrides)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> OrcResult<Config> {
        Self::load_string_with(content, &SweepOverrides::default())
    }

    pub fn load_string_with(content: &str, overrides: &SweepOverrides) -> OrcResult<Config> {
        // An empty document deserializes to unit, not to an empty map
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| OrcError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?
        };

        Self::validate(raw, overrides)
    }

    /// Built-in catalog and standard sweep, plus overrides.
    pub fn defaults(overrides: &SweepOverrides) -> OrcResult<Config> {
        Self::validate(RawConfig::default(), overrides)
    }

    fn validate(mut raw: RawConfig, overrides: &SweepOverrides) -> OrcResult<Config> {
        apply_overrides(&mut raw.sweep, overrides);

        let sweep = Self::validate_sweep(&raw.sweep)?;
        let runner = Self::validate_runner(raw.runner, &sweep)?;

        let catalog = match raw.suites {
            Some(suites) => {
                let suites = suites
                    .into_iter()
                    .map(|s| Self::validate_suite(s, &runner.bin_dir))
                    .collect::<Result<Vec<_>, _>>()?;
                Catalog::new(suites)?
            }
            None => Catalog::builtin(&runner.bin_dir),
        };

        let catalog = if overrides.suites.is_empty() {
            catalog
        } else {
            catalog.select(&overrides.suites)?
        };

        Ok(Config {
            sweep,
            runner,
            catalog,
        })
    }

    fn validate_sweep(raw: &RawSweepConfig) -> Result<SweepDimensions, HardValidationError> {
        let duration = TrialDuration::from_secs(raw.duration_secs)?;
        let runs = RunCount::new(raw.runs)?;
        let threads = raw
            .threads
            .iter()
            .map(|t| ThreadCount::new(*t))
            .collect::<Result<Vec<_>, _>>()?;
        let ratios = raw
            .ratios
            .iter()
            .map(|r| Permil::new(*r))
            .collect::<Result<Vec<_>, _>>()?;

        SweepDimensions::new(duration, runs, threads, ratios)
    }

    fn validate_runner(
        raw: RawRunnerConfig,
        sweep: &SweepDimensions,
    ) -> Result<RunnerSettings, HardValidationError> {
        if raw.timeout_multiplier == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "timeout_multiplier",
                value: "0".to_string(),
                reason: "Multiplier must be at least 1".to_string(),
            });
        }

        if raw.min_successes == 0 || raw.min_successes > sweep.runs().value() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "min_successes",
                value: raw.min_successes.to_string(),
                reason: format!("Must be between 1 and runs ({})", sweep.runs()),
            });
        }

        Ok(RunnerSettings {
            bin_dir: PathBuf::from(raw.bin_dir),
            work_dir: raw.work_dir.map(PathBuf::from),
            timeout_multiplier: raw.timeout_multiplier,
            min_successes: raw.min_successes,
        })
    }

    fn validate_suite(raw: RawSuite, bin_dir: &Path) -> Result<Suite, HardValidationError> {
        let name = SuiteName::new(raw.name)?;

        let executable = match raw.executable {
            Some(exe) if exe.is_empty() => {
                return Err(HardValidationError::InvalidFieldValue {
                    field: "executable",
                    value: String::new(),
                    reason: format!("Executable path for suite {} cannot be empty", name),
                });
            }
            Some(exe) => PathBuf::from(exe),
            None => PathBuf::from(name.as_str()),
        };
        // Absolute paths win over bin_dir in Path::join
        let executable = bin_dir.join(executable);

        let variants = raw
            .variants
            .into_iter()
            .map(|v| VariantName::new(v.name).map(|name| Variant::new(name, v.label)))
            .collect::<Result<Vec<_>, _>>()?;

        let marker = raw
            .throughput_marker
            .unwrap_or_else(|| DEFAULT_THROUGHPUT_MARKER.to_string());
        if marker.trim().is_empty() {
            return Err(HardValidationError::InvalidFieldValue {
                field: "throughput_marker",
                value: marker,
                reason: "Marker cannot be blank".to_string(),
            });
        }

        let suite = Suite::new(name, executable, raw.encoding, variants)?
            .with_throughput_marker(marker);
        Ok(match raw.keys {
            Some(keys) => suite.with_keys(keys),
            None => suite,
        })
    }
}

fn apply_overrides(sweep: &mut RawSweepConfig, overrides: &SweepOverrides) {
    if let Some(duration) = overrides.duration_secs {
        sweep.duration_secs = duration;
    }
    if let Some(runs) = overrides.runs {
        sweep.runs = runs;
    }
    if let Some(threads) = &overrides.threads {
        sweep.threads = threads.clone();
    }
    if let Some(ratios) = &overrides.ratios {
        sweep.ratios = ratios.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CONFIG: &str = r#"
sweep:
  duration_secs: 2
  runs: 3
  threads: [1, 2, 4]
  ratios: [1000, 100]

runner:
  bin_dir: /opt/orc/bin
  work_dir: /tmp/orc
  timeout_multiplier: 4
  min_successes: 2

suites:
  - name: set-ll-1k
    keys: 1000
    variants:
      - name: mh-hp
        label: Michael-Harris with Hazard Pointers
      - name: mh-orc
  - name: legacy-lists
    executable: /usr/local/bin/set-ll-legacy
    encoding: positional
    throughput_marker: "Total Ops/sec ="
    variants:
      - name: mh-ptp
"#;

    #[test]
    fn test_valid_config() {
        let config = ConfigLoader::load_string(VALID_CONFIG).unwrap();
        assert_eq!(config.sweep.duration().secs(), 2);
        assert_eq!(config.sweep.runs().value(), 3);
        assert_eq!(config.sweep.threads().len(), 3);
        assert_eq!(config.runner.min_successes, 2);
        assert_eq!(config.runner.work_dir, Some(PathBuf::from("/tmp/orc")));

        let suites = config.catalog.suites();
        assert_eq!(suites.len(), 2);
        assert_eq!(suites[0].executable(), Path::new("/opt/orc/bin/set-ll-1k"));
        assert_eq!(suites[0].keys(), Some(1000));
        assert_eq!(suites[0].encoding(), ArgEncoding::Flags);
        assert_eq!(suites[0].variants()[0].label(), "Michael-Harris with Hazard Pointers");

        assert_eq!(suites[1].executable(), Path::new("/usr/local/bin/set-ll-legacy"));
        assert_eq!(suites[1].encoding(), ArgEncoding::Positional);
        assert_eq!(suites[1].throughput_marker(), "Total Ops/sec =");
        assert_eq!(suites[1].keys(), None);
    }

    #[test]
    fn test_defaults_applied() {
        let config = ConfigLoader::load_string("").unwrap();
        assert_eq!(config.sweep.duration().secs(), 20);
        assert_eq!(config.sweep.runs().value(), 5);
        assert_eq!(config.sweep.threads().len(), 10);
        assert_eq!(config.sweep.ratios().len(), 3);
        assert_eq!(config.runner.timeout_multiplier, 3);
        assert_eq!(config.catalog.suites().len(), 3);
        assert_eq!(
            config.catalog.suites()[0].executable(),
            Path::new("bin/set-ll-1k")
        );
        assert_eq!(config.trial_runner().timeout(), std::time::Duration::from_secs(60));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = SweepOverrides {
            duration_secs: Some(1),
            runs: Some(3),
            threads: Some(vec![1, 2]),
            ratios: Some(vec![100]),
            suites: vec!["set-tree-1m".to_string()],
        };
        let config = ConfigLoader::defaults(&overrides).unwrap();
        assert_eq!(config.sweep.duration().secs(), 1);
        assert_eq!(config.sweep.threads().len(), 2);
        assert_eq!(config.sweep.ratios()[0].value(), 100);
        assert_eq!(config.catalog.suites().len(), 1);
        assert_eq!(config.catalog.suites()[0].name().as_str(), "set-tree-1m");
    }

    #[test]
    fn test_zero_duration_rejected() {
        let result = ConfigLoader::load_string("sweep:\n  duration_secs: 0\n");
        assert!(matches!(result, Err(OrcError::HardValidation(_))));
    }

    #[test]
    fn test_oversized_duration_rejected() {
        let result = ConfigLoader::load_string("sweep:\n  duration_secs: 18446744073709551615\n");
        assert!(matches!(
            result,
            Err(OrcError::HardValidation(HardValidationError::InvalidFieldValue {
                field: "duration_secs",
                ..
            }))
        ));

        let overrides = SweepOverrides {
            duration_secs: Some(100_000_000_000_000_000),
            ..SweepOverrides::default()
        };
        assert!(ConfigLoader::defaults(&overrides).is_err());
    }

    #[test]
    fn test_ratio_out_of_range() {
        let result = ConfigLoader::load_string("sweep:\n  ratios: [100, 1500]\n");
        assert!(matches!(
            result,
            Err(OrcError::HardValidation(HardValidationError::RatioOutOfRange { value: 1500 }))
        ));
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(ConfigLoader::load_string("sweep:\n  threads: [0, 1]\n").is_err());
    }

    #[test]
    fn test_min_successes_above_runs() {
        let yaml = "sweep:\n  runs: 2\nrunner:\n  min_successes: 3\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_duplicate_suites() {
        let yaml = r#"
suites:
  - name: s
    variants: [{ name: a }]
  - name: s
    variants: [{ name: b }]
"#;
        assert!(matches!(
            ConfigLoader::load_string(yaml),
            Err(OrcError::HardValidation(HardValidationError::DuplicateSuite { .. }))
        ));
    }

    #[test]
    fn test_empty_variants() {
        let yaml = "suites:\n  - name: s\n    variants: []\n";
        assert!(ConfigLoader::load_string(yaml).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ConfigLoader::load_string("sweep:\n  thread: [1]\n");
        assert!(matches!(result, Err(OrcError::ConfigParse { .. })));
    }

    #[test]
    fn test_unknown_suite_filter() {
        let overrides = SweepOverrides {
            suites: vec!["q-ll-enq-deq".to_string()],
            ..Default::default()
        };
        assert!(ConfigLoader::defaults(&overrides).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load_file("/nonexistent/orcbench.yaml");
        assert!(matches!(result, Err(OrcError::ConfigNotFound { .. })));
    }
}

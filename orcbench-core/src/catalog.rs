// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Suite catalog.
//!
//! A suite is one benchmark executable plus the variants (algorithm and
//! reclamation scheme pairs) it knows how to run. The catalog keeps suites in
//! declaration order, which is also the order the orchestrator runs them in.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::encoding::ArgEncoding;
use crate::error::HardValidationError;
use crate::types::{SuiteName, VariantName};

/// Marker preceding the throughput figure in benchmark output.
pub const DEFAULT_THROUGHPUT_MARKER: &str = "Ops/sec =";

/// One benchmarked implementation within a suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    name: VariantName,
    label: String,
}

impl Variant {
    pub fn new(name: VariantName, label: impl Into<String>) -> Self {
        Self {
            name,
            label: label.into(),
        }
    }

    pub fn name(&self) -> &VariantName {
        &self.name
    }

    /// Human-readable algorithm and reclamation scheme.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A benchmark executable and the variants it supports.
#[derive(Debug, Clone)]
pub struct Suite {
    name: SuiteName,
    executable: PathBuf,
    encoding: ArgEncoding,
    keys: Option<u64>,
    throughput_marker: String,
    variants: Vec<Variant>,
}

impl Suite {
    /// Create a suite, rejecting empty or duplicated variant lists.
    pub fn new(
        name: SuiteName,
        executable: impl Into<PathBuf>,
        encoding: ArgEncoding,
        variants: Vec<Variant>,
    ) -> Result<Self, HardValidationError> {
        if variants.is_empty() {
            return Err(HardValidationError::EmptyList { field: "variants" });
        }

        let mut seen = HashSet::new();
        for variant in &variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(HardValidationError::DuplicateVariant {
                    suite: name.to_string(),
                    variant: variant.name.to_string(),
                });
            }
        }

        Ok(Self {
            name,
            executable: executable.into(),
            encoding,
            keys: None,
            throughput_marker: DEFAULT_THROUGHPUT_MARKER.to_string(),
            variants,
        })
    }

    /// Set the key-space size passed to the executable.
    pub fn with_keys(mut self, keys: u64) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Override the marker used to locate the throughput figure.
    pub fn with_throughput_marker(mut self, marker: impl Into<String>) -> Self {
        self.throughput_marker = marker.into();
        self
    }

    pub fn name(&self) -> &SuiteName {
        &self.name
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn encoding(&self) -> ArgEncoding {
        self.encoding
    }

    pub fn keys(&self) -> Option<u64> {
        self.keys
    }

    pub fn throughput_marker(&self) -> &str {
        &self.throughput_marker
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }
}

/// Ordered, immutable set of suites.
#[derive(Debug, Clone)]
pub struct Catalog {
    suites: Vec<Suite>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate suite names.
    pub fn new(suites: Vec<Suite>) -> Result<Self, HardValidationError> {
        if suites.is_empty() {
            return Err(HardValidationError::EmptyList { field: "suites" });
        }

        let mut seen = HashSet::new();
        for suite in &suites {
            if !seen.insert(suite.name.as_str()) {
                return Err(HardValidationError::DuplicateSuite {
                    name: suite.name.to_string(),
                });
            }
        }

        Ok(Self { suites })
    }

    /// The stock list, tree and skiplist set suites, with executables
    /// resolved against `bin_dir`.
    pub fn builtin(bin_dir: &Path) -> Self {
        let suites = BUILTIN
            .iter()
            .map(|def| {
                let variants = def
                    .variants
                    .iter()
                    .map(|(name, label)| {
                        Variant::new(VariantName::new_unchecked(*name), *label)
                    })
                    .collect();
                Suite {
                    name: SuiteName::new_unchecked(def.name),
                    executable: bin_dir.join(def.name),
                    encoding: ArgEncoding::Flags,
                    keys: Some(def.keys),
                    throughput_marker: DEFAULT_THROUGHPUT_MARKER.to_string(),
                    variants,
                }
            })
            .collect();
        Self { suites }
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    pub fn get(&self, name: &str) -> Option<&Suite> {
        self.suites.iter().find(|s| s.name.as_str() == name)
    }

    /// Keep only the named suites, preserving catalog order.
    pub fn select(&self, names: &[String]) -> Result<Self, HardValidationError> {
        for name in names {
            if self.get(name).is_none() {
                return Err(HardValidationError::UnknownSuite { name: name.clone() });
            }
        }

        let suites = self
            .suites
            .iter()
            .filter(|s| names.iter().any(|n| n == s.name.as_str()))
            .cloned()
            .collect();
        Ok(Self { suites })
    }
}

struct BuiltinSuite {
    name: &'static str,
    keys: u64,
    variants: &'static [(&'static str, &'static str)],
}

const BUILTIN: &[BuiltinSuite] = &[
    BuiltinSuite {
        name: "set-ll-1k",
        keys: 1_000,
        variants: &[
            ("mh-hp", "Michael-Harris with Hazard Pointers"),
            ("mh-ptb", "Michael-Harris with Pass The Buck"),
            ("mh-ptp", "Michael-Harris with Pass The Pointer"),
            ("mh-ttp", "Michael-Harris with Tag The Pointer"),
            ("mh-orc", "Michael-Harris with OrcGC"),
            ("ho-orc", "Harris original with OrcGC"),
            ("hsh-orc", "Herlihy-Shavit-Harris with OrcGC"),
            ("tbkp-orc", "Timnat-Braginsky-Kogan-Petrank with OrcGC"),
        ],
    },
    BuiltinSuite {
        name: "set-tree-1m",
        keys: 1_000_000,
        variants: &[
            ("nata-hp", "Natarajan-Mittal with Hazard Pointers"),
            ("nata-ptb", "Natarajan-Mittal with Pass The Buck"),
            ("nata-ptp", "Natarajan-Mittal with Pass The Pointer"),
            ("nata-ttp", "Natarajan-Mittal with Tag The Pointer"),
            ("nata-orc", "Natarajan-Mittal with OrcGC"),
        ],
    },
    BuiltinSuite {
        name: "set-skiplist-1m",
        keys: 1_000_000,
        variants: &[
            ("hsskip-orcorig", "Original Herlihy-Shavit skiplist with OrcGC"),
            ("hsskip-orc", "Herlihy-Shavit skiplist with poison and OrcGC"),
        ],
    },
];

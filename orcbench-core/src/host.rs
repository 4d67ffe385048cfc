// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Description of the machine a sweep runs on.
//!
//! Recorded in the run header so result files from different hosts can be
//! told apart, and consulted before the sweep to flag thread counts the host
//! cannot run in parallel.

use serde::Serialize;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

use crate::types::ThreadCount;

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostInfo {
    pub hostname: String,
    /// Distribution name and version, e.g. `Ubuntu 24.04`.
    pub os: String,
    pub kernel: Option<String>,
    pub cpu_model: String,
    /// Logical CPUs; 0 when the platform does not report them.
    pub logical_cpus: usize,
    pub memory_bytes: u64,
}

impl HostInfo {
    /// Probe CPUs and memory only; process tables are never scanned.
    pub fn detect() -> Self {
        let sys = System::new_with_specifics(
            RefreshKind::new()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::new().with_ram()),
        );

        let os = match (System::name(), System::os_version()) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name,
            _ => UNKNOWN.to_string(),
        };

        Self {
            hostname: System::host_name().unwrap_or_else(|| UNKNOWN.to_string()),
            os,
            kernel: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .filter(|brand| !brand.is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string()),
            logical_cpus: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
        }
    }

    /// Whether `threads` exceeds the logical CPU count. An unknown CPU count
    /// never reports oversubscription.
    pub fn oversubscribed_by(&self, threads: ThreadCount) -> bool {
        self.logical_cpus > 0 && threads.value() as usize > self.logical_cpus
    }
}

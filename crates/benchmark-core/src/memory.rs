//! Process memory sampling
//!
//! [`ProcessMemory`] reads the resident set size of the current process and
//! its high-water mark. [`FixedMemory`] reports constant values and is used
//! where reports must be reproducible.

use crate::error::BenchmarkResult;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of current and peak memory figures for the running process
pub trait MemoryProbe: Send + Sync + Debug {
    /// Memory currently allocated to the process, in bytes
    fn current_bytes(&self) -> BenchmarkResult<u64>;

    /// Highest memory allocation seen for the process, in bytes
    fn peak_bytes(&self) -> BenchmarkResult<u64>;
}

#[cfg(target_os = "linux")]
fn read_status_field(field: &str) -> anyhow::Result<Option<u64>> {
    let status = std::fs::read_to_string("/proc/self/status")?;
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix(field) {
            let kb: u64 = rest
                .trim_start_matches(':')
                .split_whitespace()
                .next()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            return Ok(Some(kb * 1024)); // kB to bytes
        }
    }
    Ok(None)
}

/// Get current RSS (Resident Set Size) memory usage in bytes
pub fn get_memory_usage() -> anyhow::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        Ok(read_status_field("VmRSS")?.unwrap_or(0))
    }

    #[cfg(target_os = "macos")]
    {
        use std::process::Command;

        let output = Command::new("ps")
            .args(["-o", "rss=", "-p", &std::process::id().to_string()])
            .output()?;

        if output.status.success() {
            let rss_str = String::from_utf8_lossy(&output.stdout);
            let rss_kb: u64 = rss_str.trim().parse().unwrap_or(0);
            return Ok(rss_kb * 1024);
        }

        Ok(0)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        Ok(0)
    }
}

/// Get the peak RSS reported by the operating system, if it reports one
pub fn get_peak_memory_usage() -> anyhow::Result<Option<u64>> {
    #[cfg(target_os = "linux")]
    {
        read_status_field("VmHWM")
    }

    #[cfg(not(target_os = "linux"))]
    {
        Ok(None)
    }
}

/// Memory probe for the current process
///
/// Peak is the larger of the OS-reported high-water mark and the highest
/// current value this probe has observed, so platforms without a native peak
/// figure still report a monotonic peak.
#[derive(Debug, Default)]
pub struct ProcessMemory {
    observed_peak: AtomicU64,
}

impl ProcessMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn observe(&self, bytes: u64) -> u64 {
        self.observed_peak.fetch_max(bytes, Ordering::Relaxed).max(bytes)
    }
}

impl MemoryProbe for ProcessMemory {
    fn current_bytes(&self) -> BenchmarkResult<u64> {
        let bytes = get_memory_usage()?;
        self.observe(bytes);
        Ok(bytes)
    }

    fn peak_bytes(&self) -> BenchmarkResult<u64> {
        let current = get_memory_usage()?;
        let observed = self.observe(current);
        let reported = get_peak_memory_usage()?.unwrap_or(0);
        Ok(reported.max(observed))
    }
}

/// Probe returning fixed figures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMemory {
    pub current: u64,
    pub peak: u64,
}

impl FixedMemory {
    pub fn new(current: u64, peak: u64) -> Self {
        Self { current, peak: peak.max(current) }
    }
}

impl MemoryProbe for FixedMemory {
    fn current_bytes(&self) -> BenchmarkResult<u64> {
        Ok(self.current)
    }

    fn peak_bytes(&self) -> BenchmarkResult<u64> {
        Ok(self.peak)
    }
}

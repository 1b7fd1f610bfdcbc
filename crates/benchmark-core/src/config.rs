//! Report configuration
//!
//! Configuration can come from defaults, a TOML document or `BENCHMARK_*`
//! environment variables. Every pattern is validated when the config is
//! loaded so that rendering a report never fails on a bad pattern.

use crate::error::{BenchmarkError, BenchmarkResult};
use crate::humanize::{DEFAULT_PATTERN, FormatPattern};
use crate::report::try_format_date;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Date layout used in the report footer
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Settings controlling how benchmark reports are rendered
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Render reports as a visible `<pre>` block instead of an HTML comment
    pub display: bool,
    /// chrono strftime layout of the report date
    pub date_format: String,
    /// Pattern for the humanized elapsed time
    pub time_format: String,
    /// Pattern for the humanized memory usage
    pub memory_format: String,
    /// Pattern for the humanized peak memory
    pub peak_format: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            display: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_PATTERN.to_string(),
            memory_format: DEFAULT_PATTERN.to_string(),
            peak_format: DEFAULT_PATTERN.to_string(),
        }
    }
}

/// Parsed patterns ready for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormats {
    pub time: FormatPattern,
    pub memory: FormatPattern,
    pub peak: FormatPattern,
    pub date: String,
}

impl Default for ReportFormats {
    fn default() -> Self {
        Self {
            time: FormatPattern::default(),
            memory: FormatPattern::default(),
            peak: FormatPattern::default(),
            date: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> BenchmarkResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> BenchmarkResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            BenchmarkError::configuration(
                format!("failed to read {}: {err}", path.display()),
                None,
            )
        })?;
        let config = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "Loaded benchmark configuration");
        Ok(config)
    }

    /// Create configuration from `BENCHMARK_*` environment variables
    pub fn from_environment() -> BenchmarkResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> BenchmarkResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let display = match lookup("BENCHMARK_DISPLAY") {
            Some(value) => parse_flag(&value).ok_or_else(|| {
                BenchmarkError::configuration(
                    format!("expected a boolean, got {value:?}"),
                    Some("BENCHMARK_DISPLAY"),
                )
            })?,
            None => defaults.display,
        };

        let config = Self {
            display,
            date_format: lookup("BENCHMARK_DATE_FORMAT").unwrap_or(defaults.date_format),
            time_format: lookup("BENCHMARK_TIME_FORMAT").unwrap_or(defaults.time_format),
            memory_format: lookup("BENCHMARK_MEMORY_FORMAT").unwrap_or(defaults.memory_format),
            peak_format: lookup("BENCHMARK_PEAK_FORMAT").unwrap_or(defaults.peak_format),
        };
        config.validate()?;
        debug!(?config, "Benchmark configuration from environment");
        Ok(config)
    }

    /// Check every pattern and the date layout
    pub fn validate(&self) -> BenchmarkResult<()> {
        self.formats().map(|_| ())
    }

    /// Parse the configured patterns
    pub fn formats(&self) -> BenchmarkResult<ReportFormats> {
        let parse = |setting: &str, pattern: &str| {
            FormatPattern::parse(pattern).map_err(|err| {
                warn!(setting, pattern, "Rejecting benchmark format pattern");
                BenchmarkError::configuration(err.to_string(), Some(setting))
            })
        };

        validate_date_format(&self.date_format)?;

        Ok(ReportFormats {
            time: parse("time_format", &self.time_format)?,
            memory: parse("memory_format", &self.memory_format)?,
            peak: parse("peak_format", &self.peak_format)?,
            date: self.date_format.clone(),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn validate_date_format(layout: &str) -> BenchmarkResult<()> {
    let sample = chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    try_format_date(&sample, layout).map(|_| ()).map_err(|_| {
        warn!(layout, "Rejecting benchmark date layout");
        BenchmarkError::configuration(
            format!("invalid date layout {layout:?}"),
            Some("date_format"),
        )
    })
}

/// Logging setup for binaries and tests that want benchmark output
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub default_directive: String,
    /// Include the event target in log lines
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { default_directive: "benchmark_core=info".to_string(), with_target: false }
    }
}

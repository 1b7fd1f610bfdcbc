//! Structured error handling for benchmark timers
//!
//! Every fallible operation in this crate returns [`BenchmarkError`], which
//! carries a stable diagnostic code alongside a human readable message.

use thiserror::Error;

/// Result alias used throughout the crate
pub type BenchmarkResult<T> = Result<T, BenchmarkError>;

/// Error type for benchmark timer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkError {
    /// `stop()` was called on a timer that was never started
    #[error("Timer not started: call start() before stop() [bench-B101]")]
    NotStarted { name: Option<String> },

    /// A printf-style format pattern could not be parsed
    #[error("Invalid format pattern {pattern:?}: {reason} [bench-B202]")]
    InvalidFormat { pattern: String, reason: String },

    /// Process memory could not be sampled
    #[error("Memory error: {message} [bench-B301]")]
    Memory { message: String, source_details: Option<String> },

    /// Configuration loading and validation errors
    #[error("Configuration error: {message} [bench-B401]")]
    Configuration { message: String, setting: Option<String> },

    /// A shared timer's lock was poisoned by a panicking holder
    #[error("Timer lock poisoned for instance {name:?} [bench-B501]")]
    LockPoisoned { name: Option<String> },
}

impl BenchmarkError {
    /// Create a not-started error for an optionally named timer
    pub fn not_started(name: Option<&str>) -> Self {
        Self::NotStarted { name: name.map(str::to_string) }
    }

    /// Create an invalid format error
    pub fn invalid_format<P: Into<String>, R: Into<String>>(pattern: P, reason: R) -> Self {
        Self::InvalidFormat { pattern: pattern.into(), reason: reason.into() }
    }

    /// Create a memory sampling error
    pub fn memory<S: Into<String>>(message: S) -> Self {
        Self::Memory { message: message.into(), source_details: None }
    }

    /// Create a configuration error for a specific setting
    pub fn configuration<S: Into<String>>(message: S, setting: Option<&str>) -> Self {
        Self::Configuration { message: message.into(), setting: setting.map(str::to_string) }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BenchmarkError::NotStarted { .. } => "timer",
            BenchmarkError::InvalidFormat { .. } => "format",
            BenchmarkError::Memory { .. } => "memory",
            BenchmarkError::Configuration { .. } => "configuration",
            BenchmarkError::LockPoisoned { .. } => "registry",
        }
    }

    /// Stable diagnostic code, suitable for grepping logs
    pub fn code(&self) -> &'static str {
        match self {
            BenchmarkError::NotStarted { .. } => "bench-B101",
            BenchmarkError::InvalidFormat { .. } => "bench-B202",
            BenchmarkError::Memory { .. } => "bench-B301",
            BenchmarkError::Configuration { .. } => "bench-B401",
            BenchmarkError::LockPoisoned { .. } => "bench-B501",
        }
    }

    /// Check if retrying the operation can succeed without fixing the caller
    pub fn is_recoverable(&self) -> bool {
        match self {
            BenchmarkError::NotStarted { .. } => true,
            BenchmarkError::InvalidFormat { .. } => false,
            BenchmarkError::Memory { .. } => true, // transient /proc read failures
            BenchmarkError::Configuration { .. } => false,
            BenchmarkError::LockPoisoned { .. } => false,
        }
    }
}

impl From<std::io::Error> for BenchmarkError {
    fn from(err: std::io::Error) -> Self {
        BenchmarkError::Memory {
            message: "failed to read process memory statistics".to_string(),
            source_details: Some(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for BenchmarkError {
    fn from(err: anyhow::Error) -> Self {
        BenchmarkError::Memory { message: err.to_string(), source_details: None }
    }
}

impl From<toml::de::Error> for BenchmarkError {
    fn from(err: toml::de::Error) -> Self {
        BenchmarkError::Configuration { message: err.message().to_string(), setting: None }
    }
}

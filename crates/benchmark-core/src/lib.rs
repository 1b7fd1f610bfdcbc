#![deny(warnings)]
#![allow(missing_docs)]
//! Elapsed time and memory reports for instrumented code regions.
//!
//! Wrap a code region in [`Benchmark::start`] / [`Benchmark::stop`] to get a
//! short text report with the elapsed time, process memory, peak memory and
//! the current date, formatted for embedding in HTML output. Named timers are
//! handed out by an explicit [`BenchmarkRegistry`].
//!
//! ```no_run
//! use benchmark_core::Benchmark;
//!
//! let mut bench = Benchmark::new();
//! bench.start();
//! // ... code under measurement ...
//! let report = bench.stop(false).expect("timer was started");
//! print!("{report}");
//! ```

/// The start/stop timer
pub mod benchmark;
/// Monotonic and wall-clock time sources
pub mod clock;
/// Report formatting configuration
pub mod config;
/// Error types and diagnostic codes
pub mod error;
/// Byte size and duration humanizers
pub mod humanize;
/// Process memory sampling
pub mod memory;
/// Named timer registry
pub mod registry;
/// Report assembly and rendering
pub mod report;
/// Tracing subscriber setup
pub mod telemetry;

pub use benchmark::{Benchmark, BenchmarkBuilder, TimerState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{BenchmarkConfig, LoggingConfig, ReportFormats};
pub use error::{BenchmarkError, BenchmarkResult};
pub use humanize::{FormatPattern, readable_duration, readable_elapsed_time, readable_memory_size};
pub use memory::{FixedMemory, MemoryProbe, ProcessMemory};
pub use registry::{BenchmarkRegistry, BenchmarkRegistryBuilder, SharedBenchmark, lock_benchmark};
pub use report::{CRLF, DisplayMode, Report};
pub use telemetry::init_logging;

/// Crate version, reported by tools that embed benchmark output
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Benchmark Prelude
//!
//! This crate re-exports the most frequently used public items from
//! `benchmark-core`. Down-stream applications can depend on
//! `benchmark-prelude` to avoid long import lists and to stay insulated from
//! internal module reshuffles.

#![deny(warnings)]
#![deny(missing_docs)]

// Timers and their registry --------------------------------------------------------------------

pub use benchmark_core::{
    Benchmark, BenchmarkRegistry, SharedBenchmark, lock_benchmark,
    // Reports
    DisplayMode, Report,
    // Errors
    BenchmarkError, BenchmarkResult,
};

// Configuration and humanizers -----------------------------------------------------------------

pub use benchmark_core::{
    BenchmarkConfig, FormatPattern, readable_elapsed_time, readable_memory_size,
};

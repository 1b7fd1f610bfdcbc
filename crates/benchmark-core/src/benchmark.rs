//! The benchmark timer
//!
//! A [`Benchmark`] moves through `Created → Started → Stopped`. `start()`
//! may be called again at any point to re-arm the timer; `stop()` requires a
//! prior `start()` and returns the rendered report.

use crate::clock::{Clock, SystemClock};
use crate::config::{BenchmarkConfig, ReportFormats};
use crate::error::{BenchmarkError, BenchmarkResult};
use crate::memory::{MemoryProbe, ProcessMemory};
use crate::registry::LiveToken;
use crate::report::{DisplayMode, Report};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Lifecycle of a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Created,
    Started { start: Instant },
    Stopped { start: Instant, stop: Instant },
}

impl TimerState {
    fn start(&self) -> Option<Instant> {
        match *self {
            TimerState::Created => None,
            TimerState::Started { start } | TimerState::Stopped { start, .. } => Some(start),
        }
    }
}

/// Measures elapsed time and memory for a code region
#[derive(Debug)]
pub struct Benchmark {
    name: Option<String>,
    clock: Arc<dyn Clock>,
    memory: Arc<dyn MemoryProbe>,
    formats: ReportFormats,
    default_display: DisplayMode,
    state: TimerState,
    display: DisplayMode,
    memory_used: u64,
    _live: Option<LiveToken>,
}

impl Default for Benchmark {
    fn default() -> Self {
        Self::new()
    }
}

impl Benchmark {
    /// Timer using the system clock, process memory and default formats
    pub fn new() -> Self {
        Self::builder().build_unchecked()
    }

    pub fn builder() -> BenchmarkBuilder {
        BenchmarkBuilder::default()
    }

    /// Record the start instant. Calling it again re-arms the timer.
    pub fn start(&mut self) -> &mut Self {
        let start = self.clock.now();
        if self.is_running() {
            debug!(name = self.name.as_deref(), "Re-arming running benchmark");
        }
        self.state = TimerState::Started { start };
        debug!(name = self.name.as_deref(), "Benchmark started");
        self
    }

    /// Stop the timer and render the report
    ///
    /// `display` selects a visible `<pre>` block (`true`) or an HTML comment.
    pub fn stop(&mut self, display: bool) -> BenchmarkResult<String> {
        self.stop_report(display).map(|report| report.render())
    }

    /// Stop the timer using the configured default display mode
    pub fn stop_default(&mut self) -> BenchmarkResult<String> {
        let display = self.default_display.is_block();
        self.stop(display)
    }

    /// Stop the timer and return the structured measurement
    pub fn stop_report(&mut self, display: bool) -> BenchmarkResult<Report> {
        let stop = self.clock.now();
        let Some(start) = self.state.start() else {
            warn!(name = self.name.as_deref(), "Benchmark stopped before it was started");
            return Err(BenchmarkError::not_started(self.name.as_deref()));
        };

        let memory_used = self.memory.current_bytes()?;
        let peak_memory = self.memory.peak_bytes()?.max(memory_used);

        self.state = TimerState::Stopped { start, stop };
        self.display = DisplayMode::from(display);
        self.memory_used = memory_used;

        let elapsed = stop.saturating_duration_since(start);
        debug!(
            name = self.name.as_deref(),
            elapsed_us = elapsed.as_micros() as u64,
            memory_used,
            peak_memory,
            "Benchmark stopped"
        );

        Ok(Report {
            name: self.name.clone(),
            elapsed,
            memory_used,
            peak_memory,
            date: self.clock.local_time(),
            display: self.display,
            formats: self.formats.clone(),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// True between `start()` and `stop()`
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Started { .. })
    }

    /// Elapsed time of the last completed run
    pub fn elapsed(&self) -> Option<Duration> {
        match self.state {
            TimerState::Stopped { start, stop } => Some(stop.saturating_duration_since(start)),
            _ => None,
        }
    }

    /// Memory captured by the last `stop()`, in bytes
    pub fn memory_used(&self) -> u64 {
        self.memory_used
    }

    /// Display mode chosen by the last `stop()`
    pub fn display_mode(&self) -> DisplayMode {
        self.display
    }
}

/// Builder for timers with injected clock, memory probe or configuration
#[derive(Debug, Default)]
pub struct BenchmarkBuilder {
    name: Option<String>,
    clock: Option<Arc<dyn Clock>>,
    memory: Option<Arc<dyn MemoryProbe>>,
    config: Option<BenchmarkConfig>,
    live: Option<LiveToken>,
}

impl BenchmarkBuilder {
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn memory_probe(mut self, memory: Arc<dyn MemoryProbe>) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn config(mut self, config: BenchmarkConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub(crate) fn live_token(mut self, live: LiveToken) -> Self {
        self.live = Some(live);
        self
    }

    /// Build the timer, validating the configuration
    pub fn build(self) -> BenchmarkResult<Benchmark> {
        let formats = match &self.config {
            Some(config) => config.formats()?,
            None => ReportFormats::default(),
        };
        Ok(self.assemble(formats))
    }

    // Only used where the config is the default and cannot fail to parse.
    fn build_unchecked(self) -> Benchmark {
        self.assemble(ReportFormats::default())
    }

    pub(crate) fn build_with_formats(self, formats: ReportFormats) -> Benchmark {
        self.assemble(formats)
    }

    fn assemble(self, formats: ReportFormats) -> Benchmark {
        let default_display =
            DisplayMode::from(self.config.as_ref().is_some_and(|config| config.display));
        Benchmark {
            name: self.name,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            memory: self.memory.unwrap_or_else(|| Arc::new(ProcessMemory::new())),
            formats,
            default_display,
            state: TimerState::Created,
            display: DisplayMode::Comment,
            memory_used: 0,
            _live: self.live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::FixedMemory;
    use chrono::NaiveDate;

    fn manual_benchmark() -> (Arc<ManualClock>, Benchmark) {
        let date = NaiveDate::from_ymd_opt(2017, 3, 14).unwrap().and_hms_opt(15, 9, 26).unwrap();
        let clock = Arc::new(ManualClock::new(date));
        let benchmark = Benchmark::builder()
            .name("unit")
            .clock(clock.clone())
            .memory_probe(Arc::new(FixedMemory::new(1536, 4096)))
            .build()
            .unwrap();
        (clock, benchmark)
    }

    #[test]
    fn test_stop_before_start_is_an_error() {
        let (_, mut benchmark) = manual_benchmark();
        let err = benchmark.stop(false).unwrap_err();
        assert_eq!(err, BenchmarkError::not_started(Some("unit")));
        assert_eq!(benchmark.state(), TimerState::Created);
    }

    #[test]
    fn test_state_transitions() {
        let (clock, mut benchmark) = manual_benchmark();
        assert_eq!(benchmark.elapsed(), None);

        benchmark.start();
        assert!(benchmark.is_running());

        clock.advance(Duration::from_millis(250));
        let report = benchmark.stop(false).unwrap();
        assert!(!benchmark.is_running());
        assert_eq!(benchmark.elapsed(), Some(Duration::from_millis(250)));
        assert_eq!(benchmark.memory_used(), 1536);
        assert!(report.contains("    Elapsed Time: 250ms\r\n"));
        assert!(report.contains("    Memory Usage: 1.500Kb\r\n"));
        assert!(report.contains("     Peak Memory: 4.000Kb (or 4096 bytes)\r\n"));
    }

    #[test]
    fn test_start_rearms() {
        let (clock, mut benchmark) = manual_benchmark();
        benchmark.start();
        clock.advance(Duration::from_secs(5));
        benchmark.start();
        clock.advance(Duration::from_millis(1500));
        let report = benchmark.stop_report(true).unwrap();
        assert_eq!(report.elapsed, Duration::from_millis(1500));
        assert_eq!(report.elapsed_time(), "1.500s");
        assert_eq!(benchmark.display_mode(), DisplayMode::Block);
    }

    #[test]
    fn test_restart_after_stop() {
        let (clock, mut benchmark) = manual_benchmark();
        benchmark.start();
        clock.advance(Duration::from_secs(2));
        benchmark.stop(false).unwrap();

        benchmark.start();
        clock.advance(Duration::from_millis(10));
        benchmark.stop(false).unwrap();
        assert_eq!(benchmark.elapsed(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_start_chains() {
        let (_, mut benchmark) = manual_benchmark();
        let report = benchmark.start().stop(false).unwrap();
        assert!(report.contains("Elapsed Time: 0ms"));
    }

    #[test]
    fn test_stop_default_uses_config() {
        let config = BenchmarkConfig { display: true, ..Default::default() };
        let mut benchmark = Benchmark::builder()
            .memory_probe(Arc::new(FixedMemory::new(10, 10)))
            .config(config)
            .build()
            .unwrap();
        let report = benchmark.start().stop_default().unwrap();
        assert!(report.starts_with("\r\n<pre id=\"bench\">\r\n"));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = BenchmarkConfig { time_format: "%s".to_string(), ..Default::default() };
        assert!(Benchmark::builder().config(config).build().is_err());
    }
}

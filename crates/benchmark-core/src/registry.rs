//! Named benchmark instances
//!
//! [`BenchmarkRegistry`] hands out one shared timer per name, created lazily
//! on first lookup and kept for the registry's lifetime. The registry is an
//! ordinary value: create one per application (or per test) and pass it
//! where timers are needed.

use crate::benchmark::Benchmark;
use crate::clock::{Clock, SystemClock};
use crate::config::{BenchmarkConfig, ReportFormats};
use crate::error::{BenchmarkError, BenchmarkResult};
use crate::memory::{MemoryProbe, ProcessMemory};
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tracing::{debug, instrument};

/// Timer handle shared between every caller that looked up the same name
pub type SharedBenchmark = Arc<Mutex<Benchmark>>;

/// Lock a shared timer, reporting a poisoned lock as an error
pub fn lock_benchmark(shared: &SharedBenchmark) -> BenchmarkResult<MutexGuard<'_, Benchmark>> {
    shared.lock().map_err(|poisoned| BenchmarkError::LockPoisoned {
        name: poisoned.get_ref().name().map(str::to_string),
    })
}

/// Counts a timer as live until it is dropped
#[derive(Debug)]
pub(crate) struct LiveToken {
    counter: Arc<AtomicUsize>,
}

impl LiveToken {
    fn new(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter: Arc::clone(counter) }
    }
}

impl Drop for LiveToken {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Registry of named benchmark timers
#[derive(Debug)]
pub struct BenchmarkRegistry {
    clock: Arc<dyn Clock>,
    memory: Arc<dyn MemoryProbe>,
    config: BenchmarkConfig,
    formats: ReportFormats,
    instances: DashMap<String, SharedBenchmark>,
    default_instance: OnceLock<SharedBenchmark>,
    live: Arc<AtomicUsize>,
}

impl Default for BenchmarkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkRegistry {
    /// Registry using the system clock, process memory and default config
    pub fn new() -> Self {
        Self::assemble(
            Arc::new(SystemClock),
            Arc::new(ProcessMemory::new()),
            BenchmarkConfig::default(),
            ReportFormats::default(),
        )
    }

    /// Registry whose timers render with `config`
    pub fn with_config(config: BenchmarkConfig) -> BenchmarkResult<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> BenchmarkRegistryBuilder {
        BenchmarkRegistryBuilder::default()
    }

    fn assemble(
        clock: Arc<dyn Clock>,
        memory: Arc<dyn MemoryProbe>,
        config: BenchmarkConfig,
        formats: ReportFormats,
    ) -> Self {
        Self {
            clock,
            memory,
            config,
            formats,
            instances: DashMap::new(),
            default_instance: OnceLock::new(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn new_benchmark(&self, name: Option<&str>) -> Benchmark {
        let mut builder = Benchmark::builder()
            .clock(Arc::clone(&self.clock))
            .memory_probe(Arc::clone(&self.memory))
            .config(self.config.clone())
            .live_token(LiveToken::new(&self.live));
        if let Some(name) = name {
            builder = builder.name(name);
        }
        builder.build_with_formats(self.formats.clone())
    }

    /// Return the timer registered under `name`, creating it on first use
    ///
    /// The timer is not started. Concurrent first lookups of the same name
    /// observe a single instance.
    #[instrument(skip(self))]
    pub fn get_new_instance(&self, name: &str) -> SharedBenchmark {
        if let Some(existing) = self.instances.get(name) {
            return Arc::clone(existing.value());
        }

        let entry = self.instances.entry(name.to_string()).or_insert_with(|| {
            debug!("Registering benchmark instance");
            Arc::new(Mutex::new(self.new_benchmark(Some(name))))
        });
        Arc::clone(entry.value())
    }

    /// The registry's default timer, created on first call
    pub fn init(&self) -> SharedBenchmark {
        Arc::clone(
            self.default_instance
                .get_or_init(|| Arc::new(Mutex::new(self.new_benchmark(None)))),
        )
    }

    /// An unregistered timer sharing this registry's clock, probe and config
    pub fn create(&self) -> Benchmark {
        self.new_benchmark(None)
    }

    /// Number of timers created through this registry that are still alive
    pub fn instance_count(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            self.instances.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    /// Number of named instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }
}

/// Builder for registries with injected clock, probe or configuration
#[derive(Debug, Default)]
pub struct BenchmarkRegistryBuilder {
    clock: Option<Arc<dyn Clock>>,
    memory: Option<Arc<dyn MemoryProbe>>,
    config: Option<BenchmarkConfig>,
}

impl BenchmarkRegistryBuilder {
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

    pub fn build(self) -> BenchmarkResult<BenchmarkRegistry> {
        let config = self.config.unwrap_or_default();
        let formats = config.formats()?;
        Ok(BenchmarkRegistry::assemble(
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            self.memory.unwrap_or_else(|| Arc::new(ProcessMemory::new())),
            config,
            formats,
        ))
    }
}

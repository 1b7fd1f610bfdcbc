//! Time sources for benchmark timers
//!
//! Timers read a monotonic [`Instant`] for elapsed time and the local wall
//! clock for the report date. Both come from a [`Clock`] so tests can drive
//! time deterministically with [`ManualClock`].

use chrono::{Local, NaiveDateTime};
use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Source of monotonic instants and local wall-clock time
pub trait Clock: Send + Sync + Debug {
    /// Current monotonic instant
    fn now(&self) -> Instant;

    /// Current local date and time
    fn local_time(&self) -> NaiveDateTime;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn local_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug)]
struct ManualState {
    offset: Duration,
    local_time: NaiveDateTime,
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    state: Mutex<ManualState>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant and `local_time`
    pub fn new(local_time: NaiveDateTime) -> Self {
        Self {
            base: Instant::now(),
            state: Mutex::new(ManualState { offset: Duration::ZERO, local_time }),
        }
    }

    /// Move both the monotonic and the wall clock forward
    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.offset += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            state.local_time += delta;
        }
    }

    /// Replace the wall-clock time reported for report dates
    pub fn set_local_time(&self, local_time: NaiveDateTime) {
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        state.local_time = local_time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        self.base + state.offset
    }

    fn local_time(&self) -> NaiveDateTime {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).local_time
    }
}

//! Tracing subscriber setup
//!
//! The library itself only emits `tracing` events. Binaries and test
//! harnesses that want to see them call [`init_logging`] once at startup.

use crate::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a global fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `config.default_directive` when `RUST_LOG` is unset or
/// invalid. Returns `false` if a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(config.with_target))
        .try_init()
        .is_ok();

    if installed {
        info!(directive = %config.default_directive, "Benchmark logging initialized");
    }
    installed
}

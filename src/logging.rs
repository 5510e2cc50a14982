// src/logging.rs

//! Logging setup for `rundag` using `tracing` + `tracing-subscriber`.
//!
//! The active filter is picked in this order:
//! 1. `--log-level` CLI flag, applied to every target
//! 2. `RUNDAG_LOG` as an `EnvFilter` directive list
//!    (e.g. `"warn,rundag::events=debug"`)
//! 3. `info`
//!
//! Logs go to STDERR; stdout carries only projections, run lists and
//! pushed events.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "RUNDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Fails if one is already set.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

/// Resolve the filter from the CLI flag and the raw `RUNDAG_LOG` value.
///
/// An unparsable env directive falls back to `info` rather than failing
/// startup.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return EnvFilter::new(directive_for(level));
    }

    env.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

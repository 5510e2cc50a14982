// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [poll]
/// interval_ms = 5000
/// pause_while_ui_open = true
///
/// [events]
/// namespace = "acme_"
/// max_attempts = 3
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub events: EventsConfig,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)` or [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub poll: PollConfig,
    pub events: EventsConfig,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(poll: PollConfig, events: EventsConfig) -> Self {
        Self { poll, events }
    }
}

/// `[poll]` section: how the run list is refreshed.
#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    /// Refresh interval for the task-run list.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Skip refresh ticks while a modal or sheet is open.
    #[serde(default = "default_true")]
    pub pause_while_ui_open: bool,
}

fn default_interval_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

impl PollConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            pause_while_ui_open: true,
        }
    }
}

/// `[events]` section: event-push client behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Prefix applied to event keys that do not already carry it.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Total attempts for a push, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Log lines longer than this many characters are not sent.
    #[serde(default = "default_max_log_length")]
    pub max_log_length: usize,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    200
}

fn default_backoff_factor() -> f64 {
    2.0
}

fn default_max_delay_ms() -> u64 {
    5000
}

fn default_max_log_length() -> usize {
    1000
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            namespace: None,
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
            max_log_length: default_max_log_length(),
        }
    }
}

// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, RundagError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::RundagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.poll, raw.events))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_poll(cfg)?;
    validate_events(cfg)?;
    Ok(())
}

fn validate_poll(cfg: &RawConfigFile) -> Result<()> {
    if cfg.poll.interval_ms == 0 {
        return Err(RundagError::ConfigError(
            "[poll].interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_events(cfg: &RawConfigFile) -> Result<()> {
    let events = &cfg.events;

    if events.max_attempts == 0 {
        return Err(RundagError::ConfigError(
            "[events].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }

    if !(events.backoff_factor >= 1.0) {
        return Err(RundagError::ConfigError(format!(
            "[events].backoff_factor must be >= 1.0 (got {})",
            events.backoff_factor
        )));
    }

    if events.max_delay_ms < events.initial_delay_ms {
        return Err(RundagError::ConfigError(format!(
            "[events].max_delay_ms ({}) must be >= initial_delay_ms ({})",
            events.max_delay_ms, events.initial_delay_ms
        )));
    }

    if events.max_log_length == 0 {
        return Err(RundagError::ConfigError(
            "[events].max_log_length must be >= 1 (got 0)".to_string(),
        ));
    }

    if let Some(ns) = &events.namespace {
        if ns.trim().is_empty() {
            return Err(RundagError::ConfigError(
                "[events].namespace must not be blank when set".to_string(),
            ));
        }
    }

    Ok(())
}

// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RundagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Step not found: {0}")]
    StepNotFound(String),

    #[error("Output unavailable for task run {run_id}: {reason}")]
    OutputUnavailable { run_id: String, reason: String },

    #[error("Event push failed after {attempts} attempt(s): {reason}")]
    EventPush { attempts: u32, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, RundagError>;

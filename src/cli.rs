// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use crate::types::TaskRunStatus;

/// Command-line arguments for `rundag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rundag",
    version,
    about = "Follow the task-run DAG of a workflow run and push events.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `Rundag.toml` in the current directory is used when it
    /// exists, otherwise built-in defaults.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RUNDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Poll a snapshot file and print the DAG projection on every refresh.
    Watch {
        /// JSON snapshot file with `shape`, `taskRuns` and optional `outputs`.
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Print one projection and exit.
        #[arg(long)]
        once: bool,

        /// Exit once every step has reached a terminal status.
        #[arg(long)]
        until_done: bool,

        /// Override `[poll].interval_ms`.
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,

        /// Emit JSON lines instead of a listing.
        #[arg(long)]
        json: bool,

        /// Parse and inspect the snapshot (roles, order, cycles) without polling.
        #[arg(long)]
        dry_run: bool,
    },

    /// Render the status view of one step's task run.
    Show {
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Step id whose run should be rendered.
        #[arg(long, value_name = "STEP")]
        step: String,
    },

    /// List filtered task runs with per-status counts over time.
    Runs {
        #[arg(long, value_name = "PATH")]
        snapshot: PathBuf,

        /// Keep runs in this status (repeatable).
        #[arg(long = "status", value_name = "STATUS")]
        statuses: Vec<TaskRunStatus>,

        /// Keep runs created at or after this RFC 3339 time.
        #[arg(long, value_name = "TIME")]
        since: Option<DateTime<Utc>>,

        /// Keep runs created at or before this RFC 3339 time.
        #[arg(long, value_name = "TIME")]
        until: Option<DateTime<Utc>>,

        /// Require trigger metadata `KEY=VALUE` (repeatable).
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,

        /// Width of each status-count bucket.
        #[arg(long, value_name = "MINUTES", default_value_t = 60)]
        bucket_minutes: u32,

        /// Emit JSON instead of a listing.
        #[arg(long)]
        json: bool,
    },

    /// Push an event; the request is written to stdout as a JSON line.
    Push {
        /// Event key (namespaced per `[events].namespace`).
        #[arg(long)]
        key: String,

        /// JSON payload.
        #[arg(long, default_value = "{}")]
        payload: String,

        /// JSON object of string metadata.
        #[arg(long)]
        metadata: Option<String>,

        #[arg(long)]
        priority: Option<i32>,

        #[arg(long)]
        scope: Option<String>,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

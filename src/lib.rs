// src/lib.rs

pub mod chart;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod events;
pub mod logging;
pub mod source;
pub mod status;
pub mod types;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::chart::{status_counts, status_totals, TickFormat};
use crate::config::{default_config_path, load_or_default, ConfigFile};
use crate::dag::topology::{find_cycle, topological_order};
use crate::dag::{project, RunFilter, ShapeIndex, WorkflowRunSnapshot};
use crate::engine::{ConsoleSink, CoreRefresher, RefreshEvent, RefreshPolicy, Runtime, RuntimeOptions};
use crate::errors::RundagError;
use crate::events::{EventClient, JsonLinesTransport, PushEventOptions};
use crate::source::{FileSnapshotSource, SnapshotSource};
use crate::status::render_task_run;

/// High-level entry point used by `main.rs`.
///
/// Loads config, then runs the selected subcommand.
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = match &args.config {
        Some(path) => load_or_default(path, true)?,
        None => load_or_default(default_config_path(), false)?,
    };
    debug!(?cfg, "configuration loaded");

    match args.command {
        Command::Watch {
            snapshot,
            once,
            until_done,
            interval_ms,
            json,
            dry_run,
        } => {
            if dry_run {
                return print_dry_run(&snapshot).await;
            }
            let options = RuntimeOptions {
                exit_after_first_publish: once,
                exit_when_terminal: until_done,
            };
            watch(&cfg, &snapshot, interval_ms, options, json).await
        }
        Command::Show { snapshot, step } => show(&snapshot, &step).await,
        Command::Runs {
            snapshot,
            statuses,
            since,
            until,
            metadata,
            bucket_minutes,
            json,
        } => {
            let filter = RunFilter {
                statuses,
                since,
                until,
                additional_metadata: metadata.into_iter().collect(),
            };
            list_runs(&snapshot, &filter, bucket_minutes, json).await
        }
        Command::Push {
            key,
            payload,
            metadata,
            priority,
            scope,
        } => push(&cfg, &key, &payload, metadata.as_deref(), priority, scope).await,
    }
}

async fn watch(
    cfg: &ConfigFile,
    snapshot_path: &Path,
    interval_override: Option<u64>,
    options: RuntimeOptions,
    json: bool,
) -> Result<()> {
    let mut policy = RefreshPolicy::from(&cfg.poll);
    if let Some(ms) = interval_override {
        if ms == 0 {
            return Err(RundagError::ConfigError("--interval-ms must be >= 1".to_string()).into());
        }
        policy.interval = std::time::Duration::from_millis(ms);
    }

    let source = Arc::new(FileSnapshotSource::new(snapshot_path));
    let (tx, rx) = mpsc::channel::<RefreshEvent>(64);

    // Ctrl-C → graceful shutdown.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RefreshEvent::ShutdownRequested).await;
        });
    }

    info!(snapshot = ?snapshot_path, "watching workflow run snapshot");

    let core = CoreRefresher::new(policy, options);
    let runtime = Runtime::new(core, tx, rx, source, ConsoleSink::new(json));
    runtime.run().await?;
    Ok(())
}

async fn show(snapshot_path: &Path, step: &str) -> Result<()> {
    let source = FileSnapshotSource::new(snapshot_path);
    let snapshot = source.fetch_snapshot().await?;

    let index = ShapeIndex::from_shape(&snapshot.shape);
    if !index.contains(step) {
        return Err(RundagError::StepNotFound(step.to_string()).into());
    }

    let Some(run) = snapshot.task_runs.iter().find(|r| r.step_id == step) else {
        println!("{step}: not started");
        return Ok(());
    };

    let view = render_task_run(run, &index, &source).await;
    println!("{view}");
    Ok(())
}

async fn list_runs(
    snapshot_path: &Path,
    filter: &RunFilter,
    bucket_minutes: u32,
    json: bool,
) -> Result<()> {
    if bucket_minutes == 0 {
        return Err(RundagError::ConfigError("--bucket-minutes must be >= 1".to_string()).into());
    }

    let source = FileSnapshotSource::new(snapshot_path);
    let snapshot = source.fetch_snapshot().await?;
    let runs = filter.apply(&snapshot.task_runs);
    let series = status_counts(&runs, chrono::Duration::minutes(i64::from(bucket_minutes)));

    if json {
        let out = serde_json::json!({ "filter": filter, "metrics": series, "runs": runs });
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    let totals: Vec<String> = status_totals(&runs)
        .into_iter()
        .map(|(status, count)| format!("{status}={count}"))
        .collect();
    println!("runs ({}): {}", runs.len(), totals.join(" "));

    let format = TickFormat::for_data(&series);
    for point in &series {
        let counts: Vec<String> = point
            .values
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        println!("  {} {}", format.format(point.date), counts.join(" "));
    }

    for run in &runs {
        println!("  - {} [{}] {}", run.run_id, run.step_id, run.status);
    }
    Ok(())
}

async fn push(
    cfg: &ConfigFile,
    key: &str,
    payload: &str,
    metadata: Option<&str>,
    priority: Option<i32>,
    scope: Option<String>,
) -> Result<()> {
    let payload: serde_json::Value =
        serde_json::from_str(payload).context("--payload must be valid JSON")?;
    let additional_metadata = metadata
        .map(serde_json::from_str::<BTreeMap<String, String>>)
        .transpose()
        .context("--metadata must be a JSON object of strings")?;

    let client = EventClient::new(JsonLinesTransport::new(std::io::stdout()), &cfg.events);
    let options = PushEventOptions {
        additional_metadata,
        priority,
        scope,
    };

    let pushed = client.push(key, &payload, options).await?;
    debug!(event_id = %pushed.event_id, "push complete");
    Ok(())
}

/// Dry-run output: print steps, roles, dependency order and anomalies.
async fn print_dry_run(snapshot_path: &Path) -> Result<()> {
    let source = FileSnapshotSource::new(snapshot_path);
    let WorkflowRunSnapshot { shape, task_runs } = source.fetch_snapshot().await?;
    let projection = project(&shape, &task_runs);

    println!("rundag dry-run");
    println!("  snapshot = {}", snapshot_path.display());
    println!();

    println!("steps ({}):", projection.nodes.len());
    for node in &projection.nodes {
        println!("  - {} [{}]", node.task_name, node.step_id);
        println!("      role: {:?}", node.role);
        if let Some(run) = &node.run {
            println!("      run: {} ({})", run.run_id, run.status);
        }
    }

    match topological_order(&shape) {
        Some(order) => println!("order: {}", order.join(" -> ")),
        None => {
            if let Some(step) = find_cycle(&shape) {
                warn!(step = %step, "shape contains a cycle");
                println!("cycle detected involving step '{step}'");
            }
        }
    }

    for dropped in &projection.diagnostics.dropped_edges {
        println!("dropped edge: {} -> {} (unknown step)", dropped.from, dropped.to);
    }

    debug!("dry-run complete (no polling)");
    Ok(())
}

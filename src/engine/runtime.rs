// src/engine/runtime.rs

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::dag::{DagProjection, TaskRun};
use crate::errors::Result;
use crate::source::{OutputSource, SnapshotSource};
use crate::status::{render_task_run, StatusView};

use super::core::CoreRefresher;
use super::{CoreCommand, RefreshEvent};

/// Receiver of everything the UI layer draws.
pub trait ProjectionSink {
    /// A fresh projection is available.
    fn publish(&mut self, projection: &DagProjection);

    /// The detail view for a selected run has been rendered.
    fn show_detail(&mut self, run: &TaskRun, view: &StatusView);
}

/// Prints projections and details to stdout.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    /// Emit JSON lines instead of the human-readable listing.
    pub json: bool,
}

impl ConsoleSink {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn print_listing(projection: &DagProjection) {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        let _ = writeln!(out, "nodes ({}):", projection.nodes.len());
        for node in &projection.nodes {
            let status = node
                .status()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "NOT_STARTED".to_string());
            let _ = write!(
                out,
                "  - {} [{}] {:?} {}",
                node.task_name, node.step_id, node.role, status
            );
            if node.spawned_children > 0 {
                let _ = write!(out, " (+{} child runs)", node.spawned_children);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "edges ({}):", projection.edges.len());
        for edge in &projection.edges {
            let marker = if edge.active { " (active)" } else { "" };
            let _ = writeln!(out, "  - {} -> {}{}", edge.from, edge.to, marker);
        }
    }
}

impl ProjectionSink for ConsoleSink {
    fn publish(&mut self, projection: &DagProjection) {
        if self.json {
            match serde_json::to_string(projection) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "could not serialise projection"),
            }
        } else {
            Self::print_listing(projection);
        }
    }

    fn show_detail(&mut self, run: &TaskRun, view: &StatusView) {
        if self.json {
            match serde_json::to_string(view) {
                Ok(line) => println!("{line}"),
                Err(e) => warn!(error = %e, "could not serialise status view"),
            }
        } else {
            println!("{} ({}): {}", run.step_id, run.status, view);
        }
    }
}

/// Drives the core refresher from a poll timer and incoming events, runs
/// fetches against the data source and hands results to the sink.
///
/// All semantics live in `CoreRefresher`; this struct only does async IO.
pub struct Runtime<S, K>
where
    S: SnapshotSource + OutputSource + 'static,
    K: ProjectionSink,
{
    core: CoreRefresher,
    event_tx: mpsc::Sender<RefreshEvent>,
    event_rx: mpsc::Receiver<RefreshEvent>,
    source: Arc<S>,
    sink: K,
}

impl<S, K> fmt::Debug for Runtime<S, K>
where
    S: SnapshotSource + OutputSource + 'static,
    K: ProjectionSink,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<S, K> Runtime<S, K>
where
    S: SnapshotSource + OutputSource + 'static,
    K: ProjectionSink,
{
    /// `event_tx` must be the sending half of `event_rx`; fetch results are
    /// fed back through it.
    pub fn new(
        core: CoreRefresher,
        event_tx: mpsc::Sender<RefreshEvent>,
        event_rx: mpsc::Receiver<RefreshEvent>,
        source: Arc<S>,
        sink: K,
    ) -> Self {
        Self {
            core,
            event_tx,
            event_rx,
            source,
            sink,
        }
    }

    /// Main event loop. Returns the sink once the core asks to stop.
    ///
    /// The first timer tick fires immediately, so the initial fetch happens
    /// without waiting a full interval.
    pub async fn run(mut self) -> Result<K> {
        info!(interval = ?self.core.policy().interval, "rundag refresh runtime started");

        let mut ticker = tokio::time::interval(self.core.policy().interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let event = tokio::select! {
                _ = ticker.tick() => RefreshEvent::Tick,
                received = self.event_rx.recv() => match received {
                    Some(e) => e,
                    None => {
                        info!("refresh event channel closed; exiting");
                        break;
                    }
                },
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(self.sink)
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::FetchSnapshot => self.spawn_fetch(),
            CoreCommand::Publish(projection) => {
                debug!(
                    nodes = projection.nodes.len(),
                    edges = projection.edges.len(),
                    "publishing projection"
                );
                self.sink.publish(&projection);
            }
            CoreCommand::SelectTaskRun(run) => {
                let index = self.core.shape_index();
                let view = render_task_run(&run, &index, self.source.as_ref()).await;
                self.sink.show_detail(&run, &view);
            }
            CoreCommand::RequestExit => {
                info!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    /// Run the fetch in the background and feed its result back as an event.
    fn spawn_fetch(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let event = match source.fetch_snapshot().await {
                Ok(snapshot) => RefreshEvent::SnapshotFetched(snapshot),
                Err(e) => RefreshEvent::FetchFailed(e.to_string()),
            };
            if tx.send(event).await.is_err() {
                debug!("runtime gone before fetch completed; dropping result");
            }
        });
    }
}

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use rundag::dag::{DagProjection, TaskOutput, TaskRun, WorkflowRunSnapshot};
use rundag::engine::{ProjectionSink, RefreshEvent};
use rundag::errors::{Result, RundagError};
use rundag::events::{
    BulkPushEventRequest, EventTransport, PushEventRequest, PushedEvent, PutLogRequest,
    PutStreamRequest,
};
use rundag::source::{OutputSource, SnapshotSource};
use rundag::status::StatusView;
use rundag::types::RunId;
use tokio::sync::mpsc;

/// In-memory data source.
///
/// Scripted poll results are served in order; once exhausted, the last
/// successful snapshot is served again.
pub struct FakeSource {
    script: Mutex<VecDeque<std::result::Result<WorkflowRunSnapshot, String>>>,
    last: Mutex<WorkflowRunSnapshot>,
    outputs: HashMap<RunId, TaskOutput>,
    fetches: AtomicUsize,
}

impl FakeSource {
    pub fn new(initial: WorkflowRunSnapshot) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Ok(initial.clone())])),
            last: Mutex::new(initial),
            outputs: HashMap::new(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn then(self, next: WorkflowRunSnapshot) -> Self {
        self.script.lock().unwrap().push_back(Ok(next));
        self
    }

    pub fn then_fail(self, reason: &str) -> Self {
        self.script.lock().unwrap().push_back(Err(reason.to_string()));
        self
    }

    pub fn with_output(mut self, output: TaskOutput) -> Self {
        self.outputs.insert(output.run_id.clone(), output);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for FakeSource {
    fn fetch_snapshot(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<WorkflowRunSnapshot>> + Send + '_>> {
        Box::pin(async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(snapshot)) => {
                    *self.last.lock().unwrap() = snapshot.clone();
                    Ok(snapshot)
                }
                Some(Err(reason)) => Err(RundagError::Other(anyhow::anyhow!(reason))),
                None => Ok(self.last.lock().unwrap().clone()),
            }
        })
    }
}

impl OutputSource for FakeSource {
    fn fetch_output<'a>(
        &'a self,
        run_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TaskOutput>> + Send + 'a>> {
        Box::pin(async move {
            self.outputs
                .get(run_id)
                .cloned()
                .ok_or_else(|| RundagError::OutputUnavailable {
                    run_id: run_id.to_string(),
                    reason: "not found".to_string(),
                })
        })
    }
}

/// Sink that records everything and can play back UI events.
///
/// After each publish, the next scripted event (if any) is sent into the
/// runtime, which lets tests simulate clicks and surface changes.
pub struct RecordingSink {
    pub published: Vec<DagProjection>,
    pub details: Vec<(TaskRun, StatusView)>,
    tx: Option<mpsc::Sender<RefreshEvent>>,
    after_publish: VecDeque<RefreshEvent>,
    after_detail: VecDeque<RefreshEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            published: Vec::new(),
            details: Vec::new(),
            tx: None,
            after_publish: VecDeque::new(),
            after_detail: VecDeque::new(),
        }
    }

    pub fn with_events(
        mut self,
        tx: mpsc::Sender<RefreshEvent>,
        after_publish: Vec<RefreshEvent>,
        after_detail: Vec<RefreshEvent>,
    ) -> Self {
        self.tx = Some(tx);
        self.after_publish = after_publish.into();
        self.after_detail = after_detail.into();
        self
    }

    fn send_next(tx: &Option<mpsc::Sender<RefreshEvent>>, queue: &mut VecDeque<RefreshEvent>) {
        if let (Some(tx), Some(event)) = (tx, queue.pop_front()) {
            tx.try_send(event).expect("event channel full in test");
        }
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectionSink for RecordingSink {
    fn publish(&mut self, projection: &DagProjection) {
        self.published.push(projection.clone());
        Self::send_next(&self.tx, &mut self.after_publish);
    }

    fn show_detail(&mut self, run: &TaskRun, view: &StatusView) {
        self.details.push((run.clone(), view.clone()));
        Self::send_next(&self.tx, &mut self.after_detail);
    }
}

/// Event transport that records requests and fails the first
/// `failures` push / bulk push / stream attempts.
#[derive(Default)]
pub struct RecordingTransport {
    pub pushes: Mutex<Vec<PushEventRequest>>,
    pub bulk_pushes: Mutex<Vec<BulkPushEventRequest>>,
    pub logs: Mutex<Vec<PutLogRequest>>,
    pub streams: Mutex<Vec<PutStreamRequest>>,
    failures: AtomicU32,
    fail_logs: bool,
    attempts: AtomicU32,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(failures: u32) -> Self {
        Self {
            failures: AtomicU32::new(failures),
            ..Self::default()
        }
    }

    pub fn failing_logs() -> Self {
        Self {
            fail_logs: true,
            ..Self::default()
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn should_fail(&self) -> bool {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl EventTransport for RecordingTransport {
    fn push<'a>(
        &'a self,
        request: &'a PushEventRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PushedEvent>> + Send + 'a>> {
        Box::pin(async move {
            if self.should_fail() {
                return Err(RundagError::Other(anyhow::anyhow!("unavailable")));
            }
            self.pushes.lock().unwrap().push(request.clone());
            Ok(PushedEvent {
                event_id: format!("evt-{}", self.pushes.lock().unwrap().len()),
                key: request.key.clone(),
            })
        })
    }

    fn bulk_push<'a>(
        &'a self,
        request: &'a BulkPushEventRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PushedEvent>>> + Send + 'a>> {
        Box::pin(async move {
            if self.should_fail() {
                return Err(RundagError::Other(anyhow::anyhow!("unavailable")));
            }
            self.bulk_pushes.lock().unwrap().push(request.clone());
            Ok(request
                .events
                .iter()
                .enumerate()
                .map(|(i, e)| PushedEvent {
                    event_id: format!("bulk-{i}"),
                    key: e.key.clone(),
                })
                .collect())
        })
    }

    fn put_log<'a>(
        &'a self,
        request: &'a PutLogRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.fail_logs {
                return Err(RundagError::Other(anyhow::anyhow!("log sink down")));
            }
            self.logs.lock().unwrap().push(request.clone());
            Ok(())
        })
    }

    fn put_stream<'a>(
        &'a self,
        request: &'a PutStreamRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if self.should_fail() {
                return Err(RundagError::Other(anyhow::anyhow!("stream unavailable")));
            }
            self.streams.lock().unwrap().push(request.clone());
            Ok(())
        })
    }
}

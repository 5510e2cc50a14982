// src/events/transport.rs

//! Event transport abstraction.
//!
//! The client builds requests; a transport delivers them. The wire protocol
//! of the real event service is out of scope here, so the only production
//! transport writes requests as JSON lines.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, RundagError};
use crate::types::RunId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushEventRequest {
    pub key: String,
    /// JSON-encoded payload.
    pub payload: String,
    pub event_timestamp: DateTime<Utc>,
    /// JSON-encoded metadata object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPushEventRequest {
    pub events: Vec<PushEventRequest>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
    Debug,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutLogRequest {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub message: String,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

/// A chunk of streamed output for a task run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutStreamRequest {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub message: Vec<u8>,
    /// Position of the chunk within the run's stream, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<i64>,
}

/// Acknowledgement for one accepted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushedEvent {
    pub event_id: String,
    pub key: String,
}

type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

pub trait EventTransport: Send + Sync {
    fn push<'a>(&'a self, request: &'a PushEventRequest) -> TransportFuture<'a, PushedEvent>;

    fn bulk_push<'a>(
        &'a self,
        request: &'a BulkPushEventRequest,
    ) -> TransportFuture<'a, Vec<PushedEvent>>;

    fn put_log<'a>(&'a self, request: &'a PutLogRequest) -> TransportFuture<'a, ()>;

    fn put_stream<'a>(&'a self, request: &'a PutStreamRequest) -> TransportFuture<'a, ()>;
}

/// Writes every request as one JSON line to the wrapped writer.
pub struct JsonLinesTransport<W: Write + Send> {
    writer: Mutex<W>,
    next_id: AtomicU64,
}

impl<W: Write + Send> JsonLinesTransport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_line<T: Serialize>(&self, kind: &str, value: &T) -> Result<()> {
        let line = serde_json::to_string(&serde_json::json!({ "type": kind, "request": value }))?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| RundagError::Other(anyhow::anyhow!("event writer lock poisoned")))?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }

    fn ack(&self, key: &str) -> PushedEvent {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        PushedEvent {
            event_id: format!("evt-{id}"),
            key: key.to_string(),
        }
    }
}

impl<W: Write + Send> EventTransport for JsonLinesTransport<W> {
    fn push<'a>(&'a self, request: &'a PushEventRequest) -> TransportFuture<'a, PushedEvent> {
        Box::pin(async move {
            self.write_line("push", request)?;
            Ok(self.ack(&request.key))
        })
    }

    fn bulk_push<'a>(
        &'a self,
        request: &'a BulkPushEventRequest,
    ) -> TransportFuture<'a, Vec<PushedEvent>> {
        Box::pin(async move {
            self.write_line("bulk_push", request)?;
            Ok(request.events.iter().map(|e| self.ack(&e.key)).collect())
        })
    }

    fn put_log<'a>(&'a self, request: &'a PutLogRequest) -> TransportFuture<'a, ()> {
        Box::pin(async move { self.write_line("put_log", request) })
    }

    fn put_stream<'a>(&'a self, request: &'a PutStreamRequest) -> TransportFuture<'a, ()> {
        Box::pin(async move { self.write_line("put_stream", request) })
    }
}

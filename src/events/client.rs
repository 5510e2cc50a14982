// src/events/client.rs

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::EventsConfig;
use crate::errors::Result;
use crate::events::retry::{retry_with_backoff, RetryPolicy};
use crate::events::transport::{
    BulkPushEventRequest, EventTransport, LogLevel, PushEventRequest, PushedEvent, PutLogRequest,
    PutStreamRequest,
};

/// Options shared by a push call.
#[derive(Debug, Clone, Default)]
pub struct PushEventOptions {
    pub additional_metadata: Option<BTreeMap<String, String>>,
    pub priority: Option<i32>,
    pub scope: Option<String>,
}

/// One entry of a bulk push.
#[derive(Debug, Clone)]
pub struct EventWithMetadata<T> {
    pub payload: T,
    /// Takes precedence over the call-level metadata when set.
    pub additional_metadata: Option<serde_json::Value>,
    pub priority: Option<i32>,
    pub scope: Option<String>,
}

impl<T> EventWithMetadata<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            additional_metadata: None,
            priority: None,
            scope: None,
        }
    }
}

/// Prefix `key` with `namespace` unless it already carries it.
pub fn apply_namespace(key: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) if !ns.is_empty() && !key.starts_with(ns) => format!("{ns}{key}"),
        _ => key.to_string(),
    }
}

/// Client for the event-push API.
pub struct EventClient<T: EventTransport> {
    transport: T,
    namespace: Option<String>,
    retry: RetryPolicy,
    max_log_length: usize,
}

impl<T: EventTransport> EventClient<T> {
    pub fn new(transport: T, config: &EventsConfig) -> Self {
        Self {
            transport,
            namespace: config.namespace.clone(),
            retry: RetryPolicy::from(config),
            max_log_length: config.max_log_length,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    fn namespaced(&self, key: &str) -> String {
        apply_namespace(key, self.namespace.as_deref())
    }

    /// Push a single event, retrying transport failures with backoff.
    pub async fn push<P: Serialize>(
        &self,
        key: &str,
        payload: &P,
        options: PushEventOptions,
    ) -> Result<PushedEvent> {
        let key = self.namespaced(key);

        let request = PushEventRequest {
            key: key.clone(),
            payload: serde_json::to_string(payload)?,
            event_timestamp: Utc::now(),
            additional_metadata: options
                .additional_metadata
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            priority: options.priority,
            scope: options.scope,
        };

        let pushed = retry_with_backoff(&self.retry, "push event", || {
            self.transport.push(&request)
        })
        .await?;

        info!(key = %key, event_id = %pushed.event_id, "event pushed");
        Ok(pushed)
    }

    /// Push several events under one key.
    ///
    /// Per-event metadata wins over `options.additional_metadata`; priority
    /// and scope come from each event only.
    pub async fn bulk_push<P: Serialize>(
        &self,
        key: &str,
        inputs: &[EventWithMetadata<P>],
        options: PushEventOptions,
    ) -> Result<Vec<PushedEvent>> {
        let key = self.namespaced(key);
        let shared_metadata = options
            .additional_metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut events = Vec::with_capacity(inputs.len());
        for input in inputs {
            let additional_metadata = match &input.additional_metadata {
                Some(meta) => Some(serde_json::to_string(meta)?),
                None => shared_metadata.clone(),
            };
            events.push(PushEventRequest {
                key: key.clone(),
                payload: serde_json::to_string(&input.payload)?,
                event_timestamp: Utc::now(),
                additional_metadata,
                priority: input.priority,
                scope: input.scope.clone(),
            });
        }

        let request = BulkPushEventRequest { events };

        let pushed = retry_with_backoff(&self.retry, "bulk push events", || {
            self.transport.bulk_push(&request)
        })
        .await?;

        info!(key = %key, count = pushed.len(), "bulk events pushed");
        Ok(pushed)
    }

    /// Attach a log line to a task run. Fire and forget.
    ///
    /// Lines over the configured length are skipped; transport failures are
    /// logged and swallowed. Returns whether the line was delivered.
    pub async fn put_log(
        &self,
        run_id: &str,
        message: &str,
        level: Option<LogLevel>,
        metadata: Option<&serde_json::Value>,
    ) -> bool {
        let len = message.chars().count();
        if len > self.max_log_length {
            warn!(run_id, length = len, "log is too long, skipping");
            return false;
        }

        let metadata = match metadata.map(serde_json::to_string).transpose() {
            Ok(m) => m,
            Err(e) => {
                warn!(run_id, error = %e, "could not encode log metadata");
                None
            }
        };

        let request = PutLogRequest {
            run_id: run_id.to_string(),
            created_at: Utc::now(),
            message: message.to_string(),
            level: level.unwrap_or_default(),
            metadata,
        };

        match self.transport.put_log(&request).await {
            Ok(()) => true,
            Err(e) => {
                warn!(run_id, error = %e, "could not put log");
                false
            }
        }
    }

    /// Send a chunk of streamed output for a task run.
    ///
    /// Retried with backoff like pushes; a final failure is logged, not
    /// returned. Returns whether the chunk was delivered.
    pub async fn put_stream(&self, run_id: &str, data: impl AsRef<[u8]>, index: Option<i64>) -> bool {
        let request = PutStreamRequest {
            run_id: run_id.to_string(),
            created_at: Utc::now(),
            message: data.as_ref().to_vec(),
            event_index: index,
        };

        match retry_with_backoff(&self.retry, "put stream", || {
            self.transport.put_stream(&request)
        })
        .await
        {
            Ok(()) => true,
            Err(e) => {
                warn!(run_id, error = %e, "could not put stream");
                false
            }
        }
    }
}

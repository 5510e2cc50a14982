// src/events/retry.rs

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::EventsConfig;
use crate::errors::{Result, RundagError};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_factor: f64,
    pub max_delay_ms: u64,
}

impl From<&EventsConfig> for RetryPolicy {
    fn from(cfg: &EventsConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            initial_delay_ms: cfg.initial_delay_ms,
            backoff_factor: cfg.backoff_factor,
            max_delay_ms: cfg.max_delay_ms,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&EventsConfig::default())
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), capped at `max_delay_ms`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let base = (self.initial_delay_ms as f64) * self.backoff_factor.powi(exp);
        let delay = base.min(self.max_delay_ms as f64).round().max(0.0);
        Duration::from_millis(delay as u64)
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is used up.
///
/// The last error is reported as [`RundagError::EventPush`].
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => {
                return Err(RundagError::EventPush {
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    what,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed; retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

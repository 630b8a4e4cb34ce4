use super::{Mutation, MutationExecutor};
use crate::common::{RateLimitError, RateLimiter, RateLimiterConfig};
use crate::platform::PlatformError;
use crate::taskpool::TaskPool;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Delivery settings for the deferred mutation queue.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Deliveries allowed in flight at once. Above 1, completion order may
    /// differ from issue order.
    pub max_concurrent_requests: usize,
    pub requests_per_second: u32,
    pub burst_size: Option<u32>,
    /// Retries for transient failures; 0 disables retrying.
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 1,
            requests_per_second: 5,
            burst_size: None,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl ExecutorConfig {
    pub fn rate_limiter(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            requests_per_second: self.requests_per_second,
            burst_size: self.burst_size,
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

/// Queue that guarantees eventual delivery of deferred mutations.
///
/// Submissions go through a channel to a single dispatcher task, which waits
/// on the rate limiter and hands each mutation to a [`TaskPool`]. Transient
/// failures are retried with exponential backoff, or after the delay the
/// platform asked for when it rate limited us.
pub struct QueuedExecutor {
    sender: Mutex<Option<flume::Sender<Mutation>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedExecutor {
    /// Spawn the dispatcher. Must be called from within a tokio runtime.
    pub fn start(config: ExecutorConfig) -> Result<Self, RateLimitError> {
        let limiter = config.rate_limiter().build()?;
        let (sender, receiver) = flume::unbounded();
        let dispatcher = tokio::spawn(dispatch_loop(receiver, limiter, config));

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            dispatcher: Mutex::new(Some(dispatcher)),
        })
    }

    /// Close the queue and wait until every accepted mutation was delivered
    /// or given up on.
    pub async fn shutdown(&self) {
        self.sender
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let handle = self
            .dispatcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                log::error!("Mutation dispatcher terminated abnormally: {e}");
            }
        }
    }
}

impl MutationExecutor for QueuedExecutor {
    fn submit(&self, mutation: Mutation) {
        let guard = self.sender.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(sender) => {
                if let Err(flume::SendError(rejected)) = sender.send(mutation) {
                    log::error!("Mutation queue is gone, dropping: {}", rejected.kind());
                }
            }
            None => log::error!(
                "Mutation queue already shut down, dropping: {}",
                mutation.kind()
            ),
        }
    }
}

async fn dispatch_loop(
    receiver: flume::Receiver<Mutation>,
    limiter: RateLimiter,
    config: ExecutorConfig,
) {
    let pool = TaskPool::new(config.max_concurrent_requests);

    while let Ok(mutation) = receiver.recv_async().await {
        limiter.wait_until_ready().await;
        pool.execute(deliver(mutation, config.max_retries, config.retry_backoff()));
    }

    pool.close_and_wait().await;
    log::debug!("Mutation queue drained");
}

async fn deliver(mutation: Mutation, max_retries: u32, backoff: Duration) {
    let mut attempt: u32 = 0;
    loop {
        match mutation.send().await {
            Ok(()) => {
                log::debug!("Delivered: {}", mutation.kind());
                return;
            }
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = match &e {
                    PlatformError::RateLimited { retry_after } => *retry_after,
                    _ => backoff.saturating_mul(2u32.saturating_pow(attempt)),
                };
                attempt += 1;
                log::warn!(
                    "Retrying '{}' in {:?} (attempt {}/{}): {}",
                    mutation.kind(),
                    delay,
                    attempt,
                    max_retries,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!("Giving up on '{}': {}", mutation.kind(), e);
                return;
            }
        }
    }
}

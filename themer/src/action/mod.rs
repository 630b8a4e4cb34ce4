//! Dispatch disciplines for outbound mutation requests.
//!
//! Every change the applier makes to a guild is expressed as a [`Mutation`]:
//! a description ([`MutationKind`]) plus a request factory that produces a
//! fresh future each time it is sent, so a queue can retry it. How the
//! request is sent is decided by the [`ActionMode`] travelling with it:
//!
//! - [`ActionMode::Immediate`] sends the request and waits for it, logging a
//!   failure without reporting it to the caller.
//! - [`ActionMode::Deferred`] hands the mutation to a [`MutationExecutor`]
//!   and returns at once. [`QueuedExecutor`] delivers with rate limiting and
//!   retries; [`CollectingExecutor`] only records what was submitted.

pub mod queue;

pub use queue::{ExecutorConfig, QueuedExecutor};

use crate::platform::PlatformError;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};

pub type MutationFuture = BoxFuture<'static, Result<(), PlatformError>>;

type RequestFn = dyn Fn() -> MutationFuture + Send + Sync;

/// What a mutation changes, for logging and assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    SetServerIcon { bytes: usize },
    SetBotAvatar { bytes: usize },
    SetServerName { name: String },
    SetOwnNickname { nickname: String },
    SetRoleName { role_id: String, name: String },
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MutationKind::SetServerIcon { bytes } => write!(f, "set server icon ({bytes} bytes)"),
            MutationKind::SetBotAvatar { bytes } => write!(f, "set bot avatar ({bytes} bytes)"),
            MutationKind::SetServerName { name } => write!(f, "rename server to '{name}'"),
            MutationKind::SetOwnNickname { nickname } => write!(f, "set nickname to '{nickname}'"),
            MutationKind::SetRoleName { role_id, name } => {
                write!(f, "rename role {role_id} to '{name}'")
            }
        }
    }
}

/// A single outbound change request.
#[derive(Clone)]
pub struct Mutation {
    kind: MutationKind,
    request: Arc<RequestFn>,
}

impl Mutation {
    pub fn new<F, Fut>(kind: MutationKind, request: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), PlatformError>> + Send + 'static,
    {
        Self {
            kind,
            request: Arc::new(move || request().boxed()),
        }
    }

    pub fn kind(&self) -> &MutationKind {
        &self.kind
    }

    /// Build and return a fresh request future.
    pub fn send(&self) -> MutationFuture {
        (self.request)()
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Destination for deferred mutations.
pub trait MutationExecutor: Send + Sync {
    /// Accept a mutation for eventual delivery. Must not block.
    fn submit(&self, mutation: Mutation);
}

/// How each outbound mutation is dispatched.
#[derive(Clone, Default)]
pub enum ActionMode {
    /// Send and wait for completion; failures are only logged.
    #[default]
    Immediate,
    /// Hand off to an executor and continue without waiting.
    Deferred(Arc<dyn MutationExecutor>),
}

impl ActionMode {
    pub fn deferred(executor: Arc<dyn MutationExecutor>) -> Self {
        ActionMode::Deferred(executor)
    }

    pub async fn dispatch(&self, mutation: Mutation) {
        match self {
            ActionMode::Immediate => {
                let kind = mutation.kind().clone();
                match mutation.send().await {
                    Ok(()) => log::debug!("Completed: {kind}"),
                    Err(e) => log::warn!("Request failed ({kind}): {e}"),
                }
            }
            ActionMode::Deferred(executor) => {
                log::debug!("Queued: {}", mutation.kind());
                executor.submit(mutation);
            }
        }
    }
}

impl fmt::Debug for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionMode::Immediate => f.write_str("Immediate"),
            ActionMode::Deferred(_) => f.write_str("Deferred"),
        }
    }
}

/// Executor that keeps submitted mutations in memory instead of sending them.
///
/// Used for dry runs and for asserting issue order in tests.
#[derive(Default)]
pub struct CollectingExecutor {
    submitted: Mutex<Vec<Mutation>>,
}

impl CollectingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Mutation>> {
        self.submitted.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn kinds(&self) -> Vec<MutationKind> {
        self.lock().iter().map(|m| m.kind().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Send every collected mutation in submission order, returning the failures.
    pub async fn flush(&self) -> Vec<(MutationKind, PlatformError)> {
        let pending: Vec<Mutation> = std::mem::take(&mut *self.lock());
        let mut failures = Vec::new();
        for mutation in pending {
            if let Err(e) = mutation.send().await {
                failures.push((mutation.kind().clone(), e));
            }
        }
        failures
    }
}

impl MutationExecutor for CollectingExecutor {
    fn submit(&self, mutation: Mutation) {
        self.lock().push(mutation);
    }
}

//! Simulated asynchronous operations (payment, lookups, syncs).
//!
//! Each operation is started with [`EffectRunner::initiate`] and resolved with
//! [`PendingEffect::await_result`]. An operation runs to completion once
//! started: there is no cancellation and no retry. At most one operation of a
//! given kind can be in flight per owner (a session) at a time.

use dashmap::DashMap;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Authentication,
    Payment,
    Verification,
    DocumentUpload,
    CalendarSync,
    ReviewPost,
    AvailabilitySave,
    AiRequest,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EffectError {
    /// The same owner already has this kind of operation in flight
    #[error("A {0:?} operation is already in progress for this session")]
    OperationInProgress(EffectKind),

    /// The task running the operation panicked or was shut down
    #[error("{kind:?} operation did not complete: {message}")]
    Aborted { kind: EffectKind, message: String },
}

/// A started operation whose result has not been collected yet.
pub struct PendingEffect<T> {
    kind: EffectKind,
    handle: JoinHandle<T>,
}

impl<T> PendingEffect<T> {
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Waits for the operation to resolve.
    pub async fn await_result(self) -> Result<T, EffectError> {
        self.handle.await.map_err(|e| EffectError::Aborted {
            kind: self.kind,
            message: e.to_string(),
        })
    }
}

/// Runs simulated operations with a fixed delay and an in-flight guard.
#[derive(Default)]
pub struct EffectRunner {
    in_flight: DashMap<(String, EffectKind), Arc<tokio::sync::Mutex<()>>>,
}

impl EffectRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, owner: &str, kind: EffectKind) -> Arc<tokio::sync::Mutex<()>> {
        self.in_flight
            .entry((owner.to_string(), kind))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Starts `work` after `delay` on a background task.
    ///
    /// Fails immediately with [`EffectError::OperationInProgress`] when `owner`
    /// already has a `kind` operation running.
    pub fn initiate<T, F>(
        &self,
        owner: &str,
        kind: EffectKind,
        delay: Duration,
        work: F,
    ) -> Result<PendingEffect<T>, EffectError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.lock_for(owner, kind).try_lock_owned().map_err(|_| {
            warn!(?kind, "Rejected concurrent simulated operation");
            EffectError::OperationInProgress(kind)
        })?;

        debug!(?kind, delay_ms = delay.as_millis() as u64, "Starting simulated operation");
        let handle = tokio::spawn(async move {
            let _guard = guard;
            tokio::time::sleep(delay).await;
            work.await
        });

        Ok(PendingEffect { kind, handle })
    }

    /// Convenience for `initiate` followed by `await_result`.
    pub async fn run<T, F>(
        &self,
        owner: &str,
        kind: EffectKind,
        delay: Duration,
        work: F,
    ) -> Result<T, EffectError>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.initiate(owner, kind, delay, work)?
            .await_result()
            .await
    }

    /// Drops the guards of an owner that will never start another operation.
    pub fn forget_owner(&self, owner: &str) {
        self.in_flight.retain(|(o, _), _| o != owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_with_work_output() {
        let runner = EffectRunner::new();
        let result = runner
            .run("s", EffectKind::Payment, Duration::ZERO, async { 42 })
            .await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_second_operation_of_same_kind_is_rejected_while_in_flight() {
        let runner = EffectRunner::new();
        let first = runner
            .initiate("s", EffectKind::Payment, Duration::from_millis(50), async { true })
            .unwrap();

        let second = runner.initiate("s", EffectKind::Payment, Duration::ZERO, async { true });
        assert!(matches!(
            second,
            Err(EffectError::OperationInProgress(EffectKind::Payment))
        ));

        // Other kinds and other owners are independent
        assert!(runner
            .initiate("s", EffectKind::CalendarSync, Duration::ZERO, async {})
            .is_ok());
        assert!(runner
            .initiate("other", EffectKind::Payment, Duration::ZERO, async {})
            .is_ok());

        assert_eq!(first.await_result().await, Ok(true));
        assert!(runner
            .initiate("s", EffectKind::Payment, Duration::ZERO, async {})
            .is_ok());
    }

    #[tokio::test]
    async fn test_forget_owner_drops_guards() {
        let runner = EffectRunner::new();
        runner
            .run("s", EffectKind::Verification, Duration::ZERO, async {})
            .await
            .unwrap();
        runner.forget_owner("s");
        assert!(runner.in_flight.is_empty());
    }
}

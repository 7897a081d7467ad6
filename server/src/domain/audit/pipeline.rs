//! Audit Log Pipeline
//!
//! Request handlers enqueue entries through `AuditLogger` without waiting;
//! a single `AuditWriter` task drains the queue in order and persists each
//! entry, retrying while the database is locked.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::data::{AuditStore, DataError, NewAuditLog};
use crate::utils::retry::{RetryPolicy, retry_async};

/// Result of handing an entry to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    Queued,
    /// Queue at capacity; the entry was dropped
    QueueFull,
    /// Writer is gone; the entry was dropped
    Closed,
    /// Auditing is turned off
    Disabled,
}

/// Non-blocking producer side of the audit queue
#[derive(Debug, Clone)]
pub struct AuditLogger {
    tx: Option<mpsc::Sender<NewAuditLog>>,
}

impl AuditLogger {
    /// Create a logger and the receiver its writer should drain
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NewAuditLog>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Logger that records nothing
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Enqueue an entry, dropping it if the queue is full or closed
    pub fn record(&self, entry: NewAuditLog) -> EnqueueOutcome {
        let Some(tx) = &self.tx else {
            return EnqueueOutcome::Disabled;
        };
        match tx.try_send(entry) {
            Ok(()) => EnqueueOutcome::Queued,
            Err(TrySendError::Full(entry)) => {
                tracing::warn!(
                    method = %entry.method,
                    url = %entry.request_url,
                    "Audit queue full, dropping entry"
                );
                EnqueueOutcome::QueueFull
            }
            Err(TrySendError::Closed(entry)) => {
                tracing::warn!(
                    method = %entry.method,
                    url = %entry.request_url,
                    "Audit writer stopped, dropping entry"
                );
                EnqueueOutcome::Closed
            }
        }
    }
}

/// Consumer side: persists queued entries one at a time
pub struct AuditWriter {
    store: Arc<dyn AuditStore>,
    policy: RetryPolicy,
}

impl AuditWriter {
    pub fn new(store: Arc<dyn AuditStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Insert one entry, retrying only lock contention
    pub async fn persist(&self, entry: &NewAuditLog) -> Result<i64, DataError> {
        let result = retry_async(self.policy, DataError::is_locked, || {
            self.store.insert_audit_log(entry)
        })
        .await;

        match result {
            Ok((id, attempts)) => {
                tracing::trace!(id, attempts, "Audit entry persisted");
                Ok(id)
            }
            Err((e, attempts)) => {
                tracing::error!(
                    error = %e,
                    attempts,
                    method = %entry.method,
                    url = %entry.request_url,
                    "Failed to persist audit entry"
                );
                Err(e)
            }
        }
    }

    /// Spawn the writer task
    ///
    /// Runs until every logger is dropped or shutdown is signalled; on
    /// shutdown it keeps draining until the queue stays empty briefly.
    pub fn start(
        self,
        mut rx: mpsc::Receiver<NewAuditLog>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut shutdown_requested = false;
            let mut persisted = 0u64;

            loop {
                if shutdown_requested {
                    match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
                        Ok(Some(entry)) => {
                            if self.persist(&entry).await.is_ok() {
                                persisted += 1;
                            }
                            continue;
                        }
                        _ => break,
                    }
                }

                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        // A dropped sender counts as shutdown
                        if changed.is_err() || *shutdown_rx.borrow() {
                            tracing::debug!("AuditWriter received shutdown, draining...");
                            shutdown_requested = true;
                        }
                    }
                    entry = rx.recv() => {
                        match entry {
                            Some(entry) => {
                                if self.persist(&entry).await.is_ok() {
                                    persisted += 1;
                                }
                            }
                            None => break,
                        }
                    }
                }
            }
            tracing::debug!(persisted, "AuditWriter shutdown complete");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::data::{AuditLogFilter, AuditLogRow};

    /// Fails the first `failures` inserts with the given error kind
    struct FlakyStore {
        failures: u32,
        locked: bool,
        calls: AtomicU32,
        rows: Mutex<Vec<NewAuditLog>>,
    }

    impl FlakyStore {
        fn new(failures: u32, locked: bool) -> Arc<Self> {
            Arc::new(Self {
                failures,
                locked,
                calls: AtomicU32::new(0),
                rows: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }

        fn rows(&self) -> Vec<NewAuditLog> {
            self.rows.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditStore for FlakyStore {
        async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<i64, DataError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(if self.locked {
                    DataError::Locked("database is locked".into())
                } else {
                    DataError::Conflict("CHECK constraint failed".into())
                });
            }
            let mut rows = self.rows.lock().unwrap();
            rows.push(entry.clone());
            Ok(rows.len() as i64)
        }

        async fn list_audit_logs(
            &self,
            _filter: &AuditLogFilter,
        ) -> Result<Vec<AuditLogRow>, DataError> {
            Ok(Vec::new())
        }
    }

    fn entry(n: u16) -> NewAuditLog {
        NewAuditLog {
            created_at: i64::from(n),
            actor_id: -1,
            method: "GET".into(),
            request_url: format!("127.0.0.1:1 /api/v1/units?page={}", n),
            request_body: String::new(),
            response_code: 200,
        }
    }

    fn writer(store: Arc<FlakyStore>) -> AuditWriter {
        AuditWriter::new(store, RetryPolicy::new(5, Duration::from_millis(50)))
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (logger, _rx) = AuditLogger::channel(2);
        assert_eq!(logger.record(entry(1)), EnqueueOutcome::Queued);
        assert_eq!(logger.record(entry(2)), EnqueueOutcome::Queued);
        assert_eq!(logger.record(entry(3)), EnqueueOutcome::QueueFull);
    }

    #[test]
    fn test_closed_queue_drops() {
        let (logger, rx) = AuditLogger::channel(4);
        drop(rx);
        assert_eq!(logger.record(entry(1)), EnqueueOutcome::Closed);
    }

    #[test]
    fn test_disabled_logger() {
        let logger = AuditLogger::disabled();
        assert!(!logger.is_enabled());
        assert_eq!(logger.record(entry(1)), EnqueueOutcome::Disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_recovers_from_few_lock_errors() {
        for failures in 0..5 {
            let store = FlakyStore::new(failures, true);
            let result = writer(store.clone()).persist(&entry(1)).await;
            assert!(result.is_ok(), "failed with {} lock errors", failures);
            assert_eq!(store.calls(), failures + 1);
            assert_eq!(store.rows().len(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_persist_gives_up_after_five_lock_errors() {
        let store = FlakyStore::new(5, true);
        let err = writer(store.clone()).persist(&entry(1)).await.unwrap_err();
        assert!(err.is_locked());
        assert_eq!(store.calls(), 5);
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_persist_does_not_retry_other_errors() {
        let store = FlakyStore::new(1, false);
        assert!(writer(store.clone()).persist(&entry(1)).await.is_err());
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_writer_preserves_fifo_order() {
        let store = FlakyStore::new(0, true);
        let (logger, rx) = AuditLogger::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = writer(store.clone()).start(rx, shutdown_rx);

        for n in 1..=5 {
            assert_eq!(logger.record(entry(n)), EnqueueOutcome::Queued);
        }
        drop(logger);
        handle.await.unwrap();

        let order: Vec<i64> = store.rows().iter().map(|e| e.created_at).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_writer_drains_on_shutdown() {
        let store = FlakyStore::new(0, true);
        let (logger, rx) = AuditLogger::channel(16);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        for n in 1..=3 {
            logger.record(entry(n));
        }
        shutdown_tx.send(true).unwrap();

        let handle = writer(store.clone()).start(rx, shutdown_rx);
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(store.rows().len(), 3);
        // Logger still alive: later entries are dropped, not blocked on
        assert_eq!(logger.record(entry(4)), EnqueueOutcome::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_writer_survives_lost_entry() {
        let store = FlakyStore::new(5, true);
        let (logger, rx) = AuditLogger::channel(16);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = writer(store.clone()).start(rx, shutdown_rx);

        logger.record(entry(1));
        logger.record(entry(2));
        drop(logger);
        handle.await.unwrap();

        // First entry exhausted its attempts, second one landed
        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].created_at, 2);
    }
}

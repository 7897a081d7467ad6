//! Graceful shutdown
//!
//! One watch channel fans the stop signal out to the HTTP server and every
//! background task. Tasks are registered by name so a slow drain shows up
//! in the logs.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;
use crate::data::SqliteService;

struct NamedTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

/// Coordinates the stop signal and the order things are torn down in
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    tasks: Arc<Mutex<Vec<NamedTask>>>,
    database: Arc<SqliteService>,
    timeout: Duration,
}

impl ShutdownService {
    pub fn new(database: Arc<SqliteService>) -> Self {
        Self::with_timeout(database, Duration::from_secs(SHUTDOWN_TIMEOUT_SECS))
    }

    /// `timeout` bounds the wait for all registered tasks together
    pub fn with_timeout(database: Arc<SqliteService>, timeout: Duration) -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            tasks: Arc::default(),
            database,
            timeout,
        }
    }

    pub async fn register(&self, name: &'static str, handle: JoinHandle<()>) {
        self.tasks.lock().await.push(NamedTask { name, handle });
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Signal stop, let background tasks finish, then close the database.
    ///
    /// The audit writer drains its queue while the pool is still open, so
    /// entries accepted before the signal are not lost. Returns the names
    /// of tasks that did not finish in time.
    pub async fn shutdown(&self) -> Vec<&'static str> {
        self.trigger();

        let tasks = std::mem::take(&mut *self.tasks.lock().await);
        tracing::debug!(count = tasks.len(), "Waiting for background tasks");

        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut unfinished = Vec::new();
        for NamedTask { name, mut handle } in tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => tracing::debug!(task = name, "Background task finished"),
                Ok(Err(e)) => tracing::error!(task = name, error = %e, "Background task panicked"),
                Err(_) => {
                    tracing::warn!(task = name, "Background task did not finish in time");
                    handle.abort();
                    unfinished.push(name);
                }
            }
        }

        if let Err(e) = self.database.checkpoint().await {
            tracing::warn!(error = %e, "Final WAL checkpoint failed");
        }
        self.database.close().await;
        tracing::info!("Shutdown complete");

        unfinished
    }

    /// Resolves once shutdown is triggered; suitable for axum's graceful shutdown
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.tx.subscribe();
        async move {
            let _ = rx.wait_for(|&stop| stop).await;
        }
    }

    /// Trigger on Ctrl+C or SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                use tokio::signal::unix::{SignalKind, signal};
                match signal(SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to install SIGTERM handler");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("Received Ctrl+C"),
                _ = terminate => tracing::info!("Received SIGTERM"),
            }

            service.trigger();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service(timeout: Duration) -> ShutdownService {
        let database = Arc::new(SqliteService::in_memory().await.unwrap());
        ShutdownService::with_timeout(database, timeout)
    }

    #[tokio::test]
    async fn test_trigger_is_observed_by_subscribers() {
        let shutdown = service(Duration::from_secs(1)).await;
        let rx = shutdown.subscribe();
        assert!(!shutdown.is_triggered());

        shutdown.trigger();
        assert!(shutdown.is_triggered());
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_wait_resolves_after_trigger() {
        let shutdown = service(Duration::from_secs(1)).await;
        let waiter = tokio::spawn(shutdown.wait());
        tokio::task::yield_now().await;

        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_draining_task() {
        let shutdown = service(Duration::from_secs(1)).await;
        let mut rx = shutdown.subscribe();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            let _ = rx.wait_for(|&stop| stop).await;
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = done_tx.send(());
        });
        shutdown.register("drain", handle).await;

        assert!(shutdown.shutdown().await.is_empty());
        assert!(done_rx.await.is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_reports_stuck_task() {
        let shutdown = service(Duration::from_millis(20)).await;
        let handle = tokio::spawn(std::future::pending::<()>());
        shutdown.register("stuck", handle).await;

        assert_eq!(shutdown.shutdown().await, vec!["stuck"]);
    }
}

//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::api::auth::bootstrap;
use crate::api::auth::{PasswordService, TokenIssuer};
use crate::api::{ApiServer, AuthManager};
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::core::storage::AppStorage;
use crate::data::{CredentialStore, NewAuditLog, SqliteService};
use crate::domain::audit::{AuditLogger, AuditWriter};
use crate::utils::retry::RetryPolicy;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub storage: AppStorage,
    pub database: Arc<SqliteService>,
    pub auth: Arc<AuthManager>,
    pub audit: AuditLogger,
    /// Taken by `start_background_tasks`
    audit_writer: Option<(AuditWriter, mpsc::Receiver<NewAuditLog>)>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        match command {
            Some(Commands::Start) | None => {
                let app = Self::init(&cli_config).await?;
                Self::start_server(app).await
            }
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let storage = AppStorage::init(&config).await?;

        let database = Arc::new(
            SqliteService::init(&storage, &config.database)
                .await
                .context("Failed to initialize SQLite")?,
        );
        database
            .seed_roles()
            .await
            .context("Failed to seed roles")?;

        let auth = Arc::new(AuthManager::new(
            database.clone(),
            TokenIssuer::new(config.auth.token_bytes, config.auth.session_ttl),
            PasswordService::new(),
        ));
        bootstrap::ensure_admin(&auth, storage.bootstrap_file()).await?;

        let (audit, audit_writer) = if config.audit.enabled {
            let (logger, rx) = AuditLogger::channel(config.audit.queue_capacity);
            let writer = AuditWriter::new(
                database.clone(),
                RetryPolicy::new(config.audit.max_attempts, config.audit.retry_delay),
            );
            (logger, Some((writer, rx)))
        } else {
            tracing::warn!("Request auditing DISABLED");
            (AuditLogger::disabled(), None)
        };

        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            storage,
            database,
            auth,
            audit,
            audit_writer,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}_server=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(mut app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        app.start_background_tasks().await;

        tracing::info!(
            host = %app.config.server.host,
            port = app.config.server.port,
            data_dir = %app.storage.data_dir().display(),
            audit = app.audit.is_enabled(),
            "Starting LabTrack server"
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        let unfinished = app.shutdown.shutdown().await;
        if !unfinished.is_empty() {
            tracing::warn!(tasks = ?unfinished, "Some background tasks were aborted");
        }

        Ok(())
    }

    pub async fn start_background_tasks(&mut self) {
        self.shutdown
            .register(
                "wal-checkpoint",
                self.database
                    .start_checkpoint_task(self.shutdown.subscribe()),
            )
            .await;

        if let Some((writer, rx)) = self.audit_writer.take() {
            self.shutdown
                .register("audit-writer", writer.start(rx, self.shutdown.subscribe()))
                .await;
        }

        tracing::debug!("Background tasks started");
    }
}

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_AUDIT_MAX_ATTEMPTS, DEFAULT_AUDIT_QUEUE_CAPACITY,
    DEFAULT_AUDIT_RETRY_DELAY_MS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SESSION_TTL_SECS,
    DEFAULT_TOKEN_BYTES, MIN_TOKEN_BYTES, SQLITE_BUSY_TIMEOUT_SECS, SQLITE_MAX_CONNECTIONS,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub path: Option<String>,
    pub busy_timeout_secs: Option<u64>,
    pub max_connections: Option<u32>,
}

/// Authentication configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuthFileConfig {
    pub session_ttl_secs: Option<u64>,
    pub token_bytes: Option<usize>,
    pub bootstrap_file: Option<String>,
}

/// Audit pipeline configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuditFileConfig {
    pub enabled: Option<bool>,
    pub queue_capacity: Option<usize>,
    pub max_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub auth: Option<AuthFileConfig>,
    pub audit: Option<AuditFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Unknown top-level keys (possible typos)
    fn unknown_fields(&self) -> Vec<String> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn warn_unknown_fields(&self) {
        let keys = self.unknown_fields();
        if !keys.is_empty() {
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Overlay `other` on top of `self`; set fields in `other` win
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                current.host = server.host;
            }
            if server.port.is_some() {
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                current.path = database.path;
            }
            if database.busy_timeout_secs.is_some() {
                current.busy_timeout_secs = database.busy_timeout_secs;
            }
            if database.max_connections.is_some() {
                current.max_connections = database.max_connections;
            }
        }

        if let Some(auth) = other.auth {
            let current = self.auth.get_or_insert_with(AuthFileConfig::default);
            if auth.session_ttl_secs.is_some() {
                current.session_ttl_secs = auth.session_ttl_secs;
            }
            if auth.token_bytes.is_some() {
                current.token_bytes = auth.token_bytes;
            }
            if auth.bootstrap_file.is_some() {
                current.bootstrap_file = auth.bootstrap_file;
            }
        }

        if let Some(audit) = other.audit {
            let current = self.audit.get_or_insert_with(AuditFileConfig::default);
            if audit.enabled.is_some() {
                current.enabled = audit.enabled;
            }
            if audit.queue_capacity.is_some() {
                current.queue_capacity = audit.queue_capacity;
            }
            if audit.max_attempts.is_some() {
                current.max_attempts = audit.max_attempts;
            }
            if audit.retry_delay_ms.is_some() {
                current.retry_delay_ms = audit.retry_delay_ms;
            }
        }
    }
}

// =============================================================================
// Runtime Config Structs (final merged configuration)
// =============================================================================

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// SQLite configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Explicit database file; `None` means `<data dir>/data.db`
    pub path: Option<PathBuf>,
    pub busy_timeout: Duration,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout: Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS),
            max_connections: SQLITE_MAX_CONNECTIONS,
        }
    }
}

/// Session and credential configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub session_ttl: Duration,
    pub token_bytes: usize,
    /// Explicit bootstrap file; `None` means `<data dir>/auth_init.txt`
    pub bootstrap_file: Option<PathBuf>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            token_bytes: DEFAULT_TOKEN_BYTES,
            bootstrap_file: None,
        }
    }
}

/// Audit pipeline configuration
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub enabled: bool,
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: DEFAULT_AUDIT_QUEUE_CAPACITY,
            max_attempts: DEFAULT_AUDIT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_AUDIT_RETRY_DELAY_MS),
        }
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.labtrack/labtrack.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config)?;
        tracing::debug!(config = ?config, "Configuration loaded");
        Ok(config)
    }

    /// Defaults only, no files or CLI
    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
            },
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            audit: AuditConfig::default(),
        }
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_auth = file_config.auth.unwrap_or_default();
        let file_audit = file_config.audit.unwrap_or_default();

        let server = ServerConfig {
            host: cli
                .host
                .clone()
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT),
        };

        let database_defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            path: file_database.path.map(|p| expand_path(&p)),
            busy_timeout: file_database
                .busy_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(database_defaults.busy_timeout),
            max_connections: file_database
                .max_connections
                .unwrap_or(database_defaults.max_connections),
        };

        let auth_defaults = AuthConfig::default();
        let token_bytes = file_auth.token_bytes.unwrap_or(auth_defaults.token_bytes);
        if token_bytes < MIN_TOKEN_BYTES {
            anyhow::bail!(
                "auth.token_bytes must be at least {} (got {})",
                MIN_TOKEN_BYTES,
                token_bytes
            );
        }
        let auth = AuthConfig {
            session_ttl: file_auth
                .session_ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(auth_defaults.session_ttl),
            token_bytes,
            bootstrap_file: cli
                .bootstrap_file
                .as_ref()
                .map(|p| expand_path(&p.to_string_lossy()))
                .or_else(|| file_auth.bootstrap_file.map(|p| expand_path(&p))),
        };

        let audit_defaults = AuditConfig::default();
        let audit = AuditConfig {
            enabled: cli
                .audit
                .or(file_audit.enabled)
                .unwrap_or(audit_defaults.enabled),
            queue_capacity: cli
                .audit_queue_capacity
                .or(file_audit.queue_capacity)
                .unwrap_or(audit_defaults.queue_capacity),
            max_attempts: file_audit
                .max_attempts
                .unwrap_or(audit_defaults.max_attempts),
            retry_delay: file_audit
                .retry_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(audit_defaults.retry_delay),
        };

        if audit.queue_capacity == 0 {
            anyhow::bail!("audit.queue_capacity must be greater than zero");
        }
        if audit.max_attempts == 0 {
            anyhow::bail!("audit.max_attempts must be greater than zero");
        }

        Ok(Self {
            server,
            database,
            auth,
            audit,
        })
    }
}

/// Get the profile directory config path (~/.labtrack/labtrack.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "LabTrack";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "labtrack";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".labtrack";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "labtrack.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "LABTRACK_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "LABTRACK_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "LABTRACK_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "LABTRACK_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8000;

/// Prefix shared by every API route
pub const API_PREFIX: &str = "/api/v1";

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "LABTRACK_DATA_DIR";

/// Environment variable for the bootstrap admin credentials file
pub const ENV_BOOTSTRAP_FILE: &str = "LABTRACK_BOOTSTRAP_FILE";

// =============================================================================
// Environment Variables - Audit
// =============================================================================

/// Environment variable to enable/disable request auditing
pub const ENV_AUDIT_ENABLED: &str = "LABTRACK_AUDIT_ENABLED";

/// Environment variable for the audit queue capacity
pub const ENV_AUDIT_QUEUE_CAPACITY: &str = "LABTRACK_AUDIT_QUEUE_CAPACITY";

// =============================================================================
// SQLite
// =============================================================================

/// SQLite database filename
pub const SQLITE_DB_FILENAME: &str = "data.db";

/// Busy timeout before SQLite reports "database is locked"
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Maximum pool connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// WAL checkpoint interval
pub const SQLITE_CHECKPOINT_INTERVAL_SECS: u64 = 300;

/// Pages before automatic WAL checkpoint
pub const SQLITE_WAL_AUTOCHECKPOINT: &str = "1000";

// =============================================================================
// Authentication
// =============================================================================

/// Role id that the admin gate requires
pub const ADMIN_ROLE_ID: i64 = 1;

/// Role seeded alongside admin
pub const LAB_TECHNICIAN_ROLE_ID: i64 = 2;

/// Username of the bootstrap administrator
pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";

/// Bootstrap credentials file name (in the data directory)
pub const BOOTSTRAP_FILE_NAME: &str = "auth_init.txt";

/// Session lifetime (12 hours)
pub const DEFAULT_SESSION_TTL_SECS: u64 = 12 * 60 * 60;

/// Random bytes per session token
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Lower bound on token entropy
pub const MIN_TOKEN_BYTES: usize = 32;

/// Username/password length limits for new accounts
pub const CREDENTIAL_MIN_LEN: u64 = 8;
pub const CREDENTIAL_MAX_LEN: u64 = 50;

/// Actor id recorded for requests without an identity
pub const ANONYMOUS_ACTOR_ID: i64 = -1;

// =============================================================================
// Audit Pipeline
// =============================================================================

/// Bounded audit queue size
pub const DEFAULT_AUDIT_QUEUE_CAPACITY: usize = 1000;

/// Insert attempts while the database is locked
pub const DEFAULT_AUDIT_MAX_ATTEMPTS: u32 = 5;

/// Fixed delay between locked-insert attempts
pub const DEFAULT_AUDIT_RETRY_DELAY_MS: u64 = 50;

/// Replacement for password values in audit records
pub const AUDIT_MASK: &str = "****";

// =============================================================================
// HTTP Limits
// =============================================================================

/// Default request body limit
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Graceful shutdown timeout
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

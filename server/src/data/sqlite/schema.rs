//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Roles (must be before users due to FK)
-- =============================================================================
CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- =============================================================================
-- 2. Users (credentials + current session)
-- =============================================================================
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    display_name TEXT,
    role_id INTEGER REFERENCES roles(id) ON DELETE SET NULL,
    access_token TEXT UNIQUE,
    token_expires_at INTEGER,
    CHECK (access_token IS NULL OR token_expires_at IS NOT NULL)
);

-- =============================================================================
-- 3. Audit log (user_id is not a FK: -1 marks anonymous requests)
-- =============================================================================
CREATE TABLE IF NOT EXISTS logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_at INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    http_method TEXT NOT NULL,
    request_url TEXT NOT NULL,
    request_body TEXT NOT NULL,
    response_code INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_logs_created_at ON logs(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_logs_user_id ON logs(user_id);
"#;

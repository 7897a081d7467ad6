//! Repository traits for the data layer
//!
//! Auth and audit code depend on these traits rather than on SQLite
//! directly, so tests can swap in in-memory fakes.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    AuditLogFilter, AuditLogRow, NewAuditLog, NewUser, RoleRow, UserRow, UserUpdate,
};

// ============================================================================
// Credential Store Trait
// ============================================================================

/// Users, roles and their session columns
#[async_trait]
pub trait CredentialStore: Send + Sync {
    // ==================== Role Operations ====================

    /// Insert the default roles if the table is empty
    async fn seed_roles(&self) -> Result<(), DataError>;

    async fn list_roles(&self) -> Result<Vec<RoleRow>, DataError>;

    async fn get_role(&self, id: i64) -> Result<Option<RoleRow>, DataError>;

    // ==================== User Operations ====================

    /// Create a user; a taken username is `DataError::Conflict`
    async fn create_user(&self, user: &NewUser) -> Result<UserRow, DataError>;

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError>;

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError>;

    /// Exact match on the stored access token
    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>, DataError>;

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError>;

    /// Apply set fields only; `None` if no such user
    async fn update_user(&self, id: i64, update: &UserUpdate)
    -> Result<Option<UserRow>, DataError>;

    /// Write token and expiry in one statement; `false` if no row matched
    async fn set_session(
        &self,
        id: i64,
        token: Option<&str>,
        expires_at: Option<i64>,
    ) -> Result<bool, DataError>;

    /// `false` if no row matched
    async fn delete_user(&self, id: i64) -> Result<bool, DataError>;
}

// ============================================================================
// Audit Store Trait
// ============================================================================

/// Append-only audit log
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Insert one entry, returning its id
    async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<i64, DataError>;

    /// Newest first
    async fn list_audit_logs(&self, filter: &AuditLogFilter)
    -> Result<Vec<AuditLogRow>, DataError>;
}

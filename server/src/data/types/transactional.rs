//! Credential store types (users and roles)

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// User types
// ============================================================================

/// User row from database, including credential and session columns
#[derive(Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
    /// Joined from `roles.name`
    pub role_name: Option<String>,
    pub access_token: Option<String>,
    /// Absolute deadline in epoch seconds; set whenever `access_token` is
    pub token_expires_at: Option<i64>,
}

// Hash and token stay out of logs
impl fmt::Debug for UserRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRow")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("display_name", &self.display_name)
            .field("role_id", &self.role_id)
            .field("role_name", &self.role_name)
            .field("has_session", &self.access_token.is_some())
            .field("token_expires_at", &self.token_expires_at)
            .finish()
    }
}

/// Input for creating a user
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
}

/// Partial update of the non-credential user fields
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub display_name: Option<String>,
    pub role_id: Option<i64>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.role_id.is_none()
    }
}

// ============================================================================
// Role types
// ============================================================================

/// Role row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
}

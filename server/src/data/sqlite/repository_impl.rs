//! Store trait implementations for SQLite
//!
//! `SqliteService` implements both `CredentialStore` and `AuditStore`, so an
//! `Arc<SqliteService>` coerces into either trait object.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::{AuditStore, CredentialStore};
use crate::data::types::{
    AuditLogFilter, AuditLogRow, NewAuditLog, NewUser, RoleRow, UserRow, UserUpdate,
};

use super::SqliteService;
use super::repositories::{audit_log, role, user};

#[async_trait]
impl CredentialStore for SqliteService {
    // ==================== Role Operations ====================

    async fn seed_roles(&self) -> Result<(), DataError> {
        role::seed_roles(self.pool()).await.map_err(Into::into)
    }

    async fn list_roles(&self) -> Result<Vec<RoleRow>, DataError> {
        role::list_roles(self.pool()).await.map_err(Into::into)
    }

    async fn get_role(&self, id: i64) -> Result<Option<RoleRow>, DataError> {
        role::get_role(self.pool(), id).await.map_err(Into::into)
    }

    // ==================== User Operations ====================

    async fn create_user(&self, new_user: &NewUser) -> Result<UserRow, DataError> {
        user::create_user(self.pool(), new_user)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRow>, DataError> {
        user::get_user(self.pool(), id).await.map_err(Into::into)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_username(self.pool(), username)
            .await
            .map_err(Into::into)
    }

    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRow>, DataError> {
        user::get_by_token(self.pool(), token)
            .await
            .map_err(Into::into)
    }

    async fn list_users(&self) -> Result<Vec<UserRow>, DataError> {
        user::list_users(self.pool()).await.map_err(Into::into)
    }

    async fn update_user(
        &self,
        id: i64,
        update: &UserUpdate,
    ) -> Result<Option<UserRow>, DataError> {
        user::update_user(self.pool(), id, update)
            .await
            .map_err(Into::into)
    }

    async fn set_session(
        &self,
        id: i64,
        token: Option<&str>,
        expires_at: Option<i64>,
    ) -> Result<bool, DataError> {
        user::set_session(self.pool(), id, token, expires_at)
            .await
            .map_err(Into::into)
    }

    async fn delete_user(&self, id: i64) -> Result<bool, DataError> {
        user::delete_user(self.pool(), id)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl AuditStore for SqliteService {
    async fn insert_audit_log(&self, entry: &NewAuditLog) -> Result<i64, DataError> {
        audit_log::insert_log(self.pool(), entry)
            .await
            .map_err(Into::into)
    }

    async fn list_audit_logs(
        &self,
        filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLogRow>, DataError> {
        audit_log::list_logs(self.pool(), filter)
            .await
            .map_err(Into::into)
    }
}

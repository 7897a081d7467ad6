//! Authentication manager
//!
//! Owns the login, logout and token lookup rules. Every time-dependent
//! operation takes `now` (epoch seconds) so expiry can be tested exactly.

use std::sync::Arc;

use thiserror::Error;

use super::context::Identity;
use super::password::{PasswordError, PasswordService};
use super::token::{IssuedToken, TokenError, TokenIssuer};
use crate::data::{CredentialStore, DataError, NewUser, UserRow};
use crate::utils::crypto;

#[derive(Debug, Error)]
pub enum LoginError {
    /// Unknown user or wrong password; callers must not tell these apart
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] DataError),
    /// The session update matched no row
    #[error("Session was not persisted")]
    NotPersisted,
}

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Unauthorized")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error(transparent)]
    Store(#[from] DataError),
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Invalid role")]
    UnknownRole,
    #[error("Username already exists")]
    UsernameTaken,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(DataError),
}

impl From<DataError> for RegisterError {
    fn from(e: DataError) -> Self {
        match e {
            DataError::Conflict(_) => Self::UsernameTaken,
            other => Self::Store(other),
        }
    }
}

/// Main authentication manager
pub struct AuthManager {
    store: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
    passwords: PasswordService,
}

impl AuthManager {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        issuer: TokenIssuer,
        passwords: PasswordService,
    ) -> Self {
        Self {
            store,
            issuer,
            passwords,
        }
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Verify credentials and start a new session, replacing any previous one.
    ///
    /// The returned token is exactly what was written to the store.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: i64,
    ) -> Result<IssuedToken, LoginError> {
        let Some(user) = self.store.get_user_by_username(username).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Err(LoginError::InvalidCredentials);
        };

        let matches = self
            .passwords
            .verify(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            tracing::debug!(user_id = user.id, "Login with wrong password");
            return Err(LoginError::InvalidCredentials);
        }

        let issued = self.issuer.issue(now)?;
        let updated = self
            .store
            .set_session(user.id, Some(&issued.token), Some(issued.expires_at))
            .await?;
        if !updated {
            return Err(LoginError::NotPersisted);
        }

        tracing::info!(user_id = user.id, expires_at = issued.expires_at, "User logged in");
        Ok(issued)
    }

    /// Clear the stored session. Returns `false` if the user no longer exists.
    pub async fn logout(&self, user_id: i64) -> Result<bool, DataError> {
        let cleared = self.store.set_session(user_id, None, None).await?;
        if cleared {
            tracing::info!(user_id, "User logged out");
        }
        Ok(cleared)
    }

    /// Resolve a bearer token to an identity. Read-only.
    pub async fn authenticate(&self, token: &str, now: i64) -> Result<Identity, AuthFailure> {
        let user = self
            .store
            .get_user_by_token(token)
            .await?
            .ok_or(AuthFailure::Invalid)?;

        let stored = user.access_token.as_deref().unwrap_or_default();
        if !crypto::constant_time_eq(stored, token) {
            return Err(AuthFailure::Invalid);
        }

        match user.token_expires_at {
            Some(expires_at) if now < expires_at => Ok(Identity::from(&user)),
            _ => Err(AuthFailure::Expired),
        }
    }

    /// Create an account with a hashed password
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        display_name: Option<String>,
        role_id: i64,
    ) -> Result<UserRow, RegisterError> {
        if self.store.get_role(role_id).await?.is_none() {
            return Err(RegisterError::UnknownRole);
        }

        let password_hash = self.passwords.hash(password.to_string()).await?;
        let user = self
            .store
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash,
                display_name,
                role_id: Some(role_id),
            })
            .await?;

        tracing::info!(user_id = user.id, role_id, "User created");
        Ok(user)
    }
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

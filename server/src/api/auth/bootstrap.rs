//! First-run administrator account
//!
//! The credentials file holds `username=` and `password=` lines. It is
//! only read when no `admin` user exists yet.

use std::path::Path;

use anyhow::{Context, Result};

use super::manager::{AuthManager, RegisterError};
use crate::core::constants::{ADMIN_ROLE_ID, BOOTSTRAP_ADMIN_USERNAME};

#[derive(Debug, PartialEq, Eq)]
struct BootstrapCredentials {
    username: String,
    password: String,
}

fn parse_credentials(content: &str) -> Option<BootstrapCredentials> {
    let mut username = None;
    let mut password = None;
    for line in content.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("username=") {
            username = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("password=") {
            password = Some(value.trim().to_string());
        }
    }
    match (username, password) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some(BootstrapCredentials { username, password })
        }
        _ => None,
    }
}

/// Create the admin from `path` unless one already exists.
///
/// Returns whether an account was created.
pub async fn ensure_admin(manager: &AuthManager, path: &Path) -> Result<bool> {
    let existing = manager
        .store()
        .get_user_by_username(BOOTSTRAP_ADMIN_USERNAME)
        .await
        .context("Failed to look up admin user")?;
    if existing.is_some() {
        tracing::debug!("Admin user already exists");
        return Ok(false);
    }

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(
                path = %path.display(),
                "No admin user and no bootstrap credentials file; skipping admin creation"
            );
            return Ok(false);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let Some(creds) = parse_credentials(&content) else {
        anyhow::bail!(
            "Bootstrap file {} must contain username= and password= lines",
            path.display()
        );
    };

    match manager
        .register(
            &creds.username,
            &creds.password,
            Some(creds.username.clone()),
            ADMIN_ROLE_ID,
        )
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, username = %user.username, "Bootstrap admin created");
            Ok(true)
        }
        Err(RegisterError::UsernameTaken) => {
            tracing::debug!(username = %creds.username, "Bootstrap user already exists");
            Ok(false)
        }
        Err(e) => Err(anyhow::anyhow!(e).context("Failed to create bootstrap admin")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::manager::tests::manager_with_store;
    use crate::data::CredentialStore;

    #[test]
    fn test_parse_credentials() {
        let creds = parse_credentials("username=admin\npassword= s3cret-pass \n").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "s3cret-pass");
        assert!(parse_credentials("username=admin\n").is_none());
        assert!(parse_credentials("username=\npassword=x").is_none());
    }

    #[tokio::test]
    async fn test_creates_admin_once() {
        let (manager, db) = manager_with_store().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_init.txt");
        std::fs::write(&path, "username=admin\npassword=admin-pass\n").unwrap();

        assert!(ensure_admin(&manager, &path).await.unwrap());
        assert!(!ensure_admin(&manager, &path).await.unwrap());

        let admin = db.get_user_by_username("admin").await.unwrap().unwrap();
        assert_eq!(admin.role_id, Some(ADMIN_ROLE_ID));
        assert_eq!(admin.display_name.as_deref(), Some("admin"));
        assert_ne!(admin.password_hash, "admin-pass");
    }

    #[tokio::test]
    async fn test_missing_file_is_skipped() {
        let (manager, db) = manager_with_store().await;
        let dir = tempfile::tempdir().unwrap();

        assert!(
            !ensure_admin(&manager, &dir.path().join("missing.txt"))
                .await
                .unwrap()
        );
        assert!(db.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let (manager, _db) = manager_with_store().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_init.txt");
        std::fs::write(&path, "just some text").unwrap();

        assert!(ensure_admin(&manager, &path).await.is_err());
    }
}

//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\LabTrack\` | `~/Library/Application Support/LabTrack/` | `$XDG_DATA_HOME/labtrack/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::config::AppConfig;
use super::constants::{
    APP_DOT_FOLDER, APP_NAME, BOOTSTRAP_FILE_NAME, ENV_DATA_DIR, SQLITE_DB_FILENAME,
};
use crate::utils::file::expand_path;

/// Data subdirectories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSubdir {
    Sqlite,
}

impl DataSubdir {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DataSubdir::Sqlite => "sqlite",
        }
    }

    /// Subdirectories created on startup
    pub const fn all() -> &'static [DataSubdir] {
        &[DataSubdir::Sqlite]
    }
}

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
    database_path: PathBuf,
    bootstrap_file: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init(config: &AppConfig) -> Result<Self> {
        let data_dir = Self::resolve_data_dir();

        // Create directories first (canonicalize requires path to exist)
        Self::ensure_directories(&data_dir).await?;

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);
        let storage = Self::from_parts(data_dir, config);

        if let Some(parent) = storage.database_path.parent() {
            tokio::fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        tracing::debug!(
            data_dir = %storage.data_dir.display(),
            database = %storage.database_path.display(),
            "Storage initialized"
        );

        Ok(storage)
    }

    fn from_parts(data_dir: PathBuf, config: &AppConfig) -> Self {
        let database_path = config.database.path.clone().unwrap_or_else(|| {
            data_dir
                .join(DataSubdir::Sqlite.as_str())
                .join(SQLITE_DB_FILENAME)
        });
        let bootstrap_file = config
            .auth
            .bootstrap_file
            .clone()
            .unwrap_or_else(|| data_dir.join(BOOTSTRAP_FILE_NAME));
        Self {
            data_dir,
            database_path,
            bootstrap_file,
        }
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        // Fallback to local .labtrack
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    async fn ensure_directories(data_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        for subdir in DataSubdir::all() {
            let path = data_dir.join(subdir.as_str());
            tokio::fs::create_dir_all(&path).await.with_context(|| {
                format!(
                    "Failed to create {} directory: {}",
                    subdir.as_str(),
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// SQLite database file
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Bootstrap admin credentials file
    pub fn bootstrap_file(&self) -> &Path {
        &self.bootstrap_file
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf, config: &AppConfig) -> Self {
        Self::from_parts(data_dir, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> AppConfig {
        AppConfig::for_test()
    }

    #[test]
    fn test_data_subdir_as_str() {
        assert_eq!(DataSubdir::Sqlite.as_str(), "sqlite");
        assert_eq!(DataSubdir::all(), &[DataSubdir::Sqlite]);
    }

    #[test]
    fn test_default_paths_live_in_data_dir() {
        let storage = AppStorage::from_parts(PathBuf::from("/var/lib/labtrack"), &default_config());
        assert_eq!(storage.data_dir(), Path::new("/var/lib/labtrack"));
        assert_eq!(
            storage.database_path(),
            Path::new("/var/lib/labtrack/sqlite/data.db")
        );
        assert_eq!(
            storage.bootstrap_file(),
            Path::new("/var/lib/labtrack/auth_init.txt")
        );
    }

    #[test]
    fn test_configured_paths_win() {
        let mut config = default_config();
        config.database.path = Some(PathBuf::from("/tmp/custom.db"));
        config.auth.bootstrap_file = Some(PathBuf::from("/etc/labtrack/init.txt"));

        let storage = AppStorage::from_parts(PathBuf::from("/data"), &config);
        assert_eq!(storage.database_path(), Path::new("/tmp/custom.db"));
        assert_eq!(
            storage.bootstrap_file(),
            Path::new("/etc/labtrack/init.txt")
        );
    }

    #[tokio::test]
    async fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("data");
        AppStorage::ensure_directories(&root).await.unwrap();
        assert!(root.join("sqlite").is_dir());
    }
}

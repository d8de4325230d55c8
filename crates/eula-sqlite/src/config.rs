//! Connection settings

use crate::error::{SqliteError, SqliteResult};
use crate::schema;
use eula_config::{StorageConfig, MEMORY_PATH};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// SQLite connection configuration
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Database file, or `:memory:`
    pub path: PathBuf,
    /// Enable write-ahead logging
    pub wal_mode: bool,
    /// Milliseconds to wait on a locked database
    pub busy_timeout_ms: u32,
    /// Page cache size (negative values are KiB)
    pub cache_size: i64,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(MEMORY_PATH),
            wal_mode: true,
            busy_timeout_ms: 5000,
            cache_size: -2000,
        }
    }
}

impl SqliteConfig {
    /// File-backed database at `path`
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// In-memory database, WAL does not apply
    pub fn memory() -> Self {
        Self {
            wal_mode: false,
            ..Self::default()
        }
    }

    pub fn is_memory(&self) -> bool {
        self.path.to_str() == Some(MEMORY_PATH)
    }

    /// Open the user database, creating parent directories, and bring the
    /// schema up to date.
    pub fn open(&self) -> SqliteResult<Connection> {
        info!(path = ?self.path, "Opening SQLite user database");

        let conn = if self.is_memory() {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    SqliteError::Connection(format!("{}: {}", parent.display(), e))
                })?;
            }
            Connection::open(&self.path)
                .map_err(|e| SqliteError::Connection(format!("{}: {}", self.path.display(), e)))?
        };

        if self.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        }
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA cache_size = {};",
            self.busy_timeout_ms, self.cache_size
        ))?;
        schema::apply_migrations(&conn)?;
        debug!(version = schema::SCHEMA_VERSION, "User database ready");

        Ok(conn)
    }
}

impl From<&StorageConfig> for SqliteConfig {
    fn from(storage: &StorageConfig) -> Self {
        if storage.is_memory() {
            Self::memory()
        } else {
            Self::new(&storage.path)
        }
    }
}

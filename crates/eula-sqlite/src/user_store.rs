//! RecordStore implementation for SQLite
//!
//! One connection behind a mutex serves every call; each call runs on the
//! blocking pool.

use crate::config::SqliteConfig;
use crate::error::{SqliteError, SqliteResult};
use async_trait::async_trait;
use eula_core::{Authority, RecordStore, StoreResult, UserId, UserPatch, UserRecord};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tracing::debug;

const UPSERT_USER: &str = r#"
    INSERT INTO users (id, authority, eula)
    VALUES (?1, COALESCE(?2, 1), COALESCE(?3, 0))
    ON CONFLICT(id) DO UPDATE SET
        authority = COALESCE(?2, authority),
        eula = COALESCE(?3, eula),
        updated_at = datetime('now')
"#;

const SELECT_USER: &str = "SELECT id, authority, eula FROM users WHERE id = ?1";

/// SQLite implementation of [`RecordStore`]
#[derive(Clone)]
pub struct SqliteUserStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteUserStore {
    /// Open the database described by `config`.
    pub fn open(config: &SqliteConfig) -> SqliteResult<Self> {
        Ok(Self {
            conn: Arc::new(Mutex::new(config.open()?)),
        })
    }

    /// In-memory store
    pub fn memory() -> SqliteResult<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Number of stored users
    pub async fn count(&self) -> StoreResult<usize> {
        self.blocking(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Run `f` against the connection on the blocking pool.
    async fn blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> SqliteResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || f(&mut conn.lock()))
            .await
            .map_err(SqliteError::from)?
            .map_err(Into::into)
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: UserId(row.get(0)?),
        authority: row.get(1)?,
        eula: row.get(2)?,
    })
}

fn upsert(conn: &Connection, user: UserId, patch: &UserPatch) -> SqliteResult<()> {
    conn.execute(UPSERT_USER, params![user.0, patch.authority, patch.eula])?;
    Ok(())
}

fn select(conn: &Connection, user: UserId) -> SqliteResult<Option<UserRecord>> {
    Ok(conn
        .query_row(SELECT_USER, [user.0], row_to_record)
        .optional()?)
}

#[async_trait]
impl RecordStore for SqliteUserStore {
    async fn get(&self, user: UserId) -> StoreResult<Option<UserRecord>> {
        self.blocking(move |conn| select(conn, user)).await
    }

    async fn set(&self, user: UserId, patch: UserPatch) -> StoreResult<UserRecord> {
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            upsert(&tx, user, &patch)?;
            let record = tx.query_row(SELECT_USER, [user.0], row_to_record)?;
            tx.commit()?;
            debug!(%user, authority = record.authority, eula = record.eula, "User record written");
            Ok(record)
        })
        .await
    }

    async fn find_by_authority(&self, authority: Authority) -> StoreResult<Vec<UserRecord>> {
        self.blocking(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, authority, eula FROM users WHERE authority = ?1 ORDER BY id")?;
            let records = stmt
                .query_map([authority], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
    }

    /// All patches are applied in one transaction.
    async fn set_many(&self, updates: Vec<(UserId, UserPatch)>) -> StoreResult<usize> {
        self.blocking(move |conn| {
            let tx = conn.transaction()?;
            for (user, patch) in &updates {
                upsert(&tx, *user, patch)?;
            }
            tx.commit()?;
            debug!(count = updates.len(), "User records written");
            Ok(updates.len())
        })
        .await
    }
}

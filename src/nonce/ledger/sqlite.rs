//! SQLite ledger backend.
//!
//! Persists consumed tokens so single-use guarantees survive restarts of a
//! single-instance deployment.

use super::{LedgerEntry, LedgerStats, TokenLedger};
use crate::NonceError;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based ledger.
///
/// # Example
///
/// ```rust
/// use action_nonce::ledger::{SqliteLedger, TokenLedger};
///
/// # async fn example() -> Result<(), action_nonce::NonceError> {
/// let ledger = SqliteLedger::new(":memory:")?;
/// ledger.init().await?;
/// ledger.mark_used("key", 4600, 1000).await?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteLedger {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Opens a ledger at `db_path`, or an in-memory database for `":memory:"`.
    pub fn new(db_path: &str) -> Result<Self, NonceError> {
        let connection = if db_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(db_path)
        }?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, NonceError> {
        self.connection
            .lock()
            .map_err(|_| NonceError::StorageError("ledger connection poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<(), NonceError> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS used_token (
                replay_key TEXT PRIMARY KEY NOT NULL,
                expires_at INTEGER NOT NULL,
                used_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_used_token_expires_at ON used_token (expires_at)",
            [],
        )?;

        Ok(())
    }
}

#[async_trait]
impl TokenLedger for SqliteLedger {
    async fn init(&self) -> Result<(), NonceError> {
        self.init_schema()
    }

    async fn mark_used(&self, key: &str, expires_at: i64, used_at: i64) -> Result<(), NonceError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO used_token (replay_key, expires_at, used_at) VALUES (?1, ?2, ?3)",
            params![key, expires_at, used_at],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(sqlite_err, _)
                if sqlite_err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                NonceError::DuplicateNonce
            }
            other => NonceError::from(other),
        })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<LedgerEntry>, NonceError> {
        let conn = self.lock()?;
        let entry = conn
            .query_row(
                "SELECT replay_key, expires_at, used_at FROM used_token WHERE replay_key = ?1",
                params![key],
                |row| {
                    Ok(LedgerEntry {
                        key: row.get(0)?,
                        expires_at: row.get(1)?,
                        used_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    async fn cleanup_expired(&self, now: i64) -> Result<usize, NonceError> {
        let conn = self.lock()?;
        let changes = conn.execute(
            "DELETE FROM used_token WHERE expires_at < ?1",
            params![now],
        )?;
        Ok(changes)
    }

    async fn get_stats(&self) -> Result<LedgerStats, NonceError> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM used_token", [], |row| row.get(0))?;

        let page_count: i64 = conn.query_row("PRAGMA page_count", [], |row| row.get(0))?;
        let page_size: i64 = conn.query_row("PRAGMA page_size", [], |row| row.get(0))?;
        let total_records = usize::try_from(count)
            .map_err(|_| NonceError::StorageError(format!("invalid row count {count}")))?;

        Ok(LedgerStats {
            total_records,
            backend_info: format!(
                "SQLite ledger ({} bytes, {} pages)",
                page_count * page_size,
                page_count
            ),
        })
    }
}

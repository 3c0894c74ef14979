//! SQLite persistence for [`UserProgress`] with optimistic concurrency.
//!
//! A learner's progress may be written from several devices, and a flaky
//! network may replay the same request. Every row carries a version; a save
//! only succeeds against the version it was read at. A lost race surfaces as
//! [`StoreError::Conflict`], which callers report to the UI as retryable.

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{Result, StoreError};
use crate::progress::UserProgress;

/// A stored record together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedProgress {
    pub progress: UserProgress,
    pub version: u64,
}

/// Progress records keyed by user id.
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open (or create) the store at `path`.
    ///
    /// # Errors
    /// Returns [`StoreError::OpenFailed`] if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(std::time::Duration::from_millis(250))?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open `progress.db` in the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open_default() -> Result<Self> {
        Self::open(&super::data_dir()?.join("progress.db"))
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_progress (
                user_id    TEXT PRIMARY KEY,
                version    INTEGER NOT NULL,
                payload    TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Read a learner's record.
    ///
    /// # Errors
    /// Returns a query error, or [`StoreError::Corrupt`] if the payload
    /// cannot be decoded.
    pub fn load(&self, user_id: &str) -> Result<Option<VersionedProgress>> {
        read_row(&self.conn, user_id)
    }

    /// Write a record read at `expected_version` (`None` for a new learner).
    /// Returns the new version.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the stored version differs from
    /// `expected_version`, or a query error.
    pub fn save(
        &mut self,
        user_id: &str,
        progress: &UserProgress,
        expected_version: Option<u64>,
    ) -> Result<u64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let version = write_row(&tx, user_id, progress, expected_version)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(version)
    }

    /// Atomic read-modify-write of one learner's record.
    ///
    /// `init` builds the record for a learner seen for the first time. `f`
    /// receives the current record and returns the replacement plus any
    /// output to hand back to the caller.
    ///
    /// # Errors
    /// Returns [`StoreError::Locked`] when another writer holds the database
    /// past the busy timeout, or any load/save error.
    pub fn modify<T>(
        &mut self,
        user_id: &str,
        init: impl FnOnce() -> UserProgress,
        f: impl FnOnce(&UserProgress) -> (UserProgress, T),
    ) -> Result<(UserProgress, T)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;

        let (current, expected_version) = match read_row(&tx, user_id)? {
            Some(row) => (row.progress, Some(row.version)),
            None => (init(), None),
        };

        let (next, output) = f(&current);
        write_row(&tx, user_id, &next, expected_version)?;
        tx.commit().map_err(StoreError::from)?;
        Ok((next, output))
    }

    /// Remove a learner's record. Returns whether a row existed.
    ///
    /// # Errors
    /// Returns a query error.
    pub fn delete(&mut self, user_id: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM user_progress WHERE user_id = ?1", params![user_id])?;
        Ok(n > 0)
    }
}

fn read_row(conn: &Connection, user_id: &str) -> Result<Option<VersionedProgress>> {
    let row = conn
        .query_row(
            "SELECT version, payload FROM user_progress WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    let Some((version, payload)) = row else {
        return Ok(None);
    };
    let progress = serde_json::from_str(&payload).map_err(|e| StoreError::Corrupt {
        key: user_id.to_string(),
        message: e.to_string(),
    })?;
    Ok(Some(VersionedProgress {
        progress,
        version: version.max(0) as u64,
    }))
}

fn write_row(
    conn: &Connection,
    user_id: &str,
    progress: &UserProgress,
    expected_version: Option<u64>,
) -> Result<u64> {
    let payload = serde_json::to_string(progress)?;
    let now = Utc::now().to_rfc3339();

    let (changed, new_version) = match expected_version {
        None => {
            let n = conn.execute(
                "INSERT OR IGNORE INTO user_progress (user_id, version, payload, updated_at)
                 VALUES (?1, 1, ?2, ?3)",
                params![user_id, payload, now],
            )?;
            (n, 1)
        }
        Some(expected) => {
            let next = expected + 1;
            let n = conn.execute(
                "UPDATE user_progress SET version = ?1, payload = ?2, updated_at = ?3
                 WHERE user_id = ?4 AND version = ?5",
                params![next as i64, payload, now, user_id, expected as i64],
            )?;
            (n, next)
        }
    };

    if changed == 0 {
        let found = conn
            .query_row(
                "SELECT version FROM user_progress WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .unwrap_or(0)
            .max(0) as u64;
        let expected = expected_version.unwrap_or(0);
        tracing::warn!(user_id, expected, found, "progress write lost a race");
        return Err(StoreError::Conflict {
            user_id: user_id.to_string(),
            expected,
            found,
        }
        .into());
    }

    Ok(new_version)
}

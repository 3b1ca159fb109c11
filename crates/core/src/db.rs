// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed storage for offline sync state.
//!
//! One database file holds three independent tables: `pending_actions`
//! (the replay queue), `response_cache` (read-through cache) and `sync_meta`
//! (small key/value state such as the last sync time). Each component opens
//! its own [`Database`] handle and touches only its own table.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::action::{Headers, Method, PendingAction};
use crate::cache::CachedResponse;
use crate::clock::ActionId;
use crate::error::{Error, Result};

/// SQL schema for the offline sync database.
pub const SCHEMA: &str = r#"
-- Deferred mutating requests, replayed oldest first
CREATE TABLE IF NOT EXISTS pending_actions (
    id TEXT PRIMARY KEY,
    wall_ms INTEGER NOT NULL,
    seq INTEGER NOT NULL,
    url TEXT NOT NULL,
    method TEXT NOT NULL,
    headers TEXT NOT NULL DEFAULT '{}',  -- JSON object
    body TEXT NOT NULL DEFAULT '',
    enqueued_at INTEGER NOT NULL
);

-- Last successful response per normalized URL
CREATE TABLE IF NOT EXISTS response_cache (
    url TEXT PRIMARY KEY,
    status INTEGER NOT NULL,
    content_type TEXT,
    body TEXT NOT NULL,
    stored_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
);

-- Sync bookkeeping
CREATE TABLE IF NOT EXISTS sync_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_pending_order ON pending_actions(enqueued_at, wall_ms, seq);
CREATE INDEX IF NOT EXISTS idx_cache_stored ON response_cache(stored_at);
CREATE INDEX IF NOT EXISTS idx_cache_expires ON response_cache(expires_at);
"#;

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| corrupted(format!("invalid value '{value}' in column '{column}'")))
}

fn corrupted(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(Error::CorruptedData(message)),
    )
}

/// Millisecond timestamps are `u64` in memory and `INTEGER` (i64) in SQLite.
fn ms_to_sql(value: u64, column: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::CorruptedData(format!("{column} {value} exceeds the storable range")))
}

fn ms_from_row(row: &rusqlite::Row<'_>, idx: usize) -> std::result::Result<u64, rusqlite::Error> {
    let value: i64 = row.get(idx)?;
    u64::try_from(value).map_err(|_| corrupted(format!("negative timestamp {value} in column {idx}")))
}

const ACTION_COLUMNS: &str = "id, url, method, headers, body, enqueued_at";

fn action_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<PendingAction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let method: String = row.get(2)?;
    let headers: String = row.get(3)?;
    let headers: Headers = serde_json::from_str(&headers)
        .map_err(|e| corrupted(format!("invalid headers for action '{id}': {e}")))?;

    Ok(PendingAction {
        id: parse_db::<ActionId>(&id, "id")?,
        url: row.get(1)?,
        method: parse_db::<Method>(&method, "method")?,
        headers,
        body: row.get(4)?,
        enqueued_at: ms_from_row(row, 5)?,
    })
}

fn cached_from_row(row: &rusqlite::Row<'_>) -> std::result::Result<CachedResponse, rusqlite::Error> {
    Ok(CachedResponse {
        url: row.get(0)?,
        status: row.get(1)?,
        content_type: row.get(2)?,
        body: row.get(3)?,
        stored_at: ms_from_row(row, 4)?,
        expires_at: ms_from_row(row, 5)?,
    })
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with offline sync operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // WAL so the CLI and the daemon can share the file
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ------------------------------------------------------------------
    // pending_actions
    // ------------------------------------------------------------------

    /// Insert a pending action.
    ///
    /// Fails with [`Error::DuplicateAction`] if the id is already stored.
    pub fn insert_action(&self, action: &PendingAction) -> Result<()> {
        let headers = serde_json::to_string(&action.headers)?;
        let wall_ms = ms_to_sql(action.id.wall_ms, "wall_ms")?;
        let enqueued_at = ms_to_sql(action.enqueued_at, "enqueued_at")?;
        let result = self.conn.execute(
            "INSERT INTO pending_actions (id, wall_ms, seq, url, method, headers, body, enqueued_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                action.id.to_string(),
                wall_ms,
                action.id.seq,
                action.url,
                action.method.as_str(),
                headers,
                action.body,
                enqueued_at,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::DuplicateAction(action.id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List all pending actions, oldest first.
    pub fn list_actions(&self) -> Result<Vec<PendingAction>> {
        let sql = format!(
            "SELECT {ACTION_COLUMNS} FROM pending_actions
             ORDER BY enqueued_at ASC, wall_ms ASC, seq ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let actions = stmt
            .query_map([], action_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(actions)
    }

    /// Get a single pending action.
    pub fn get_action(&self, id: &ActionId) -> Result<Option<PendingAction>> {
        let sql = format!("SELECT {ACTION_COLUMNS} FROM pending_actions WHERE id = ?1");
        let action =
            self.conn.query_row(&sql, params![id.to_string()], action_from_row).optional()?;
        Ok(action)
    }

    /// Delete a pending action. Returns true if a row was removed.
    pub fn delete_action(&self, id: &ActionId) -> Result<bool> {
        let removed =
            self.conn.execute("DELETE FROM pending_actions WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    /// Number of pending actions.
    pub fn count_actions(&self) -> Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM pending_actions", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// The greatest stored action id, used to seed id generation after a restart.
    pub fn latest_action_id(&self) -> Result<Option<ActionId>> {
        let id: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM pending_actions ORDER BY wall_ms DESC, seq DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        id.map(|s| s.parse()).transpose()
    }

    // ------------------------------------------------------------------
    // response_cache
    // ------------------------------------------------------------------

    /// Store or overwrite a cached response.
    pub fn put_cached(&self, entry: &CachedResponse) -> Result<()> {
        let stored_at = ms_to_sql(entry.stored_at, "stored_at")?;
        let expires_at = ms_to_sql(entry.expires_at, "expires_at")?;
        self.conn.execute(
            "INSERT OR REPLACE INTO response_cache
             (url, status, content_type, body, stored_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.url,
                entry.status,
                entry.content_type,
                entry.body,
                stored_at,
                expires_at,
            ],
        )?;
        Ok(())
    }

    /// Get the cached response for a normalized URL, expired or not.
    pub fn get_cached(&self, url: &str) -> Result<Option<CachedResponse>> {
        let entry = self
            .conn
            .query_row(
                "SELECT url, status, content_type, body, stored_at, expires_at
                 FROM response_cache WHERE url = ?1",
                params![url],
                cached_from_row,
            )
            .optional()?;
        Ok(entry)
    }

    /// Delete a cached response. Returns true if a row was removed.
    pub fn delete_cached(&self, url: &str) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM response_cache WHERE url = ?1", params![url])?;
        Ok(removed > 0)
    }

    /// Delete entries whose expiry is at or before `now_ms`.
    pub fn purge_expired(&self, now_ms: u64) -> Result<usize> {
        let now = i64::try_from(now_ms).unwrap_or(i64::MAX);
        let removed =
            self.conn.execute("DELETE FROM response_cache WHERE expires_at <= ?1", params![now])?;
        Ok(removed)
    }

    /// Keep only the `max_entries` most recently stored entries.
    pub fn trim_cache(&self, max_entries: usize) -> Result<usize> {
        let keep = i64::try_from(max_entries).unwrap_or(i64::MAX);
        let removed = self.conn.execute(
            "DELETE FROM response_cache WHERE url NOT IN (
                 SELECT url FROM response_cache ORDER BY stored_at DESC, url ASC LIMIT ?1
             )",
            params![keep],
        )?;
        Ok(removed)
    }

    /// Number of cached responses.
    pub fn count_cached(&self) -> Result<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM response_cache", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    // ------------------------------------------------------------------
    // sync_meta
    // ------------------------------------------------------------------

    /// Read a metadata value.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM sync_meta WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Write a metadata value.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sync_meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;

//! SQLite-backed slot storage.
//!
//! # Responsibility
//! - Map slot reads/writes onto the `slots` table.
//!
//! # Invariants
//! - The connection must carry the slot schema (see [`crate::db::open_db`]).
//! - Writes are single-statement upserts, so each slot write is atomic.

use crate::repo::slot_repo::{RepoError, RepoResult, SlotRepository};
use rusqlite::{params, Connection, OptionalExtension};

/// Slot repository over one owned SQLite connection.
pub struct SqliteSlotRepository {
    conn: Connection,
}

impl SqliteSlotRepository {
    /// Wraps a bootstrapped connection, rejecting one without the `slots` table.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_slot_table_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Gives the connection back, e.g. for inspection in tests.
    pub fn into_inner(self) -> Connection {
        self.conn
    }
}

impl SlotRepository for SqliteSlotRepository {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_slot(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn ensure_slot_table_ready(conn: &Connection) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = 'slots'
        );",
        [],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::Unavailable(
            "required table `slots` is missing; open it with `open_db`".to_string(),
        ))
    }
}

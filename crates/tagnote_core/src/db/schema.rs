//! Slot database schema.
//!
//! The slot store has exactly one schema. `PRAGMA user_version` records it so
//! a database written by a newer build is refused instead of misread.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`.
pub const SCHEMA_VERSION: u32 = 1;

const SLOTS_SQL: &str = include_str!("slots.sql");

/// Creates the `slots` table on a fresh database; no-op when already current.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    if found > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SLOTS_SQL)?;
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!("event=db_schema module=db status=created version={SCHEMA_VERSION}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, SCHEMA_VERSION};
    use rusqlite::Connection;

    #[test]
    fn ensure_schema_twice_keeps_version_and_rows() {
        let mut conn = Connection::open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        conn.execute("INSERT INTO slots (key, value) VALUES ('notes', '[]')", [])
            .unwrap();

        ensure_schema(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(rows, 1);
    }
}

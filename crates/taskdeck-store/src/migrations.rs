// SPDX-License-Identifier: Apache-2.0

use crate::StoreError;
use rusqlite::Connection;

/// Ordered migration batches. `user_version` records how many have run.
/// Append only; never edit a shipped batch.
pub const MIGRATIONS: &[&str] = &["CREATE TABLE todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        done INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
    );"];

pub fn schema_version(conn: &Connection) -> Result<u32, StoreError> {
    let version: u32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Applies pending batches in order. Idempotent: a second call is a no-op.
pub fn migrate(conn: &Connection) -> Result<u32, StoreError> {
    let mut version = schema_version(conn)? as usize;
    if version > MIGRATIONS.len() {
        return Err(StoreError::Backend(format!(
            "database schema version {version} is newer than this binary supports ({})",
            MIGRATIONS.len()
        )));
    }
    while version < MIGRATIONS.len() {
        conn.execute_batch(MIGRATIONS[version])?;
        version += 1;
        conn.pragma_update(None, "user_version", version as u32)?;
    }
    Ok(version as u32)
}

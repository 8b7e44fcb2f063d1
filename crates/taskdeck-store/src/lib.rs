#![forbid(unsafe_code)]
//! SQLite storage for to-do items.
//!
//! The schema is managed through numbered migration batches tracked with the
//! `user_version` pragma; `SqliteStore::open` applies pending migrations
//! before handing the connection out, so callers never see a stale schema.

use rusqlite::{Connection, OptionalExtension};
use std::fmt::{Display, Formatter};
use std::path::Path;
use taskdeck_model::{Title, TodoId, TodoItem};

mod migrations;

pub use migrations::{migrate, schema_version, MIGRATIONS};

pub const CRATE_NAME: &str = "taskdeck-store";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row with the requested id.
    NotFound(TodoId),
    /// Anything the database layer reports.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "to-do item {id} not found"),
            Self::Backend(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Backend(e.to_string())
    }
}

pub trait TodoStore {
    fn insert(&mut self, title: &Title) -> Result<TodoItem, StoreError>;
    fn get(&mut self, id: TodoId) -> Result<TodoItem, StoreError>;
    /// All items, id ascending.
    fn list(&mut self) -> Result<Vec<TodoItem>, StoreError>;
    fn set_done(&mut self, id: TodoId, done: bool) -> Result<(), StoreError>;
    /// Flip completion state; returns the new state.
    fn toggle(&mut self, id: TodoId) -> Result<bool, StoreError>;
    fn rename(&mut self, id: TodoId, title: &Title) -> Result<(), StoreError>;
    fn delete(&mut self, id: TodoId) -> Result<(), StoreError>;
    /// Cheap round-trip used by the health endpoint.
    fn ping(&mut self) -> Result<(), StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    // Single setup path so file-backed and in-memory connections never
    // drift in pragmas or schema.
    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrate(&conn)?;
        Ok(Self { conn })
    }

    /// Migration level of this connection's schema.
    pub fn schema_version(&self) -> Result<u32, StoreError> {
        schema_version(&self.conn)
    }

    fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, bool, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
    }

    fn item_from_parts(parts: (i64, String, bool, String)) -> Result<TodoItem, StoreError> {
        let (id, title, done, created_at) = parts;
        let title = Title::parse(&title)
            .map_err(|e| StoreError::Backend(format!("corrupt title in row {id}: {e}")))?;
        Ok(TodoItem {
            id: TodoId(id),
            title,
            done,
            created_at,
        })
    }
}

impl TodoStore for SqliteStore {
    fn insert(&mut self, title: &Title) -> Result<TodoItem, StoreError> {
        self.conn.execute(
            "INSERT INTO todos (title, done) VALUES (?1, 0)",
            [title.as_str()],
        )?;
        let id = TodoId(self.conn.last_insert_rowid());
        self.get(id)
    }

    fn get(&mut self, id: TodoId) -> Result<TodoItem, StoreError> {
        let parts = self
            .conn
            .query_row(
                "SELECT id, title, done, created_at FROM todos WHERE id = ?1",
                [id.0],
                Self::row_to_item,
            )
            .optional()?
            .ok_or(StoreError::NotFound(id))?;
        Self::item_from_parts(parts)
    }

    fn list(&mut self) -> Result<Vec<TodoItem>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, done, created_at FROM todos ORDER BY id ASC")?;
        let rows = stmt.query_map([], Self::row_to_item)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(Self::item_from_parts(row?)?);
        }
        Ok(items)
    }

    fn set_done(&mut self, id: TodoId, done: bool) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE todos SET done = ?1 WHERE id = ?2",
            rusqlite::params![done, id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn toggle(&mut self, id: TodoId) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute("UPDATE todos SET done = NOT done WHERE id = ?1", [id.0])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(self.get(id)?.done)
    }

    fn rename(&mut self, id: TodoId, title: &Title) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE todos SET title = ?1 WHERE id = ?2",
            rusqlite::params![title.as_str(), id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn delete(&mut self, id: TodoId) -> Result<(), StoreError> {
        let changed = self.conn.execute("DELETE FROM todos WHERE id = ?1", [id.0])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn ping(&mut self) -> Result<(), StoreError> {
        self.conn
            .query_row("SELECT count(*) FROM todos", [], |row| {
                row.get::<_, i64>(0)
            })?;
        Ok(())
    }
}

use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::StoreResult;

/// Write counter of a key. A missing key has revision 0.
pub type Revision = u64;

/// A stored value together with the revision it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub value: String,
    pub revision: Revision,
}

/// Storage manages the SQLite key-value table.
/// Each key holds one string slot, like a browser's local storage, plus a
/// revision bumped on every write.
pub struct Storage {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Storage {
    /// Open (or create) the database file at `db_path`.
    pub fn open(db_path: &Path) -> StoreResult<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!(path = %db_path.display(), "storage opened");

        let storage = Storage {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// A throwaway store that lives as long as the connection.
    pub fn in_memory() -> StoreResult<Self> {
        let storage = Storage {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Create the key-value table if it doesn't exist.
    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key         TEXT PRIMARY KEY,
                value       TEXT NOT NULL,
                revision    INTEGER NOT NULL DEFAULT 1
            )",
            [],
        )?;

        debug!("storage schema initialized");
        Ok(())
    }

    /// Path of the database file, `None` for in-memory storage
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn get(&self, key: &str) -> StoreResult<Option<Entry>> {
        let entry = self
            .conn
            .query_row(
                "SELECT value, revision FROM kv WHERE key = ?1",
                params![key],
                |row| {
                    Ok(Entry {
                        value: row.get(0)?,
                        revision: row.get::<_, i64>(1)? as Revision,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// Write `value` regardless of the current revision.
    pub fn set(&self, key: &str, value: &str) -> StoreResult<Revision> {
        let revision: i64 = self.conn.query_row(
            "INSERT INTO kv (key, value, revision) VALUES (?1, ?2, 1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, revision = kv.revision + 1
             RETURNING revision",
            params![key, value],
            |row| row.get(0),
        )?;
        Ok(revision as Revision)
    }

    /// Write `value` only if the key is still at `expected`.
    /// Returns the new revision, or `None` when someone else wrote first.
    pub fn compare_and_set(
        &self,
        key: &str,
        value: &str,
        expected: Revision,
    ) -> StoreResult<Option<Revision>> {
        let revision: Option<i64> = if expected == 0 {
            self.conn
                .query_row(
                    "INSERT INTO kv (key, value, revision) VALUES (?1, ?2, 1)
                     ON CONFLICT(key) DO NOTHING
                     RETURNING revision",
                    params![key, value],
                    |row| row.get(0),
                )
                .optional()?
        } else {
            self.conn
                .query_row(
                    "UPDATE kv SET value = ?1, revision = revision + 1
                     WHERE key = ?2 AND revision = ?3
                     RETURNING revision",
                    params![value, key, expected as i64],
                    |row| row.get(0),
                )
                .optional()?
        };
        Ok(revision.map(|r| r as Revision))
    }

    /// Delete the key. Returns whether it existed.
    pub fn remove(&self, key: &str) -> StoreResult<bool> {
        let removed = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("db_path", &self.db_path)
            .finish()
    }
}
